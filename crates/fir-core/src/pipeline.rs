//! Pipeline driver: render, crop, OCR and extract, with one bounded retry
//! on the second page.

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{FirError, PdfError, Result};
use crate::form::{ExtractionReport, FormExtractor, RegionTexts};
use crate::layout::{normalize_page, Region};
use crate::models::config::{FirConfig, PageConfig, RegionConfig};
use crate::ocr::TextRecognizer;
use crate::pdf::{open_source, PageSource};

/// Page used when the first page yields nothing.
const RETRY_PAGE: u32 = 1;

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Extraction result of the page that was kept.
    pub report: ExtractionReport,
    /// 0-based index of that page.
    pub page: u32,
    /// Number of pages in the document.
    pub page_count: u32,
    /// Total processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// FIR extraction pipeline over an OCR engine.
pub struct FirPipeline<R: TextRecognizer> {
    recognizer: R,
    extractor: FormExtractor,
    page: PageConfig,
    regions: RegionConfig,
    retry_second_page: bool,
    dump_dir: Option<PathBuf>,
}

impl<R: TextRecognizer> FirPipeline<R> {
    /// Create a pipeline from configuration.
    pub fn new(recognizer: R, config: &FirConfig) -> Self {
        Self {
            recognizer,
            extractor: FormExtractor::from_config(&config.extraction),
            page: config.page,
            regions: config.regions,
            retry_second_page: config.pipeline.retry_second_page,
            dump_dir: None,
        }
    }

    /// Write the normalized page and region crops as PNG into `dir`.
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    /// Open a PDF (or scanned image) and run the pipeline on it.
    pub fn run_path(&self, path: &Path) -> Result<PipelineOutcome> {
        info!("Processing file: {}", path.display());
        let source = open_source(path)?;
        self.run(&source)
    }

    /// Run the pipeline on a document.
    ///
    /// Page 0 is extracted first. If every field comes back empty and the
    /// document has more pages, page 1 is extracted instead. No page past
    /// page 1 is ever read.
    pub fn run(&self, source: &dyn PageSource) -> Result<PipelineOutcome> {
        let start = Instant::now();
        let page_count = source.page_count();
        debug!("Document has {} pages", page_count);

        let mut page = 0;
        let mut report = self.extract_page(source, page)?;

        if report.record.is_empty() && self.retry_second_page && page_count > RETRY_PAGE {
            info!("No fields found on page 0, retrying on page {}", RETRY_PAGE);
            report = self.extract_page(source, RETRY_PAGE)?;
            page = RETRY_PAGE;
        }

        Ok(PipelineOutcome {
            report,
            page,
            page_count,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Like [`process_page`](Self::process_page), but a page that cannot be
    /// rasterized yields an empty report.
    fn extract_page(&self, source: &dyn PageSource, page: u32) -> Result<ExtractionReport> {
        match self.process_page(source, page) {
            Err(FirError::Pdf(PdfError::NoPageImage(p))) => {
                warn!("Page {} has no page image, treating it as empty", p);
                Ok(self.extractor.extract(&RegionTexts::default()))
            }
            result => result,
        }
    }

    /// Extract one page: render, normalize, crop each region and OCR it.
    pub fn process_page(&self, source: &dyn PageSource, page: u32) -> Result<ExtractionReport> {
        let rendered = source.render_page(page)?;
        let normalized = normalize_page(&rendered, &self.page);
        self.dump(page, "page", &normalized)?;

        let mut texts = RegionTexts::default();
        for region in Region::ALL {
            let crop = self.regions.rect(region).crop(&normalized);
            self.dump(page, region.name(), &crop)?;

            let output = self.recognizer.recognize(&crop)?;
            debug!(
                "Page {} region '{}': {} fragments in {}ms",
                page,
                region.name(),
                output.fragments.len(),
                output.processing_time_ms
            );
            texts.set(region, output.joined_text());
        }

        Ok(self.extractor.extract(&texts))
    }

    fn dump(&self, page: u32, name: &str, image: &DynamicImage) -> Result<()> {
        let Some(dir) = &self.dump_dir else {
            return Ok(());
        };

        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("page{}_{}.png", page, name));
        image.save(&path)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}
