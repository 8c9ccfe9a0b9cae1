//! Page rendering through the Pdfium runtime.

use std::env;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::{PdfRenderConfig, Pdfium, PdfiumError};
use tracing::debug;

use crate::error::PdfError;

/// Rasterizes PDF pages with Pdfium.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl PdfiumRenderer {
    /// Bind to the Pdfium shared library.
    pub fn bind() -> Result<Self, PdfiumError> {
        load_pdfium().map(|pdfium| Self { pdfium })
    }

    /// Render page `page` (0-based) of the PDF in `data`, scaled by `scale`
    /// from its 72 dpi size.
    pub fn render(&self, data: &[u8], page: u32, scale: f32) -> Result<DynamicImage, PdfError> {
        let render_error = |e: PdfiumError| PdfError::Render {
            page,
            reason: e.to_string(),
        };

        let document = self
            .pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(render_error)?;

        let pages = document.pages();
        let count = u32::from(pages.len());
        let index = u16::try_from(page)
            .ok()
            .filter(|&i| u32::from(i) < count)
            .ok_or(PdfError::PageOutOfRange { page, count })?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let pdf_page = pages.get(index).map_err(render_error)?;
        let bitmap = pdf_page.render_with_config(&config).map_err(render_error)?;

        let (Ok(width), Ok(height)) = (u32::try_from(bitmap.width()), u32::try_from(bitmap.height()))
        else {
            return Err(PdfError::Render {
                page,
                reason: "negative bitmap size".to_string(),
            });
        };
        debug!("Rendered page {} at {}x{}", page, width, height);

        RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| PdfError::Render {
                page,
                reason: format!("bitmap does not match its {}x{} size", width, height),
            })
    }
}

fn load_pdfium() -> Result<Pdfium, PdfiumError> {
    if let Some(result) = try_bind_from_env("PDFIUM_LIBRARY_PATH") {
        return result;
    }

    for candidate in DEFAULT_PDFIUM_LOCATIONS {
        if let Some(Ok(pdfium)) = try_bind_from_path(candidate) {
            return Ok(pdfium);
        }
    }

    match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./")) {
        Ok(bindings) => Ok(Pdfium::new(bindings)),
        Err(primary_err) => match Pdfium::bind_to_system_library() {
            Ok(bindings) => Ok(Pdfium::new(bindings)),
            Err(_) => Err(primary_err),
        },
    }
}

fn try_bind_from_env(var: &str) -> Option<Result<Pdfium, PdfiumError>> {
    let value = env::var_os(var)?;
    try_bind_from_path(PathBuf::from(value))
}

fn try_bind_from_path(path: impl AsRef<Path>) -> Option<Result<Pdfium, PdfiumError>> {
    let path = path.as_ref();
    if path.is_dir() {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(path);
        Some(Pdfium::bind_to_library(lib_path).map(Pdfium::new))
    } else if path.exists() {
        Some(Pdfium::bind_to_library(path).map(Pdfium::new))
    } else {
        None
    }
}

const DEFAULT_PDFIUM_LOCATIONS: &[&str] = &[
    "third_party/pdfium/lib",
    "pdfium/lib",
    "pdfium",
];
