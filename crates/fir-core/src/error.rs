//! Error types for the fir-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the fir library.
#[derive(Error, Debug)]
pub enum FirError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FirError {
    /// Whether this error is an input error (missing file, no pages, page
    /// out of range) that ends a run without output rather than failing it.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FirError::Pdf(
                PdfError::NotFound(_) | PdfError::NoPages | PdfError::PageOutOfRange { .. }
            )
        )
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The input file does not exist.
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Requested page index (0-based) is past the end of the document.
    #[error("page {page} does not exist in the PDF ({count} pages)")]
    PageOutOfRange { page: u32, count: u32 },

    /// The page renderer failed.
    #[error("failed to render page {page}: {reason}")]
    Render { page: u32, reason: String },

    /// The page could not be rendered and carries no decodable raster image.
    #[error("no decodable page image on page {0}")]
    NoPageImage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text detection or recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Result type for the fir library.
pub type Result<T> = std::result::Result<T, FirError>;
