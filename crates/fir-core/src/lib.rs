//! Core library for Italian FIR (Formulario di Identificazione dei Rifiuti)
//! waste-form OCR.
//!
//! This crate provides:
//! - Page rasterization of scanned PDFs and image files
//! - Fixed-layout page normalization and region cropping
//! - An OCR engine boundary with a pure-Rust ONNX implementation
//! - FIR field extraction (form code, issue date, fiscal codes, movement number)
//! - The page pipeline with a single retry on the second page

pub mod error;
pub mod form;
pub mod layout;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use error::{FirError, OcrError, PdfError, Result};
pub use form::{ExtractionReport, FormExtractor, RegionTexts};
pub use layout::{CropRect, Region};
pub use models::config::FirConfig;
pub use models::record::ExtractedRecord;
pub use ocr::{OcrOutput, TextFragment, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{open_source, ImagePage, PageSource, PdfExtractor};
pub use pipeline::{FirPipeline, PipelineOutcome};
