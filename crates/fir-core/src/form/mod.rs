//! FIR field extraction module.

mod extractor;
pub mod rules;

pub use extractor::{ExtractionReport, FormExtractor, RegionTexts};
