//! OCR engine boundary.
//!
//! The field extractor only consumes the text of each fragment, joined with
//! single spaces in the order the engine returns them.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// A recognized piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text content.
    pub text: String,

    /// Axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub rect: [f32; 4],

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, rect: [f32; 4], confidence: f32) -> Self {
        Self {
            text: text.into(),
            rect,
            confidence,
        }
    }
}

/// Result of OCR on one image region.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrOutput {
    /// Fragments in engine order.
    pub fragments: Vec<TextFragment>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl OcrOutput {
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        Self {
            fragments: texts
                .iter()
                .map(|t| TextFragment::new(t.as_ref(), [0.0; 4], 1.0))
                .collect(),
            processing_time_ms: 0,
        }
    }

    /// Fragment texts joined with single spaces.
    pub fn joined_text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An OCR engine.
pub trait TextRecognizer {
    /// Detect and recognize text in an image region.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrOutput, OcrError>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, image: &DynamicImage) -> Result<OcrOutput, OcrError> {
        (**self).recognize(image)
    }
}

/// Sort fragments top-to-bottom, left-to-right.
///
/// Fragments whose top edges fall in the same 20 px band count as one row.
pub fn sort_by_reading_order(fragments: &mut [TextFragment]) {
    fragments.sort_by(|a, b| {
        let row_a = (a.rect[1] / 20.0) as i32;
        let row_b = (b.rect[1] / 20.0) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            a.rect[0]
                .partial_cmp(&b.rect[0])
                .unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}
