//! Fixed page layout of the FIR form: page normalization and crop regions.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::config::{PageConfig, RegionConfig};

/// The three regions of the form, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Form code and issue date.
    Header,
    /// Producer, plant, transporter and intermediary fiscal codes.
    Parties,
    /// Movement number, and fallback form code.
    Footer,
}

impl Region {
    /// All regions in processing order.
    pub const ALL: [Region; 3] = [Region::Header, Region::Parties, Region::Footer];

    /// Short name used in logs and dump file names.
    pub fn name(&self) -> &'static str {
        match self {
            Region::Header => "header",
            Region::Parties => "parties",
            Region::Footer => "footer",
        }
    }
}

/// Axis-aligned crop rectangle `(x1, y1)`-`(x2, y2)`, exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropRect {
    pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Crop the rectangle out of `image`, clamped to the image bounds.
    pub fn crop(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        let x = self.x1.min(width);
        let y = self.y1.min(height);
        let w = self.x2.min(width).saturating_sub(x);
        let h = self.y2.min(height).saturating_sub(y);
        image.crop_imm(x, y, w, h)
    }
}

impl RegionConfig {
    /// Crop rectangle of a region.
    pub fn rect(&self, region: Region) -> CropRect {
        match region {
            Region::Header => self.header,
            Region::Parties => self.parties,
            Region::Footer => self.footer,
        }
    }
}

/// Resize a rendered page to the configured page size (A4 at ~300dpi by
/// default) so the fixed crop regions line up.
pub fn normalize_page(image: &DynamicImage, page: &PageConfig) -> DynamicImage {
    let (width, height) = image.dimensions();
    if (width, height) == (page.width, page.height) {
        return image.clone();
    }

    debug!(
        "Resizing page {}x{} -> {}x{}",
        width, height, page.width, page.height
    );
    image.resize_exact(
        page.width,
        page.height,
        image::imageops::FilterType::Lanczos3,
    )
}
