//! Configuration structures for the FIR pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FirError, Result};
use crate::layout::CropRect;

/// Main configuration for the fir pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Page normalization configuration.
    pub page: PageConfig,

    /// Crop regions on the normalized page.
    pub regions: RegionConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Pipeline driver configuration.
    pub pipeline: PipelineConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name (Latin script, covers Italian).
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,

    /// Sort fragments top-to-bottom, left-to-right before joining. Off by
    /// default: fragments are joined in detection order.
    pub sort_reading_order: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
            sort_reading_order: false,
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

/// Target page geometry. Pages are resized to A4 at ~300dpi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 2480,
            height: 3508,
        }
    }
}

/// The three fixed regions of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Top-right: form code and issue date.
    pub header: CropRect,

    /// Left strip: the four fiscal codes.
    pub parties: CropRect,

    /// Bottom-right: movement number.
    pub footer: CropRect,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            header: CropRect::new(1240, 0, 2480, 700),
            parties: CropRect::new(0, 0, 1000, 1700),
            footer: CropRect::new(1240, 2900, 2480, 3508),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Reject issue dates that are not real calendar dates.
    pub calendar_dates: bool,

    /// Reject fiscal codes whose check digit/character does not match.
    pub verify_checksums: bool,
}

/// Pipeline driver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Re-run extraction on the second page when the first yields nothing.
    pub retry_second_page: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry_second_page: true,
        }
    }
}

impl FirConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FirError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FirError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
