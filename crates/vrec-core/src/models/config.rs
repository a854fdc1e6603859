//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::VrecError;

/// Main configuration for the vrec pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VrecConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Code and amount extraction configuration.
    pub extraction: ExtractionConfig,

    /// Reference reconciliation configuration.
    pub reconciliation: ReconciliationConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language hint handed to the OCR backend.
    pub language: String,

    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` placeholders emitted by the recognizer.
    pub keep_unk: bool,

    /// Image preprocessing applied before recognition.
    pub preprocessing: PreprocessConfig,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng+jpn".to_string(),
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "rec.onnx".to_string(),
            dictionary: "dict.txt".to_string(),
            keep_unk: false,
            preprocessing: PreprocessConfig::default(),
        }
    }
}

/// Photo cleanup before OCR.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Convert to grayscale.
    pub grayscale: bool,

    /// Upscale factor (1.0 = unchanged).
    pub scale: f32,

    /// Contrast factor around mid-gray (1.0 = unchanged, 2.0 = 200%).
    pub contrast: f32,

    /// Brightness gain applied after contrast (1.0 = unchanged, 1.2 = 120%).
    pub brightness: f32,

    /// Maximum image dimension (longer side) after scaling.
    pub max_image_size: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            grayscale: true,
            scale: 1.5,
            contrast: 2.0,
            brightness: 1.2,
            max_image_size: 4096,
        }
    }
}

/// Amount extraction bounds and display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Glyph prefixed to displayed amounts.
    pub currency_glyph: String,

    /// Lowest accepted value for numbers followed by a currency/unit token.
    pub suffixed_floor: u64,

    /// Lowest accepted value for bare thousands-grouped numbers.
    pub grouped_floor: u64,

    /// Exclusive upper bound for any accepted amount.
    pub ceiling: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            currency_glyph: "￥".to_string(),
            suffixed_floor: 190,
            grouped_floor: 300,
            ceiling: 1_000_000,
        }
    }
}

/// Reference reconciliation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Strip hyphens from reference codes before building the table.
    pub ignore_reference_hyphens: bool,
}

impl VrecConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject settings no voucher could ever satisfy.
    pub fn validate(&self) -> crate::error::Result<()> {
        let extraction = &self.extraction;
        if extraction.suffixed_floor >= extraction.ceiling
            || extraction.grouped_floor >= extraction.ceiling
        {
            return Err(VrecError::Config(format!(
                "amount floors ({} / {}) must be below the ceiling ({})",
                extraction.suffixed_floor, extraction.grouped_floor, extraction.ceiling
            )));
        }
        if self.ocr.preprocessing.scale <= 0.0 {
            return Err(VrecError::Config(
                "ocr.preprocessing.scale must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.ocr.model_dir.join(model_name)
    }
}
