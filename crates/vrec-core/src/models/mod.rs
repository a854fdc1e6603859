//! Data models for vouchers and configuration.

pub mod config;
pub mod record;

pub use config::{ExtractionConfig, OcrConfig, PreprocessConfig, ReconciliationConfig, VrecConfig};
pub use record::{Amount, AmountField, Code, ExtractionRecord};
