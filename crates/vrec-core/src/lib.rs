//! Core library for voucher OCR processing.
//!
//! This crate provides:
//! - Code and amount extraction from noisy OCR text
//! - Sequential batch processing with per-image failure isolation
//! - Reconciliation against a user-supplied reference list with fuzzy suggestions
//! - An OCR backend trait, with a pure Rust engine on native targets

pub mod batch;
pub mod error;
pub mod export;
pub mod models;
pub mod ocr;
pub mod reconcile;
pub mod voucher;

pub use batch::{
    format_full_text, BatchMode, BatchOutput, BatchProcessor, BatchRequest, ImageSource, Progress,
    WorkerMessage,
};
#[cfg(feature = "native")]
pub use batch::{wait_for_results, BatchWorker};
pub use error::{OcrError, Result, VrecError};
pub use models::{Amount, AmountField, Code, ExtractionRecord, VrecConfig};
pub use ocr::{ImagePreprocessor, OcrBackend};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use reconcile::{
    reconcile, MatchKind, ReconciliationResult, ReconciliationSummary, ReferenceTable, Suggestion,
};
pub use voucher::{VoucherExtractor, VoucherFields};
