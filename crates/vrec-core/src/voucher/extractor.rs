//! Turning one OCR text into a voucher record.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::record::{Amount, Code, ExtractionRecord};

use super::rules::{AmountExtractor, CodeExtractor, FieldExtractor};

/// Fields found in one OCR text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoucherFields {
    /// The code kept for the image.
    pub code: Option<Code>,
    /// Valid codes that appeared after the kept one and were discarded.
    pub discarded_codes: Vec<Code>,
    /// The most plausible amount.
    pub amount: Option<Amount>,
    /// Confidence of the amount's tier: higher for unit-suffixed numbers than
    /// for bare grouped ones.
    pub amount_confidence: Option<f32>,
}

/// Extracts a code and an amount from OCR text.
///
/// One image yields at most one code: the first valid candidate in reading
/// order. Any later valid codes are reported in `discarded_codes` but never
/// reach the record.
#[derive(Debug, Clone, Default)]
pub struct VoucherExtractor {
    amounts: AmountExtractor,
}

impl VoucherExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            amounts: AmountExtractor::from_config(config),
        }
    }

    /// Use a specific amount extractor.
    pub fn with_amount_extractor(mut self, amounts: AmountExtractor) -> Self {
        self.amounts = amounts;
        self
    }

    pub fn extract(&self, text: &str) -> VoucherFields {
        let mut codes = CodeExtractor::new()
            .extract_all(text)
            .into_iter()
            .map(|m| m.value);

        let code = codes.next();
        let discarded_codes: Vec<Code> = codes.collect();
        if !discarded_codes.is_empty() {
            debug!(
                "Keeping code {:?}, discarding {} later code(s)",
                code.as_ref().map(Code::as_str),
                discarded_codes.len()
            );
        }

        let (amount, amount_confidence) = match self.amounts.extract(text) {
            Some(m) => (Some(m.value), Some(m.confidence)),
            None => (None, None),
        };

        VoucherFields {
            code,
            discarded_codes,
            amount,
            amount_confidence,
        }
    }

    /// Build the record for one image from its OCR text.
    pub fn extract_record(&self, source: &str, text: &str) -> ExtractionRecord {
        let fields = self.extract(text);
        debug!(
            "{}: code={:?} amount={:?} (confidence {:?})",
            source,
            fields.code.as_ref().map(Code::as_str),
            fields.amount.as_ref().map(|a| a.value),
            fields.amount_confidence
        );
        ExtractionRecord::new(source, fields.code, fields.amount)
    }
}
