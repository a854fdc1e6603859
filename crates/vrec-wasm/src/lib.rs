//! WASM bindings for voucher code extraction and reconciliation.
//!
//! OCR itself runs in the browser (e.g. Tesseract.js); these bindings take the
//! recognized text and do everything after it.

use js_sys::Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use vrec_core::models::record::Amount;
use vrec_core::reconcile::{ReferenceTable, ReconciliationResult, ReconciliationSummary};
use vrec_core::voucher::rules::AmountExtractor;
use vrec_core::{Code, ExtractionRecord};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract a record (code and amount) from one image's OCR text.
#[wasm_bindgen]
pub fn extract_record(source: &str, text: &str) -> Result<JsValue, JsValue> {
    let record = vrec_core::VoucherExtractor::new().extract_record(source, text);
    to_js(&record)
}

/// First valid voucher code in the text.
#[wasm_bindgen]
pub fn extract_code(text: &str) -> Option<String> {
    vrec_core::voucher::rules::extract_code(text).map(|c| c.as_str().to_string())
}

/// Most plausible amount in the text, as its display form (e.g. `￥1,500`).
#[wasm_bindgen]
pub fn extract_amount(text: &str) -> Option<String> {
    vrec_core::voucher::rules::extract_amount(text).map(|a| a.display)
}

/// Number of characters in a code, hyphens excluded.
#[wasm_bindgen]
pub fn code_digit_count(code: &str) -> usize {
    code.chars().filter(|c| *c != '-').count()
}

/// Parse reference list text into `{ code: { code, expected_digits } }`.
#[wasm_bindgen]
pub fn parse_reference(text: &str, ignore_hyphens: bool) -> Result<JsValue, JsValue> {
    let table = ReferenceTable::parse_with_options(text, ignore_hyphens);
    to_js(&table)
}

/// Remove hyphens from the code column of reference list text.
#[wasm_bindgen]
pub fn strip_reference_hyphens(text: &str) -> String {
    vrec_core::reconcile::strip_reference_hyphens(text)
}

/// Classify records (an array as returned by `extract_record`) against
/// reference list text.
#[wasm_bindgen]
pub fn reconcile(
    records: JsValue,
    reference_text: &str,
    ignore_hyphens: bool,
) -> Result<JsValue, JsValue> {
    let records: Vec<ExtractionRecord> = from_js(records)?;
    let table = ReferenceTable::parse_with_options(reference_text, ignore_hyphens);
    to_js(&vrec_core::reconcile(&records, &table))
}

/// Closest reference code to `code`, or `undefined` when the list is empty.
#[wasm_bindgen]
pub fn suggest_code(code: &str, reference_text: &str) -> Result<JsValue, JsValue> {
    let table = ReferenceTable::parse(reference_text);
    to_js(&vrec_core::reconcile::suggest_code(code, &table))
}

/// Levenshtein distance between two strings.
#[wasm_bindgen]
pub fn edit_distance(a: &str, b: &str) -> usize {
    vrec_core::reconcile::edit_distance(a, b)
}

/// Format one image's OCR text as a `--- name ---` block.
#[wasm_bindgen]
pub fn format_full_text(source: &str, text: &str) -> String {
    vrec_core::format_full_text(source, text)
}

/// Voucher extractor class with adjustable amount bounds.
#[wasm_bindgen]
pub struct VoucherExtractor {
    extractor: vrec_core::VoucherExtractor,
}

#[wasm_bindgen]
impl VoucherExtractor {
    /// Create an extractor with the default bounds.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: vrec_core::VoucherExtractor::new(),
        }
    }

    /// Set amount bounds: floors for suffixed and grouped numbers, and the
    /// exclusive ceiling.
    #[wasm_bindgen]
    pub fn set_bounds(&mut self, suffixed_floor: u32, grouped_floor: u32, ceiling: u32) {
        let amounts = AmountExtractor::new().with_bounds(
            u64::from(suffixed_floor),
            u64::from(grouped_floor),
            u64::from(ceiling),
        );
        self.extractor = vrec_core::VoucherExtractor::new().with_amount_extractor(amounts);
    }

    /// Extract a record from OCR text.
    #[wasm_bindgen]
    pub fn extract(&self, source: &str, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract_record(source, text))
    }

    /// Extract with every valid code seen, not just the kept one.
    #[wasm_bindgen]
    pub fn extract_with_details(&self, text: &str) -> Result<JsValue, JsValue> {
        let fields = self.extractor.extract(text);

        #[derive(Serialize)]
        struct ExtractDetails {
            code: Option<Code>,
            code_digits: Option<usize>,
            discarded_codes: Vec<Code>,
            amount: Option<Amount>,
            amount_confidence: Option<f32>,
        }

        let output = ExtractDetails {
            code_digits: fields.code.as_ref().map(Code::digit_count),
            code: fields.code,
            discarded_codes: fields.discarded_codes,
            amount: fields.amount,
            amount_confidence: fields.amount_confidence,
        };

        to_js(&output)
    }
}

impl Default for VoucherExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Batch of OCR texts collected in the browser, one per image.
///
/// Add each image's text (or its failure) as it completes, then read the
/// records or reconcile them. Results keep the order images were added in.
#[wasm_bindgen]
pub struct VoucherBatch {
    extractor: vrec_core::VoucherExtractor,
    records: Vec<ExtractionRecord>,
}

#[wasm_bindgen]
impl VoucherBatch {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: vrec_core::VoucherExtractor::new(),
            records: Vec::new(),
        }
    }

    /// Add the OCR text of one image.
    #[wasm_bindgen]
    pub fn add_text(&mut self, source: &str, text: &str) {
        self.records.push(self.extractor.extract_record(source, text));
    }

    /// Record an image that could not be read.
    #[wasm_bindgen]
    pub fn add_failure(&mut self, source: &str, error: &str) {
        self.records.push(ExtractionRecord::failed(source, error));
    }

    /// Number of images added.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.records.len()
    }

    /// Drop every record.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records collected so far.
    #[wasm_bindgen]
    pub fn records(&self) -> Result<JsValue, JsValue> {
        to_js(&self.records)
    }

    /// Extracted codes, one array entry per image that had one.
    #[wasm_bindgen]
    pub fn codes(&self) -> Array {
        self.records
            .iter()
            .filter_map(|r| r.code.as_ref())
            .map(|c| JsValue::from_str(c.as_str()))
            .collect()
    }

    /// Codes only, newline-separated, for copying.
    #[wasm_bindgen]
    pub fn codes_text(&self) -> String {
        vrec_core::export::codes_only(&self.records)
    }

    /// `code amount` lines, usable as a reference list.
    #[wasm_bindgen]
    pub fn pairs_text(&self) -> String {
        vrec_core::export::code_amount_pairs(&self.records)
    }

    /// Reconcile the collected records against reference list text.
    #[wasm_bindgen]
    pub fn reconcile(&self, reference_text: &str, ignore_hyphens: bool) -> Result<JsValue, JsValue> {
        let table = ReferenceTable::parse_with_options(reference_text, ignore_hyphens);
        let results = vrec_core::reconcile(&self.records, &table);

        #[derive(Serialize)]
        struct ReconcileOutput {
            summary: ReconciliationSummary,
            results: Vec<ReconciliationResult>,
        }

        to_js(&ReconcileOutput {
            summary: ReconciliationSummary::from_results(&results),
            results,
        })
    }

    /// Records as a JSON string, in the format `vrec reconcile` reads.
    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string_pretty(&self.records).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for VoucherBatch {
    fn default() -> Self {
        Self::new()
    }
}
