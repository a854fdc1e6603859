//! Voucher records produced by extraction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A voucher identifier accepted by the code validator.
///
/// Codes are only built by the validator (or deserialized from records it
/// produced); nothing downstream checks their shape again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    /// Wrap an already-validated code.
    pub(crate) fn new_unchecked(code: String) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The code with every hyphen removed.
    pub fn without_hyphens(&self) -> String {
        self.0.replace('-', "")
    }

    /// Number of characters excluding hyphens, as shown next to a result.
    pub fn digit_count(&self) -> usize {
        self.0.chars().filter(|c| *c != '-').count()
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An extracted monetary amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Integer value in the smallest display unit (yen, points).
    pub value: u64,
    /// Display form, e.g. `￥1,999`.
    pub display: String,
}

impl Amount {
    /// Create an amount displayed with the given currency glyph.
    pub fn new(value: u64, glyph: &str) -> Self {
        Self {
            value,
            display: format!("{}{}", glyph, group_thousands(value)),
        }
    }

    /// Digits used when comparing against a reference amount.
    pub fn digits(&self) -> String {
        self.value.to_string()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Format an integer with comma thousands separators (1234567 -> "1,234,567").
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let len = digits.len();
    let mut formatted = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(c);
    }

    formatted
}

/// Amount slot of a record.
///
/// `Failed` marks an image that could not be processed at all and is kept
/// apart from `NotFound`, which means OCR ran but no plausible amount was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AmountField {
    Found(Amount),
    NotFound,
    Failed,
}

impl AmountField {
    pub fn amount(&self) -> Option<&Amount> {
        match self {
            AmountField::Found(amount) => Some(amount),
            _ => None,
        }
    }
}

impl From<Option<Amount>> for AmountField {
    fn from(amount: Option<Amount>) -> Self {
        amount.map_or(AmountField::NotFound, AmountField::Found)
    }
}

/// Extraction result for one input image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// File name or other handle identifying the image.
    pub source: String,

    /// First valid code found in the OCR text.
    pub code: Option<Code>,

    /// Most plausible amount found in the OCR text.
    pub amount: AmountField,

    /// Failure message when the image could not be processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionRecord {
    /// Record for an image whose text was processed.
    pub fn new(source: impl Into<String>, code: Option<Code>, amount: Option<Amount>) -> Self {
        Self {
            source: source.into(),
            code,
            amount: amount.into(),
            error: None,
        }
    }

    /// Record for an image that failed to load, decode or OCR.
    pub fn failed(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            code: None,
            amount: AmountField::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.amount, AmountField::Failed)
    }

    /// Digits of the extracted amount, if one was found.
    pub fn amount_digits(&self) -> Option<String> {
        self.amount.amount().map(Amount::digits)
    }
}
