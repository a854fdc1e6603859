//! Common regex patterns for voucher text extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Loose code shape: alphanumeric ends with 8-38 alphanumerics, spaces or hyphens between
    pub static ref CODE_CANDIDATE: Regex = Regex::new(
        r"[A-Za-z0-9][A-Za-z0-9\s-]{8,38}[A-Za-z0-9]"
    ).unwrap();

    // Number followed by a yen/point unit (1,999円, 500 ポイント, 1．200￥)
    pub static ref SUFFIXED_AMOUNT: Regex = Regex::new(
        r"([0-9][0-9,，．.\s]{0,10})\s?(?:円|￥|¥|ポイント|分)"
    ).unwrap();

    // Bare comma-grouped number (1,500 or 12，000)
    pub static ref GROUPED_AMOUNT: Regex = Regex::new(
        r"(?-u:\b)[0-9]{1,3}(?:[,，][0-9]{3})+(?-u:\b)"
    ).unwrap();
}

/// Keep only ASCII digits.
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
