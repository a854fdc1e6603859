//! Amount extraction for yen vouchers and receipts.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::record::Amount;

use super::patterns::{digits_only, GROUPED_AMOUNT, SUFFIXED_AMOUNT};
use super::{ExtractionMatch, FieldExtractor};

/// Confidence for numbers followed by a currency or unit token.
const SUFFIXED_CONFIDENCE: f32 = 0.9;

/// Confidence for bare thousands-grouped numbers.
const GROUPED_CONFIDENCE: f32 = 0.6;

/// Amount field extractor.
///
/// Numbers followed by a unit token (`円`, `￥`, `¥`, `ポイント`, `分`) are tried
/// first and accepted from `suffixed_floor`. Only when none of them is
/// plausible are bare comma-grouped numbers considered, with the stricter
/// `grouped_floor`. Both tiers reject values at or above `ceiling`, and the
/// largest surviving value wins.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    suffixed_floor: u64,
    grouped_floor: u64,
    ceiling: u64,
    glyph: String,
}

impl AmountExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            suffixed_floor: config.suffixed_floor,
            grouped_floor: config.grouped_floor,
            ceiling: config.ceiling,
            glyph: config.currency_glyph.clone(),
        }
    }

    /// Override the plausibility bounds.
    pub fn with_bounds(mut self, suffixed_floor: u64, grouped_floor: u64, ceiling: u64) -> Self {
        self.suffixed_floor = suffixed_floor;
        self.grouped_floor = grouped_floor;
        self.ceiling = ceiling;
        self
    }

    /// Set the glyph prefixed to displayed amounts.
    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyph = glyph.into();
        self
    }

    fn suffixed_matches(&self, text: &str) -> Vec<ExtractionMatch<Amount>> {
        SUFFIXED_AMOUNT
            .captures_iter(text)
            .filter_map(|caps| {
                let number = caps.get(1)?;
                let value = parse_digits(number.as_str())?;
                if value < self.suffixed_floor || value >= self.ceiling {
                    debug!("Discarding implausible suffixed amount {}", value);
                    return None;
                }
                let full_match = caps.get(0)?;
                Some(
                    ExtractionMatch::new(
                        Amount::new(value, &self.glyph),
                        SUFFIXED_CONFIDENCE,
                        full_match.as_str(),
                    )
                    .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }

    fn grouped_matches(&self, text: &str) -> Vec<ExtractionMatch<Amount>> {
        GROUPED_AMOUNT
            .find_iter(text)
            .filter_map(|m| {
                let value = parse_digits(m.as_str())?;
                if value < self.grouped_floor || value >= self.ceiling {
                    return None;
                }
                Some(
                    ExtractionMatch::new(Amount::new(value, &self.glyph), GROUPED_CONFIDENCE, m.as_str())
                        .with_position(m.start(), m.end()),
                )
            })
            .collect()
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Amount>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        largest(self.extract_all(text))
    }

    /// All plausible amounts of the tier that produced any, in text order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let suffixed = self.suffixed_matches(text);
        if !suffixed.is_empty() {
            return suffixed;
        }

        self.grouped_matches(text)
    }
}

/// Keep the first match holding the maximum value.
fn largest(matches: Vec<ExtractionMatch<Amount>>) -> Option<ExtractionMatch<Amount>> {
    matches.into_iter().fold(None, |best, m| match best {
        Some(b) if b.value.value >= m.value.value => Some(b),
        _ => Some(m),
    })
}

fn parse_digits(s: &str) -> Option<u64> {
    let digits = digits_only(s);
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Extract the most plausible amount from text with default bounds.
pub fn extract_amount(text: &str) -> Option<Amount> {
    AmountExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn value(text: &str) -> Option<u64> {
        extract_amount(text).map(|a| a.value)
    }

    #[test]
    fn test_suffixed_amount() {
        assert_eq!(value("1,999円"), Some(1999));
        assert_eq!(extract_amount("1,999円").unwrap().display, "￥1,999");
        assert_eq!(value("ご利用額 3，000 円"), Some(3000));
        assert_eq!(value("500ポイント"), Some(500));
        assert_eq!(value("1．500￥"), Some(1500));
    }

    #[test]
    fn test_floor_and_ceiling() {
        assert_eq!(value("100円"), None);
        assert_eq!(value("189円"), None);
        assert_eq!(value("190円"), Some(190));
        assert_eq!(value("999,999円"), Some(999_999));
        assert_eq!(value("1,000,000円"), None);
    }

    #[test]
    fn test_largest_suffixed_wins() {
        assert_eq!(value("小計 800円 / 合計 1,200円 / 割引 200円"), Some(1200));
    }

    #[test]
    fn test_suffixed_tier_blocks_grouped_tier() {
        assert_eq!(value("200円 TEL 2,000"), Some(200));
    }

    #[test]
    fn test_grouped_fallback() {
        assert_eq!(value("TOTAL 2,500"), Some(2500));
        assert_eq!(value("No 1,234 / 12,800"), Some(12_800));
        assert_eq!(value("count 1,000"), Some(1000));
    }

    #[test]
    fn test_grouped_floor_is_stricter() {
        // 250 has no grouping at all, so tier 2 never sees it
        assert_eq!(value("TOTAL 250"), None);
        // implausible suffixed values fall through to the grouped tier
        assert_eq!(value("50円 total 1,500"), Some(1500));
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(value("ABCD1234EFGH5678"), None);
        assert_eq!(value(""), None);
    }

    #[test]
    fn test_custom_bounds_and_glyph() {
        let extractor = AmountExtractor::new().with_bounds(50, 50, 100_000).with_glyph("¥");
        let amount = extractor.extract("60円").unwrap().value;
        assert_eq!(amount.display, "¥60");
        assert_eq!(extractor.extract("100,000円").map(|m| m.value.value), None);
    }

    #[test]
    fn test_extract_all_reports_positions() {
        let text = "A 300円 B 700円";
        let all = AmountExtractor::new().extract_all(text);
        assert_eq!(all.len(), 2);
        let (start, end) = all[1].position.unwrap();
        assert_eq!(&text[start..end], "700円");
    }
}
