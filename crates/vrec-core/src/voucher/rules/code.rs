//! Voucher code normalization and validation.

use tracing::trace;

use crate::models::record::Code;

use super::candidates::scan_candidates;
use super::{ExtractionMatch, FieldExtractor};

/// Length of a plain alphanumeric code.
pub const CODE_LENGTH: usize = 16;

/// Longest accepted code, allowing one hyphen.
pub const MAX_HYPHENATED_LENGTH: usize = 17;

/// Code field extractor.
///
/// `extract` applies the single-code-per-image policy: the first candidate in
/// reading order that validates is the code for the image. `extract_all` keeps
/// every valid candidate for diagnostics.
pub struct CodeExtractor;

impl CodeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CodeExtractor {
    type Output = ExtractionMatch<Code>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        scan_candidates(text)
            .filter_map(|candidate| {
                let code = validate_code(candidate.text);
                if code.is_none() {
                    trace!("Rejected code candidate {:?}", candidate.text);
                }
                code.map(|code| {
                    ExtractionMatch::new(code, 1.0, candidate.text)
                        .with_position(candidate.start, candidate.end)
                })
            })
            .collect()
    }
}

/// Extract the first valid code from text.
pub fn extract_code(text: &str) -> Option<Code> {
    CodeExtractor::new().extract(text).map(|m| m.value)
}

/// Extract every valid code from text, in reading order.
pub fn extract_codes(text: &str) -> Vec<Code> {
    CodeExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .collect()
}

/// Normalize a candidate: drop whitespace, collapse hyphen runs, trim edge hyphens.
pub fn normalize_candidate(candidate: &str) -> String {
    let mut collapsed = String::with_capacity(candidate.len());

    for c in candidate.chars().filter(|c| !c.is_whitespace()) {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.strip_prefix('-').unwrap_or(&collapsed);
    let trimmed = trimmed.strip_suffix('-').unwrap_or(trimmed);
    trimmed.to_string()
}

/// Check a normalized string against the accepted code shapes.
///
/// Accepts exactly 16 ASCII alphanumerics, or 16-17 characters of ASCII
/// alphanumerics and hyphens.
pub fn is_valid_code(code: &str) -> bool {
    let len = code.chars().count();

    if len == CODE_LENGTH && code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return true;
    }

    (CODE_LENGTH..=MAX_HYPHENATED_LENGTH).contains(&len)
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Normalize a candidate and accept it as a code if it has a valid shape.
pub fn validate_code(candidate: &str) -> Option<Code> {
    let normalized = normalize_candidate(candidate);
    is_valid_code(&normalized).then(|| Code::new_unchecked(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_candidate() {
        assert_eq!(normalize_candidate("ABCD 1234  EFGH\t5678"), "ABCD1234EFGH5678");
        assert_eq!(normalize_candidate("ABCD--1234---EF"), "ABCD-1234-EF");
        assert_eq!(normalize_candidate("-ABCD-"), "ABCD");
        assert_eq!(normalize_candidate("AB - - CD"), "AB-CD");
        assert_eq!(normalize_candidate("-"), "");
    }

    #[test]
    fn test_valid_lengths() {
        assert!(is_valid_code("ABCDEFGH12345678"));
        assert!(!is_valid_code("ABCDEFGH1234567"));
        // 17 characters are allowed whether or not one of them is a hyphen
        assert!(is_valid_code("ABCDEFGH123456789"));
        assert!(!is_valid_code("ABCDEFGH123456789X"));
    }

    #[test]
    fn test_every_16_char_alphanumeric_is_valid() {
        let alphabet: Vec<char> = ('A'..='Z').chain('a'..='z').chain('0'..='9').collect();
        for offset in 0..alphabet.len() {
            let code: String = alphabet.iter().cycle().skip(offset).take(18).collect();

            assert!(is_valid_code(&code[..16]), "{code}");
            assert!(!is_valid_code(&code[..15]), "{code}");
            assert!(!is_valid_code(&code[..18]), "{code}");
        }
    }

    #[test]
    fn test_one_hyphen_inserted_stays_valid() {
        let code = "ABCDEFGH12345678";
        for i in 1..code.len() {
            let hyphenated = format!("{}-{}", &code[..i], &code[i..]);
            assert_eq!(hyphenated.len(), 17);
            assert!(is_valid_code(&hyphenated), "{hyphenated}");
        }
    }

    #[test]
    fn test_hyphenated_shapes() {
        assert!(is_valid_code("ABCD-EFGH-1234-5"));
        assert!(!is_valid_code("ABCD-EFGH-1234-5678"));
        assert!(!is_valid_code("ABCD_EFGH12345678"));
    }

    #[test]
    fn test_first_valid_candidate_wins() {
        let text = "Ref: 12345 /\nCODE 1234 5678 90AB /\nSECOND1234567890";
        assert_eq!(extract_code(text).unwrap().as_str(), "CODE1234567890AB");

        let all = extract_codes(text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].as_str(), "SECOND1234567890");
    }

    #[test]
    fn test_lines_without_separators_merge() {
        // Whitespace includes newlines, so adjacent code-like lines run together
        let text = "Ref 12345\nCODE 1234 5678 90AB";
        assert_eq!(extract_code(text), None);
    }

    #[test]
    fn test_no_valid_candidate() {
        assert_eq!(extract_code("合計 1,500円 ありがとうございました"), None);
        assert_eq!(extract_code(""), None);
    }

    #[test]
    fn test_extract_match_position() {
        let text = "gift: ABCDEFGH-IJKLMNOP";
        let m = CodeExtractor::new().extract(text).unwrap();
        assert_eq!(m.position, Some((6, text.len())));
        assert_eq!(m.source, "ABCDEFGH-IJKLMNOP");
        assert_eq!(m.value.as_str(), "ABCDEFGH-IJKLMNOP");

        // 19 characters with three hyphens is not an accepted shape
        assert_eq!(extract_code("gift: ABCD-EFGH-IJKL-MNOP"), None);
    }
}
