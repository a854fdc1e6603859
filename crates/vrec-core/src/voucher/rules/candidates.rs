//! Scanning raw OCR text for code-shaped substrings.

use regex::Matches;

use super::patterns::CODE_CANDIDATE;

/// A substring of OCR text that looks like it could be a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'t> {
    /// Matched text, before normalization.
    pub text: &'t str,
    /// Byte offset of the match start.
    pub start: usize,
    /// Byte offset one past the match end.
    pub end: usize,
}

/// Single-pass, left-to-right iterator over code candidates in one text.
pub struct CandidateScanner<'t> {
    matches: Matches<'static, 't>,
}

impl<'t> Iterator for CandidateScanner<'t> {
    type Item = Candidate<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        self.matches.next().map(|m| Candidate {
            text: m.as_str(),
            start: m.start(),
            end: m.end(),
        })
    }
}

/// Scan text for code candidates (10-40 characters, alphanumeric at both ends).
///
/// Matches never overlap and are not deduplicated.
pub fn scan_candidates(text: &str) -> CandidateScanner<'_> {
    CandidateScanner {
        matches: CODE_CANDIDATE.find_iter(text),
    }
}
