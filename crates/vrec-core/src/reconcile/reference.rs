//! Parsing the user's reference list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::voucher::rules::digits_only;

/// One reference line: a code as typed and the amount it should carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Code exactly as typed, hyphens included.
    pub code: String,
    /// Expected amount with every non-digit removed.
    pub expected_digits: Option<String>,
}

/// Reference codes keyed by their raw text.
///
/// Iteration follows first appearance of each code; a repeated code keeps its
/// position but takes the later line's amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceTable {
    entries: IndexMap<String, ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `code [amount]` lines separated by arbitrary whitespace.
    ///
    /// Blank lines are skipped, tokens after the amount are ignored, and an
    /// amount with no digits counts as missing.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            let Some(code) = tokens.next() else {
                continue;
            };
            let expected_digits = tokens.next().map(digits_only).filter(|d| !d.is_empty());
            table.insert(code, expected_digits);
        }

        table
    }

    /// Parse reference text, optionally dropping hyphens from every code first.
    pub fn parse_with_options(text: &str, ignore_hyphens: bool) -> Self {
        if ignore_hyphens {
            Self::parse(&strip_reference_hyphens(text))
        } else {
            Self::parse(text)
        }
    }

    /// Add or overwrite an entry.
    pub fn insert(&mut self, code: impl Into<String>, expected_digits: Option<String>) {
        let code = code.into();
        self.entries.insert(
            code.clone(),
            ReferenceEntry {
                code,
                expected_digits,
            },
        );
    }

    pub fn get(&self, code: &str) -> Option<&ReferenceEntry> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrite reference text with hyphens removed from each code.
///
/// Every line becomes `<code>` or `<code> <amount>`; extra tokens are dropped
/// and blank lines stay blank.
pub fn strip_reference_hyphens(text: &str) -> String {
    text.lines()
        .map(|line| {
            let mut tokens = line.split_whitespace();
            let code = tokens.next().unwrap_or("").replace('-', "");
            match tokens.next() {
                Some(amount) => format!("{} {}", code, amount),
                None => code,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
