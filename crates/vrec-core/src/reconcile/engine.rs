//! Classifying extracted records against the reference table.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::record::ExtractionRecord;

use super::fuzzy::{suggest_code, Suggestion};
use super::reference::ReferenceTable;

/// How an extracted code relates to the reference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    /// Code listed and both amounts present and equal.
    Exact,
    /// Code listed but an amount is missing or differs.
    AmountMismatch,
    /// Code not listed.
    CodeUnknown,
}

/// A record annotated for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub record: ExtractionRecord,

    /// `None` for unreadable records or when there was no reference list.
    pub match_kind: Option<MatchKind>,

    /// Closest reference code, only for `CodeUnknown`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl ReconciliationResult {
    /// No code could be read from the image.
    pub fn is_unreadable(&self) -> bool {
        self.record.code.is_none()
    }
}

/// Classify one record. Records without a code are left unclassified.
pub fn reconcile_record(record: &ExtractionRecord, table: &ReferenceTable) -> ReconciliationResult {
    let (match_kind, suggestion) = match &record.code {
        None => (None, None),
        Some(_) if table.is_empty() => (None, None),
        Some(code) => match table.get(code.as_str()) {
            Some(entry) => {
                let extracted = record.amount_digits();
                let exact = matches!(
                    (entry.expected_digits.as_deref(), extracted.as_deref()),
                    (Some(expected), Some(actual)) if expected == actual
                );
                let kind = if exact {
                    MatchKind::Exact
                } else {
                    MatchKind::AmountMismatch
                };
                (Some(kind), None)
            }
            None => {
                let suggestion = suggest_code(code.as_str(), table);
                debug!(
                    "{}: unknown code {}, closest {:?}",
                    record.source,
                    code,
                    suggestion.as_ref().map(|s| s.code.as_str())
                );
                (Some(MatchKind::CodeUnknown), suggestion)
            }
        },
    };

    ReconciliationResult {
        record: record.clone(),
        match_kind,
        suggestion,
    }
}

/// Classify every record, keeping input order.
///
/// An empty table skips classification: every result comes back with no
/// match kind.
pub fn reconcile(records: &[ExtractionRecord], table: &ReferenceTable) -> Vec<ReconciliationResult> {
    if table.is_empty() {
        debug!("Empty reference table, skipping reconciliation");
    }

    let results: Vec<ReconciliationResult> = records
        .iter()
        .map(|record| reconcile_record(record, table))
        .collect();

    let summary = ReconciliationSummary::from_results(&results);
    info!(
        "Reconciled {} record(s): {} exact, {} amount mismatch, {} unknown, {} unreadable",
        results.len(),
        summary.exact,
        summary.amount_mismatch,
        summary.code_unknown,
        summary.unreadable
    );

    results
}

/// Counts per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub exact: usize,
    pub amount_mismatch: usize,
    pub code_unknown: usize,
    pub unreadable: usize,
    pub unchecked: usize,
}

impl ReconciliationSummary {
    pub fn from_results(results: &[ReconciliationResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.match_kind {
                Some(MatchKind::Exact) => summary.exact += 1,
                Some(MatchKind::AmountMismatch) => summary.amount_mismatch += 1,
                Some(MatchKind::CodeUnknown) => summary.code_unknown += 1,
                None if result.is_unreadable() => summary.unreadable += 1,
                None => summary.unchecked += 1,
            }
        }
        summary
    }
}
