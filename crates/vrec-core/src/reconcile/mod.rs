//! Reference list parsing and reconciliation.

mod engine;
mod fuzzy;
mod reference;

pub use engine::{reconcile, reconcile_record, MatchKind, ReconciliationResult, ReconciliationSummary};
pub use fuzzy::{edit_distance, suggest_code, Suggestion};
pub use reference::{strip_reference_hyphens, ReferenceEntry, ReferenceTable};
