//! Rendering extraction and reconciliation results.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use vrec_core::export::{code_amount_pairs, codes_only};
use vrec_core::{
    format_full_text, AmountField, BatchMode, BatchOutput, ExtractionRecord, MatchKind,
    ReconciliationResult, ReconciliationSummary,
};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON report
    Json,
    /// CSV, one row per image
    Csv,
    /// Human-readable listing
    Text,
    /// Extracted codes only, one per line
    Codes,
    /// `code amount` pairs, usable as a reference list
    Pairs,
}

/// JSON report written by `extract` and `reconcile`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Report<T> {
    pub generated_at: DateTime<Utc>,
    pub mode: BatchMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReconciliationSummary>,
    pub results: Vec<T>,
}

impl<T> Report<T> {
    pub fn new(mode: BatchMode, results: Vec<T>) -> Self {
        Self {
            generated_at: Utc::now(),
            mode,
            summary: None,
            results,
        }
    }

    pub fn with_summary(mut self, summary: ReconciliationSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// Render code-mode results.
pub fn render_results(
    results: &[ReconciliationResult],
    format: OutputFormat,
) -> anyhow::Result<String> {
    let records: Vec<ExtractionRecord> = results.iter().map(|r| r.record.clone()).collect();

    let content = match format {
        OutputFormat::Json => {
            let summary = ReconciliationSummary::from_results(results);
            let report = Report::new(BatchMode::Code, results.to_vec()).with_summary(summary);
            serde_json::to_string_pretty(&report)?
        }
        OutputFormat::Csv => format_results_csv(results)?,
        OutputFormat::Text => format_results_text(results),
        OutputFormat::Codes => codes_only(&records),
        OutputFormat::Pairs => code_amount_pairs(&records),
    };

    Ok(content)
}

/// Render full-text mode output.
///
/// Only JSON keeps the structured form; every other format prints the text
/// blocks.
pub fn render_full_text(outputs: &[BatchOutput], format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        let report = Report::new(BatchMode::Full, outputs.to_vec());
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    let blocks: Vec<String> = outputs
        .iter()
        .map(|output| match output {
            BatchOutput::Text(text) => text.clone(),
            BatchOutput::Record(record) => format_full_text(
                &record.source,
                &format!("[error: {}]", record.error.as_deref().unwrap_or("unknown")),
            ),
        })
        .collect();

    Ok(blocks.join("\n\n"))
}

/// Result mark: ◎ exact, △ amount mismatch, ！ unknown code.
pub fn match_mark(kind: Option<MatchKind>) -> &'static str {
    match kind {
        Some(MatchKind::Exact) => "◎",
        Some(MatchKind::AmountMismatch) => "△",
        Some(MatchKind::CodeUnknown) => "！",
        None => " ",
    }
}

fn match_label(kind: Option<MatchKind>) -> &'static str {
    match kind {
        Some(MatchKind::Exact) => "exact",
        Some(MatchKind::AmountMismatch) => "amount_mismatch",
        Some(MatchKind::CodeUnknown) => "code_unknown",
        None => "",
    }
}

fn amount_text(amount: &AmountField) -> String {
    match amount {
        AmountField::Found(amount) => amount.display.clone(),
        AmountField::NotFound => "amount not found".to_string(),
        AmountField::Failed => "failed".to_string(),
    }
}

fn format_results_text(results: &[ReconciliationResult]) -> String {
    let mut output = String::new();

    for result in results {
        let record = &result.record;
        let mark = match_mark(result.match_kind);

        match &record.code {
            Some(code) => {
                output.push_str(&format!(
                    "{} {} ({} chars)  {}  [{}]\n",
                    mark,
                    code,
                    code.digit_count(),
                    amount_text(&record.amount),
                    record.source
                ));
            }
            None => {
                output.push_str(&format!(
                    "{} (no code)  {}  [{}]\n",
                    mark,
                    amount_text(&record.amount),
                    record.source
                ));
            }
        }

        if let Some(error) = &record.error {
            output.push_str(&format!("    error: {}\n", error));
        }

        match result.match_kind {
            Some(MatchKind::AmountMismatch) => {
                output.push_str("    amount differs from the reference list\n");
            }
            Some(MatchKind::CodeUnknown) => {
                output.push_str("    code not in the reference list\n");
                if let Some(suggestion) = &result.suggestion {
                    output.push_str(&format!(
                        "    closest: {} (distance {})\n",
                        suggestion.code, suggestion.distance
                    ));
                }
            }
            _ => {}
        }
    }

    output.trim_end().to_string()
}

fn format_results_csv(results: &[ReconciliationResult]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "source",
        "code",
        "chars",
        "amount",
        "amount_value",
        "match",
        "suggestion",
        "error",
    ])?;

    for result in results {
        let record = &result.record;
        let code = record.code.as_ref();
        let amount = record.amount.amount();

        wtr.write_record([
            record.source.clone(),
            code.map(|c| c.to_string()).unwrap_or_default(),
            code.map(|c| c.digit_count().to_string()).unwrap_or_default(),
            amount_text(&record.amount),
            amount.map(|a| a.value.to_string()).unwrap_or_default(),
            match_label(result.match_kind).to_string(),
            result
                .suggestion
                .as_ref()
                .map(|s| s.code.clone())
                .unwrap_or_default(),
            record.error.clone().unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
