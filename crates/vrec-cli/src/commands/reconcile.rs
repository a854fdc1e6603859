//! Reconcile command - check saved extraction results against a reference list.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;
use tracing::info;

use vrec_core::{reconcile, ExtractionRecord, ReconciliationResult};

use super::output::{render_results, OutputFormat, Report};
use super::{load_config, load_reference, write_output};

/// Arguments for the reconcile command.
#[derive(Args)]
pub struct ReconcileArgs {
    /// JSON report from `vrec extract --format json`, or a JSON array of records
    #[arg(long, required = true)]
    records: PathBuf,

    /// Reference list of `code amount` lines
    #[arg(short, long, required = true)]
    reference: PathBuf,

    /// Strip hyphens from reference codes before matching
    #[arg(long)]
    ignore_hyphens: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Accepted shapes of the records file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    Report(Report<ReconciliationResult>),
    Records(Vec<ExtractionRecord>),
}

impl RecordsFile {
    fn into_records(self) -> Vec<ExtractionRecord> {
        match self {
            RecordsFile::Report(report) => report.results.into_iter().map(|r| r.record).collect(),
            RecordsFile::Records(records) => records,
        }
    }
}

pub async fn run(args: ReconcileArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let ignore_hyphens = args.ignore_hyphens || config.reconciliation.ignore_reference_hyphens;

    let records = load_records(&args.records)?;
    let table = load_reference(&args.reference, ignore_hyphens)?;
    info!(
        "Checking {} record(s) against {} reference code(s)",
        records.len(),
        table.len()
    );

    // Previous classifications are discarded; results only depend on the
    // records and the current table.
    let results = reconcile(&records, &table);
    let content = render_results(&results, args.format)?;

    write_output(&content, args.output.as_deref())
}

fn load_records(path: &Path) -> anyhow::Result<Vec<ExtractionRecord>> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read records {}: {}", path.display(), e))?;
    let file: RecordsFile = serde_json::from_str(&content).map_err(|_| {
        anyhow::anyhow!(
            "{} is neither an extraction report nor a JSON array of records",
            path.display()
        )
    })?;
    Ok(file.into_records())
}
