//! Extract command - OCR voucher images and pull out codes and amounts.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use vrec_core::{
    reconcile, wait_for_results, BatchMode, BatchOutput, BatchProcessor, BatchRequest,
    BatchWorker, ExtractionRecord, ImageSource, PureOcrEngine, ReconciliationSummary,
    ReferenceTable,
};

use super::output::{render_full_text, render_results, OutputFormat};
use super::{load_config, load_reference, write_output};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// What to produce for each image
    #[arg(long, value_enum, default_value = "code")]
    mode: ModeArg,

    /// Reference list of `code amount` lines to check results against
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Strip hyphens from reference codes before matching
    #[arg(long)]
    ignore_hyphens: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Language hint for OCR
    #[arg(short, long)]
    language: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Raw OCR text per image
    Full,
    /// Code and amount per image
    Code,
}

impl From<ModeArg> for BatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Full => BatchMode::Full,
            ModeArg::Code => BatchMode::Code,
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(language) = &args.language {
        config.ocr.language = language.clone();
    }
    let ignore_hyphens = args.ignore_hyphens || config.reconciliation.ignore_reference_hyphens;

    // Fail on an unreadable reference list before spending time on OCR
    let table = match &args.reference {
        Some(path) => Some(load_reference(path, ignore_hyphens)?),
        None => None,
    };

    let files = collect_images(&args.input)?;
    eprintln!(
        "{} Found {} image(s) to process",
        style("ℹ").blue(),
        files.len()
    );

    let model_dir = args
        .model_dir
        .clone()
        .unwrap_or_else(|| config.ocr.model_dir.clone());
    let engine = PureOcrEngine::from_dir(&model_dir, &config.ocr).map_err(|e| {
        anyhow::anyhow!(
            "OCR models not available in {}: {}",
            model_dir.display(),
            e
        )
    })?;

    let processor = BatchProcessor::from_config(engine, &config);
    let mut worker = BatchWorker::new(processor);

    let mode = BatchMode::from(args.mode);
    let sources: Vec<ImageSource> = files.iter().map(ImageSource::file).collect();
    let rx = worker.start(BatchRequest { sources, mode });

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let outputs = wait_for_results(rx, |progress| {
        debug!("{}", progress);
        pb.set_position(progress.index.saturating_sub(1) as u64);
        pb.set_message(progress.source.clone());
    })
    .await?;

    pb.finish_and_clear();
    info!("Processed {} image(s) in {:?}", outputs.len(), start.elapsed());

    let content = match mode {
        BatchMode::Full => render_full_text(&outputs, args.format)?,
        BatchMode::Code => {
            let records = collect_records(outputs);
            let failed = records.iter().filter(|r| r.is_failed()).count();
            let table = table.unwrap_or_else(ReferenceTable::new);
            let results = reconcile(&records, &table);

            print_summary(&ReconciliationSummary::from_results(&results), failed, !table.is_empty());
            render_results(&results, args.format)?
        }
    };

    write_output(&content, args.output.as_deref())?;

    eprintln!(
        "{} Processed {} image(s) in {:.2?}",
        style("✓").green(),
        files.len(),
        start.elapsed()
    );

    Ok(())
}

/// Expand the input pattern to image files, sorted by path.
fn collect_images(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching image files found for pattern: {}", pattern);
    }

    files.sort();
    Ok(files)
}

fn collect_records(outputs: Vec<BatchOutput>) -> Vec<ExtractionRecord> {
    outputs
        .into_iter()
        .filter_map(|output| match output {
            BatchOutput::Record(record) => Some(record),
            BatchOutput::Text(_) => None,
        })
        .collect()
}

fn print_summary(summary: &ReconciliationSummary, failed: usize, checked: bool) {
    if checked {
        eprintln!(
            "{} {} exact, {} amount mismatch, {} unknown code, {} unreadable",
            style("ℹ").blue(),
            style(summary.exact).green(),
            style(summary.amount_mismatch).yellow(),
            style(summary.code_unknown).red(),
            summary.unreadable
        );
    } else {
        eprintln!(
            "{} {} code(s) read, {} unreadable",
            style("ℹ").blue(),
            summary.unchecked,
            summary.unreadable
        );
    }

    if failed > 0 {
        eprintln!(
            "{} {} image(s) could not be processed",
            style("✗").red(),
            failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_images_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jpg", "a.PNG", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let pattern = format!("{}/*", dir.path().display());
        let files = collect_images(&pattern).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.PNG", "b.jpg"]);
    }

    #[test]
    fn test_collect_images_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.png", dir.path().display());
        assert!(collect_images(&pattern).is_err());
    }
}
