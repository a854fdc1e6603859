//! Subcommands.

pub mod config;
pub mod extract;
pub mod output;
pub mod reconcile;

use std::fs;
use std::path::Path;

use console::style;
use tracing::debug;

use vrec_core::models::config::VrecConfig;
use vrec_core::ReferenceTable;

/// Load the config named on the command line, else the default file if it
/// exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VrecConfig> {
    let config = match config_path {
        Some(path) => VrecConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                debug!("Using config from {}", default_path.display());
                VrecConfig::from_file(&default_path)?
            } else {
                VrecConfig::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Read and parse a reference list file.
pub fn load_reference(path: &Path, ignore_hyphens: bool) -> anyhow::Result<ReferenceTable> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read reference list {}: {}", path.display(), e))?;
    let table = ReferenceTable::parse_with_options(&text, ignore_hyphens);

    if table.is_empty() {
        eprintln!(
            "{} Reference list {} is empty, results are not checked",
            style("ℹ").blue(),
            path.display()
        );
    } else {
        debug!("Loaded {} reference code(s) from {}", table.len(), path.display());
    }

    Ok(table)
}

/// Write rendered output to a file, or stdout when no path is given.
pub fn write_output(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}
