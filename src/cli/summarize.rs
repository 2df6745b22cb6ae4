use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{print_summary, ColumnArgs, OutputFormat};
use crate::matching::diagnosis::CheckSummary;
use crate::matching::engine::CheckConfig;
use crate::parsing::table::read_table;

#[derive(Args)]
pub struct SummarizeArgs {
    /// Checked summary-statistics table (delimited text, optionally gzipped)
    #[arg(required = true)]
    pub input: PathBuf,

    /// JSON file with checker settings (thresholds, column names)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Field delimiter of the table
    #[arg(short, long, default_value = "\t")]
    pub delimiter: char,

    #[command(flatten)]
    pub columns: ColumnArgs,
}

/// Execute summarize subcommand
///
/// # Errors
///
/// Returns an error if the table cannot be read or its status codes are malformed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SummarizeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => CheckConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CheckConfig::default(),
    };
    args.columns.apply(&mut config.columns);

    let table = read_table(&args.input, args.delimiter, &config.columns)
        .with_context(|| format!("Failed to read table {}", args.input.display()))?;
    if verbose {
        eprintln!("Parsed {} variants", table.records.len());
    }

    let summary = CheckSummary::from_records(&table.records)?;
    print_summary(&summary, &config, format)
}
