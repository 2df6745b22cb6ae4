use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::{print_summary, ColumnArgs, OutputFormat};
use crate::matching::engine::{CheckConfig, ReferenceChecker};
use crate::parsing::fasta::load_reference;
use crate::parsing::table::{read_table, write_table, write_table_to};

#[derive(Args)]
pub struct CheckArgs {
    /// Summary-statistics table (delimited text, optionally gzipped)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Reference FASTA (optionally gzipped)
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Write the checked table here; written to stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON file with checker settings; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Drop variants that are not on the reference
    #[arg(long)]
    pub remove_not_on_reference: bool,

    /// Longest allele checked in the short-allele batch [default: 4]
    #[arg(long)]
    pub short_allele_threshold: Option<usize>,

    /// Field delimiter of the table
    #[arg(short, long, default_value = "\t")]
    pub delimiter: char,

    #[command(flatten)]
    pub columns: ColumnArgs,
}

impl CheckArgs {
    /// Settings from the config file with command-line overrides applied
    fn config(&self) -> anyhow::Result<CheckConfig> {
        let mut config = match &self.config {
            Some(path) => CheckConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => CheckConfig::default(),
        };
        if self.remove_not_on_reference {
            config.remove_not_on_reference = true;
        }
        if let Some(threshold) = self.short_allele_threshold {
            config.short_allele_threshold = threshold;
        }
        self.columns.apply(&mut config.columns);
        Ok(config)
    }
}

/// Execute check subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, the table or reference is
/// malformed, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CheckArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config()?;

    let mut table = read_table(&args.input, args.delimiter, &config.columns)
        .with_context(|| format!("Failed to read table {}", args.input.display()))?;
    let wanted = table.chromosomes();
    let reference = load_reference(&args.reference, &wanted)
        .with_context(|| format!("Failed to read reference {}", args.reference.display()))?;

    if verbose {
        eprintln!(
            "Parsed {} variants on {} chromosomes, {} found in the reference",
            table.records.len(),
            wanted.len(),
            reference.len()
        );
    }

    let checker = ReferenceChecker::new(config);
    let summary = checker.check(&mut table.records, &reference)?;

    match &args.output {
        Some(path) => {
            write_table(path, &table)
                .with_context(|| format!("Failed to write table {}", path.display()))?;
            print_summary(&summary, checker.config(), format)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            write_table_to(&mut stdout, &table)?;
        }
    }

    Ok(())
}
