//! Command-line interface for ref-checker.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **check**: Assign the reference-match digit of every variant in a table
//! - **summarize**: Report the reference-match digits already in a table
//!
//! ## Usage
//!
//! ```text
//! # Check a table and write the result
//! ref-checker check sumstats.tsv.gz --reference hg19.fa.gz -o checked.tsv.gz
//!
//! # Drop variants that do not match the reference, JSON summary
//! ref-checker check sumstats.tsv --reference hg19.fa -o out.tsv \
//!     --remove-not-on-reference --format json
//!
//! # Summarise a table checked earlier
//! ref-checker summarize checked.tsv.gz
//! ```

use clap::{Args, Parser, Subcommand};

use crate::core::status::RefMatchStatus;
use crate::matching::diagnosis::CheckSummary;
use crate::matching::engine::CheckConfig;
use crate::parsing::table::ColumnNames;

pub mod check;
pub mod summarize;

#[derive(Parser)]
#[command(name = "ref-checker")]
#[command(version)]
#[command(about = "Check GWAS variant alleles against a reference genome")]
#[command(
    long_about = "ref-checker compares the effect and non-effect alleles of each variant in a summary-statistics table with the reference genome at the variant's position.\n\nEach variant gets one reference-match digit in its STATUS code:\n- 0: NEA matches the reference\n- 3: alleles are flipped\n- 4/5: alleles are on the reverse strand\n- 6: indel whose alleles both match\n- 8: not on the reference"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format of the summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check variant alleles against a reference FASTA
    Check(check::CheckArgs),

    /// Summarise the reference-match digits of a checked table
    Summarize(summarize::SummarizeArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Column name overrides shared by the subcommands
#[derive(Args, Debug, Default)]
pub struct ColumnArgs {
    /// Chromosome column [default: CHR]
    #[arg(long)]
    pub chrom_col: Option<String>,

    /// Position column [default: POS]
    #[arg(long)]
    pub pos_col: Option<String>,

    /// Effect allele column [default: EA]
    #[arg(long)]
    pub ea_col: Option<String>,

    /// Non-effect allele column [default: NEA]
    #[arg(long)]
    pub nea_col: Option<String>,

    /// Status column, created if absent [default: STATUS]
    #[arg(long)]
    pub status_col: Option<String>,
}

impl ColumnArgs {
    /// Override the configured names with those given on the command line
    pub fn apply(&self, columns: &mut ColumnNames) {
        let overrides = [
            (&self.chrom_col, &mut columns.chrom),
            (&self.pos_col, &mut columns.pos),
            (&self.ea_col, &mut columns.ea),
            (&self.nea_col, &mut columns.nea),
            (&self.status_col, &mut columns.status),
        ];
        for (value, column) in overrides {
            if let Some(value) = value {
                column.clone_from(value);
            }
        }
    }
}

/// Print a check summary in the requested format
///
/// # Errors
///
/// Returns an error if JSON serialisation fails.
pub fn print_summary(
    summary: &CheckSummary,
    config: &CheckConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print_text_summary(summary, config),
        OutputFormat::Json => print_json_summary(summary, config)?,
        OutputFormat::Tsv => print_tsv_summary(summary),
    }
    Ok(())
}

fn print_text_summary(summary: &CheckSummary, config: &CheckConfig) {
    println!("Reference check summary");
    println!("   Rows: {}", summary.total);
    println!("   Available to check: {}", summary.available);
    println!("   Checked: {} ({:?})", summary.checked, summary.path);
    if summary.missing_chromosome > 0 {
        println!(
            "   Chromosome not in reference: {}",
            summary.missing_chromosome
        );
    }
    if summary.invalid_reference > 0 {
        println!(
            "   Invalid reference sequence: {}",
            summary.invalid_reference
        );
    }
    if summary.removed > 0 {
        println!("   Removed (not on reference): {}", summary.removed);
    }

    println!("\nReference-match digits:");
    for status in RefMatchStatus::ALL {
        println!(
            "   {}  {:<48} {}",
            status.digit(),
            status.description(),
            summary.counts.get(status)
        );
    }
    if summary.counts.other > 0 {
        println!("   -  {:<48} {}", "Other digits", summary.counts.other);
    }

    if let Some(rate) = summary.matching_rate {
        println!("\nMatching rate: {:.2}%", rate * 100.0);
    }
    if let Some(rate) = summary.flip_rate {
        println!("Flip rate: {:.2}%", rate * 100.0);
    }
    if summary.has_low_matching_rate(config) {
        println!("\nWarning: matching rate is low, check that the right reference genome is used");
    }
    if summary.has_high_flip_rate(config) {
        println!("\nNote: most variants are flipped, EA is likely aligned with REF");
    }
    if let Some(reason) = &summary.fallback_reason {
        println!("\nBatched check fell back to row-by-row: {reason}");
    }
}

fn print_json_summary(summary: &CheckSummary, config: &CheckConfig) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "summary": summary,
        "warnings": {
            "low_matching_rate": summary.has_low_matching_rate(config),
            "high_flip_rate": summary.has_high_flip_rate(config),
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(summary: &CheckSummary) {
    println!("digit\tdescription\tcount");
    for status in RefMatchStatus::ALL {
        println!(
            "{}\t{}\t{}",
            status.digit(),
            status.description(),
            summary.counts.get(status)
        );
    }
}
