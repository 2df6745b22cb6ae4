//! Readers and writers for the files the checker works on.
//!
//! - **FASTA files**: Reference sequences, plain or gzip/bgzip compressed
//! - **Delimited tables**: Summary statistics with CHR, POS, EA, NEA and STATUS
//!
//! ## Example
//!
//! ```rust,no_run
//! use ref_checker::parsing::fasta::load_reference;
//! use ref_checker::parsing::table::{read_table, ColumnNames};
//! use std::path::Path;
//!
//! let table = read_table(Path::new("sumstats.tsv.gz"), '\t', &ColumnNames::default()).unwrap();
//! let reference = load_reference(Path::new("hg19.fa.gz"), &table.chromosomes()).unwrap();
//! ```

use thiserror::Error;

pub mod fasta;
pub mod table;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid table format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),
}
