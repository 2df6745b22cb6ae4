//! Core data types for reference allele checking.
//!
//! - [`alphabet`]: nucleotide letter <-> compact code tables
//! - [`reference`]: raw reference sequences and the concatenated [`ReferenceIndex`]
//! - [`status`]: fixed-width status codes and the reference-match digit
//! - [`variant`]: a variant row of a summary-statistics table
//!
//! ## Chromosome naming
//!
//! Reference FASTA files and summary statistics rarely agree on naming.
//! Both sides are passed through [`normalize_chrom`] before lookup:
//!
//! | Input  | Normalised |
//! |--------|------------|
//! | chr1   | 1          |
//! | 1      | 1          |
//! | chrX   | X          |
//! | chrMT  | MT         |
//!
//! [`ReferenceIndex`]: reference::ReferenceIndex
//! [`normalize_chrom`]: reference::normalize_chrom

pub mod alphabet;
pub mod reference;
pub mod status;
pub mod variant;
