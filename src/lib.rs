//! # ref-checker
//!
//! A library for checking the alleles of GWAS summary statistics against a
//! reference genome.
//!
//! Summary statistics come from many pipelines, and the effect and
//! non-effect alleles of a variant are not always reported on the same
//! strand, or in the same order, as the reference. `ref-checker` compares
//! each variant's alleles with the reference bases at its position and
//! records the outcome as one digit of the variant's status code.
//!
//! ## Features
//!
//! - **Strand-aware matching**: Detects forward, flipped and reverse-complement alleles
//! - **Indel ambiguity**: Flags indels whose alleles both match the reference
//! - **Batched classification**: Bulk array comparisons over an encoded reference
//! - **Sequential fallback**: Row-by-row classification with identical results
//! - **Diagnostics**: Matching and flip rates with build/orientation warnings
//!
//! ## Example
//!
//! ```rust
//! use ref_checker::{ReferenceChecker, ReferenceSequences, VariantRecord};
//!
//! let reference: ReferenceSequences = [("1", b"ACTGAAG".to_vec())].into_iter().collect();
//! let mut variants = vec![
//!     VariantRecord::new("1", 2, "C", "G"),
//!     VariantRecord::new("1", 2, "G", "C"),
//! ];
//!
//! let summary = ReferenceChecker::default().check(&mut variants, &reference).unwrap();
//! assert_eq!(variants[1].status, "9999939");
//! println!("Matching rate: {:.1}%", summary.matching_rate.unwrap() * 100.0);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Nucleotide alphabet, reference index, status codes and variant records
//! - [`matching`]: Window extraction, classification and the batch orchestrator
//! - [`parsing`]: FASTA and summary-statistics table I/O
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;

// Re-export commonly used types for convenience
pub use core::reference::{ReferenceIndex, ReferenceSequences};
pub use core::status::{RefMatchStatus, StatusField, StatusMatrix};
pub use core::variant::VariantRecord;
pub use matching::diagnosis::CheckSummary;
pub use matching::engine::{CheckConfig, CheckError, ReferenceChecker};
