//! Reference-allele matching.
//!
//! - [`ReferenceChecker`]: Entry point assigning the reference-match digit of a table
//! - [`MatchPredicates`]: The four prefix comparisons and the decision table
//! - [`CheckSummary`]: Counts, rates and the execution path of one check
//!
//! ## Algorithm
//!
//! For each variant with a position, both alleles, and a chromosome present
//! in the reference, the window of reference bases starting at the position
//! is compared with:
//!
//! 1. **NEA** and **EA** as written (forward strand)
//! 2. The **reverse complement** of each allele (reverse strand)
//!
//! Only the real bases of an allele take part in a comparison, so an allele
//! matches when it is a prefix of the window. The resulting predicates map to
//! one digit:
//!
//! | Digit | Meaning |
//! |-------|---------|
//! | 0 | NEA matches the reference |
//! | 3 | EA matches the reference (alleles flipped) |
//! | 4 | rc(NEA) matches (reverse strand) |
//! | 5 | rc(EA) matches (reverse strand, flipped) |
//! | 6 | Both alleles match forward (indel ambiguity) |
//! | 8 | No usable match |
//!
//! ## Execution
//!
//! Rows are split by allele length into a short and a long batch, each
//! classified with array operations by [`vectorized`]. If either batch fails
//! the whole selection is re-classified row by row by [`sequential`]; both
//! paths produce identical digits.
//!
//! ## Example
//!
//! ```rust
//! use ref_checker::{ReferenceChecker, ReferenceSequences, VariantRecord};
//!
//! let reference: ReferenceSequences = [("1", b"ACTGAAG".to_vec())].into_iter().collect();
//! let mut variants = vec![VariantRecord::new("1", 2, "C", "G")];
//!
//! let summary = ReferenceChecker::default().check(&mut variants, &reference).unwrap();
//! assert_eq!(variants[0].status, "9999909");
//! assert_eq!(summary.counts.matched, 1);
//! ```

pub mod decision;
pub mod diagnosis;
pub mod engine;
pub mod sequential;
pub mod vectorized;
pub mod window;

pub use decision::MatchPredicates;
pub use diagnosis::{CheckSummary, ExecutionPath, StatusCounts};
pub use engine::{CheckConfig, CheckError, ReferenceChecker};
