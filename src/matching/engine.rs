use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::reference::{ReferenceIndex, ReferenceSequences};
use crate::core::status::{RefMatchStatus, StatusError, StatusField, StatusMatrix};
use crate::core::variant::VariantRecord;
use crate::matching::decision::CheckRow;
use crate::matching::diagnosis::{CheckSummary, ExecutionPath};
use crate::matching::sequential::{self, RowError};
use crate::matching::vectorized::{self, VectorizedError};
use crate::parsing::table::ColumnNames;

/// Default allele length separating short from long batches
pub const DEFAULT_SHORT_ALLELE_THRESHOLD: usize = 4;

/// Matching rate below which a wrong reference build is suspected
pub const DEFAULT_LOW_MATCHING_RATE: f64 = 0.80;

/// Flip rate above which EA is suspected to be aligned with REF
pub const DEFAULT_HIGH_FLIP_RATE: f64 = 0.85;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Configuration for the reference checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Rows whose alleles are all at most this long are batched together
    pub short_allele_threshold: usize,
    /// Warn when (match + flipped) / available falls below this
    pub low_matching_rate: f64,
    /// Report when flipped / available exceeds this
    pub high_flip_rate: f64,
    /// Drop rows classified as not on reference after the check
    pub remove_not_on_reference: bool,
    /// Column names of the summary-statistics table
    pub columns: ColumnNames,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            short_allele_threshold: DEFAULT_SHORT_ALLELE_THRESHOLD,
            low_matching_rate: DEFAULT_LOW_MATCHING_RATE,
            high_flip_rate: DEFAULT_HIGH_FLIP_RATE,
            remove_not_on_reference: false,
            columns: ColumnNames::default(),
        }
    }
}

impl CheckConfig {
    /// Load config from a JSON file; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse config from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Errors that abort a reference check. The table is left untouched.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    InvalidAllele(#[from] RowError),

    #[error(transparent)]
    Status(#[from] StatusError),
}

/// Digits produced for the selected rows and how they were produced
struct Classified {
    statuses: Vec<RefMatchStatus>,
    path: ExecutionPath,
    fallback_reason: Option<String>,
}

/// Assigns the reference-match digit of every checkable variant
#[derive(Debug, Clone, Default)]
pub struct ReferenceChecker {
    config: CheckConfig,
}

impl ReferenceChecker {
    #[must_use]
    pub fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check every variant against the reference and rewrite its status.
    ///
    /// Only the reference-match digit is written, and only for rows that have
    /// a position, both alleles, and a valid chromosome present in
    /// `reference`. Other rows keep their status unchanged. A chromosome
    /// holding a non-nucleotide symbol is skipped with a warning. With
    /// `remove_not_on_reference` set, rows ending up with digit 8 are dropped
    /// afterwards, preserving the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns `CheckError::Status` if the status codes are malformed, or
    /// `CheckError::InvalidAllele` if an allele holds a non-nucleotide
    /// symbol. On error no status is modified.
    pub fn check(
        &self,
        variants: &mut Vec<VariantRecord>,
        reference: &ReferenceSequences,
    ) -> Result<CheckSummary, CheckError> {
        let statuses: Vec<&str> = variants.iter().map(|v| v.status.as_str()).collect();
        let mut matrix = StatusMatrix::decode(&statuses)?;

        let wanted: BTreeSet<&str> = variants
            .iter()
            .filter(|v| v.is_available())
            .map(|v| v.chrom.as_str())
            .collect();
        let mut index = ReferenceIndex::build(reference, wanted.iter().copied());
        for error in index.invalid() {
            warn!(%error, "Skipping reference chromosome");
        }
        debug!(
            chromosomes = index.chromosomes().len(),
            bases = index.len(),
            "Built reference index"
        );

        let (updates, skipped, path, fallback_reason) = {
            let (rows, skipped) = select_rows(variants, &index);
            let classified = self.classify(&mut index, &rows)?;
            let updates: Vec<(usize, RefMatchStatus)> = rows
                .iter()
                .map(|r| r.row)
                .zip(classified.statuses)
                .collect();
            (
                updates,
                skipped,
                classified.path,
                classified.fallback_reason,
            )
        };

        let mut column = matrix.column(StatusField::ReferenceMatch).to_owned();
        for &(row, status) in &updates {
            column[row] = status.digit();
        }
        matrix.set_column(StatusField::ReferenceMatch, &column);
        for (variant, status) in variants.iter_mut().zip(matrix.encode()) {
            variant.status = status;
        }

        let mut summary = CheckSummary::from_matrix(&matrix, variants);
        summary.checked = updates.len();
        summary.missing_chromosome = skipped.missing_chromosome;
        summary.invalid_reference = skipped.invalid_reference;
        summary.path = path;
        summary.fallback_reason = fallback_reason;

        if self.config.remove_not_on_reference {
            let not_on_reference = RefMatchStatus::NotOnReference.digit();
            let keep: Vec<bool> = matrix
                .column(StatusField::ReferenceMatch)
                .iter()
                .map(|&d| d != not_on_reference)
                .collect();
            let mut row = 0;
            variants.retain(|_| {
                let kept = keep[row];
                row += 1;
                kept
            });
            summary.removed = summary.total - variants.len();
        }

        summary.log(&self.config);
        Ok(summary)
    }

    /// Batched classification, or the row-by-row path if the batch fails
    fn classify(
        &self,
        index: &mut ReferenceIndex,
        rows: &[CheckRow<'_>],
    ) -> Result<Classified, CheckError> {
        if rows.is_empty() {
            return Ok(Classified {
                statuses: Vec::new(),
                path: ExecutionPath::Skipped,
                fallback_reason: None,
            });
        }

        match self.classify_vectorized(index, rows) {
            Ok(statuses) => Ok(Classified {
                statuses,
                path: ExecutionPath::Vectorized,
                fallback_reason: None,
            }),
            Err(e) => {
                warn!(
                    reason = %e,
                    "Batched reference check failed, checking rows one at a time"
                );
                let statuses = sequential::classify_rows(index, rows)?;
                Ok(Classified {
                    statuses,
                    path: ExecutionPath::Sequential,
                    fallback_reason: Some(e.to_string()),
                })
            }
        }
    }

    /// Classify short and long rows as two batches and merge in row order.
    ///
    /// Nothing is returned unless both batches succeed.
    fn classify_vectorized(
        &self,
        index: &mut ReferenceIndex,
        rows: &[CheckRow<'_>],
    ) -> Result<Vec<RefMatchStatus>, VectorizedError> {
        let threshold = self.config.short_allele_threshold;
        let (short, long): (Vec<usize>, Vec<usize>) =
            (0..rows.len()).partition(|&i| rows[i].max_allele_len() <= threshold);

        let mut merged = vec![RefMatchStatus::Unchecked; rows.len()];
        for (label, subset) in [("short", short), ("long", long)] {
            if subset.is_empty() {
                continue;
            }
            debug!(
                batch = label,
                rows = subset.len(),
                threshold,
                "Checking allele batch"
            );
            let batch: Vec<CheckRow<'_>> = subset.iter().map(|&i| rows[i]).collect();
            let statuses = vectorized::classify_batch(index, &batch)?;
            for (&i, status) in subset.iter().zip(statuses) {
                merged[i] = status;
            }
        }

        Ok(merged)
    }
}

/// Available rows left out of the check, by reason
#[derive(Debug, Default, Clone, Copy)]
struct Skipped {
    missing_chromosome: usize,
    invalid_reference: usize,
}

/// Rows eligible for checking, and the available rows whose chromosome is
/// not indexed
fn select_rows<'a>(
    variants: &'a [VariantRecord],
    index: &ReferenceIndex,
) -> (Vec<CheckRow<'a>>, Skipped) {
    let mut rows = Vec::with_capacity(variants.len());
    let mut skipped = Skipped::default();

    for (row, variant) in variants.iter().enumerate() {
        let (Some(pos), Some(nea), Some(ea)) =
            (variant.pos, variant.nea.as_deref(), variant.ea.as_deref())
        else {
            continue;
        };
        match index.slot(&variant.chrom) {
            Some(slot) => rows.push(CheckRow {
                row,
                slot,
                pos,
                nea,
                ea,
            }),
            None if index.is_invalid(&variant.chrom) => skipped.invalid_reference += 1,
            None => skipped.missing_chromosome += 1,
        }
    }

    (rows, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ReferenceSequences {
        [("1", b"ACTGAAG".to_vec()), ("2", b"TTGCA".to_vec())]
            .into_iter()
            .collect()
    }

    fn digits(variants: &[VariantRecord]) -> Vec<char> {
        variants
            .iter()
            .map(|v| v.status.as_bytes()[5] as char)
            .collect()
    }

    #[test]
    fn test_reference_scenarios() {
        let mut variants = vec![
            VariantRecord::new("1", 2, "C", "G"),
            VariantRecord::new("1", 2, "G", "C"),
            VariantRecord::new("1", 6, "T", "C"),
            VariantRecord::new("1", 6, "C", "T"),
            VariantRecord::new("1", 2, "A", "T"),
        ];
        let summary = ReferenceChecker::default()
            .check(&mut variants, &reference())
            .unwrap();

        assert_eq!(digits(&variants), vec!['0', '3', '4', '5', '8']);
        assert_eq!(variants[0].status, "9999909");
        assert_eq!(summary.checked, 5);
        assert_eq!(summary.path, ExecutionPath::Vectorized);
        assert!((summary.matching_rate.unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_only_reference_digit_is_written() {
        let mut variants = vec![VariantRecord::new("1", 2, "C", "G").with_status("1960399")];
        ReferenceChecker::default()
            .check(&mut variants, &reference())
            .unwrap();
        assert_eq!(variants[0].status, "1960309");
    }

    #[test]
    fn test_unavailable_and_missing_chromosome_rows_unchanged() {
        let mut no_allele = VariantRecord::new("1", 2, "C", "G").with_status("1960399");
        no_allele.ea = None;
        let mut variants = vec![
            no_allele,
            VariantRecord::new("X", 2, "C", "G").with_status("1960399"),
            VariantRecord::new("2", 3, "G", "A"),
            VariantRecord::new("Y", 1, "A", "C"),
        ];
        let summary = ReferenceChecker::default()
            .check(&mut variants, &reference())
            .unwrap();

        assert_eq!(variants[0].status, "1960399");
        assert_eq!(variants[1].status, "1960399");
        assert_eq!(variants[2].status, "9999909");
        assert_eq!(variants[3].status, "9999999");
        assert_eq!(summary.available, 3);
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.missing_chromosome, 2);
        assert_eq!(summary.counts.unchecked, 3);
    }

    #[test]
    fn test_check_is_idempotent() {
        let mut variants = vec![
            VariantRecord::new("1", 2, "CT", "C"),
            VariantRecord::new("2", 1, "CAA", "G"),
            VariantRecord::new("1", 3, "ACGTACGT", "T"),
        ];
        let checker = ReferenceChecker::default();
        checker.check(&mut variants, &reference()).unwrap();
        let first = variants.clone();
        checker.check(&mut variants, &reference()).unwrap();
        assert_eq!(variants, first);
    }

    #[test]
    fn test_long_and_short_batches_are_merged_in_order() {
        let mut variants = vec![
            VariantRecord::new("1", 2, "CTGAA", "G"),
            VariantRecord::new("1", 2, "G", "C"),
            VariantRecord::new("1", 2, "G", "CTGAAG"),
            VariantRecord::new("1", 2, "C", "G"),
        ];
        let summary = ReferenceChecker::default()
            .check(&mut variants, &reference())
            .unwrap();
        assert_eq!(digits(&variants), vec!['0', '3', '3', '0']);
        assert_eq!(summary.path, ExecutionPath::Vectorized);
    }

    #[test]
    fn test_out_of_range_position_stays_batched() {
        let mut variants = vec![
            VariantRecord::new("1", 2, "C", "G"),
            VariantRecord::new("2", 99, "A", "C"),
            VariantRecord::new("1", 0, "A", "C"),
        ];
        let summary = ReferenceChecker::default()
            .check(&mut variants, &reference())
            .unwrap();

        assert_eq!(digits(&variants), vec!['0', '8', '8']);
        assert_eq!(summary.path, ExecutionPath::Vectorized);
        assert_eq!(summary.fallback_reason, None);
    }

    #[test]
    fn test_one_row_past_chromosome_end_keeps_large_batch_batched() {
        let mut variants = vec![VariantRecord::new("1", 2, "C", "G"); 1000];
        variants.push(VariantRecord::new("1", 8, "A", "C"));
        let summary = ReferenceChecker::default()
            .check(&mut variants, &reference())
            .unwrap();

        assert_eq!(summary.path, ExecutionPath::Vectorized);
        assert_eq!(summary.counts.matched, 1000);
        assert_eq!(summary.counts.not_on_reference, 1);
        assert_eq!(variants[1000].status, "9999989");
    }

    #[test]
    fn test_invalid_allele_is_reported() {
        let mut variants = vec![
            VariantRecord::new("1", 2, "C", "G"),
            VariantRecord::new("1", 3, "T", "<INS>"),
        ];
        let before = variants.clone();
        let err = ReferenceChecker::default()
            .check(&mut variants, &reference())
            .unwrap_err();

        assert!(matches!(err, CheckError::InvalidAllele(RowError { row: 1, .. })));
        assert_eq!(
            err.to_string(),
            "Invalid allele in record 2: Invalid nucleotide '<' at position 0"
        );
        assert_eq!(variants, before);
    }

    #[test]
    fn test_invalid_reference_chromosome_is_skipped() {
        let reference: ReferenceSequences = [("1", b"ACTGAAG".to_vec()), ("3", b"ACMGT".to_vec())]
            .into_iter()
            .collect();
        let mut variants = vec![
            VariantRecord::new("1", 2, "C", "G"),
            VariantRecord::new("3", 1, "A", "C"),
        ];
        let summary = ReferenceChecker::default()
            .check(&mut variants, &reference)
            .unwrap();

        assert_eq!(variants[0].status, "9999909");
        assert_eq!(variants[1].status, "9999999");
        assert_eq!(summary.checked, 1);
        assert_eq!(summary.invalid_reference, 1);
        assert_eq!(summary.missing_chromosome, 0);
        assert_eq!(summary.path, ExecutionPath::Vectorized);
    }

    #[test]
    fn test_inconsistent_status_width_is_reported() {
        let mut variants = vec![
            VariantRecord::new("1", 2, "C", "G"),
            VariantRecord::new("1", 2, "C", "G").with_status("999999"),
        ];
        let err = ReferenceChecker::default()
            .check(&mut variants, &reference())
            .unwrap_err();
        assert!(matches!(err, CheckError::Status(_)));
    }

    #[test]
    fn test_remove_not_on_reference() {
        let config = CheckConfig {
            remove_not_on_reference: true,
            ..CheckConfig::default()
        };
        let mut variants = vec![
            VariantRecord::new("1", 2, "A", "T"),
            VariantRecord::new("1", 2, "C", "G"),
            VariantRecord::new("1", 2, "A", "T"),
            VariantRecord::new("X", 2, "A", "T"),
        ];
        let summary = ReferenceChecker::new(config)
            .check(&mut variants, &reference())
            .unwrap();

        assert_eq!(summary.removed, 2);
        assert_eq!(summary.counts.not_on_reference, 2);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].status, "9999909");
        assert_eq!(variants[1].chrom, "X");
    }

    #[test]
    fn test_empty_table() {
        let mut variants = Vec::new();
        let summary = ReferenceChecker::default()
            .check(&mut variants, &reference())
            .unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.path, ExecutionPath::Skipped);
        assert_eq!(summary.matching_rate, None);
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config = CheckConfig::from_json(r#"{"short_allele_threshold": 2}"#).unwrap();
        assert_eq!(config.short_allele_threshold, 2);
        assert!((config.low_matching_rate - DEFAULT_LOW_MATCHING_RATE).abs() < f64::EPSILON);
        assert_eq!(config.columns, ColumnNames::default());

        assert!(matches!(
            CheckConfig::from_json("{"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
