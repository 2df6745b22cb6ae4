use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::status::{RefMatchStatus, StatusError, StatusField, StatusMatrix};
use crate::core::variant::VariantRecord;
use crate::matching::engine::CheckConfig;

/// Helper function to convert usize count to f64 with explicit precision loss allowance
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Which classifier produced the reference-match digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPath {
    /// Batched array comparison
    Vectorized,
    /// Row-by-row fallback after the batched path failed
    Sequential,
    /// Nothing was eligible for checking
    Skipped,
}

/// Number of rows per reference-match digit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub matched: usize,
    pub flipped: usize,
    pub reverse_complement: usize,
    pub reverse_complement_flipped: usize,
    pub ambiguous: usize,
    pub not_on_reference: usize,
    pub unchecked: usize,
    /// Digits written by other tools (1, 2, 7)
    pub other: usize,
}

impl StatusCounts {
    /// Tally reference-match digits
    pub fn from_digits(digits: impl IntoIterator<Item = u8>) -> Self {
        let mut counts = Self::default();
        for digit in digits {
            match RefMatchStatus::from_digit(digit) {
                Some(status) => *counts.slot_mut(status) += 1,
                None => counts.other += 1,
            }
        }
        counts
    }

    fn slot_mut(&mut self, status: RefMatchStatus) -> &mut usize {
        match status {
            RefMatchStatus::Match => &mut self.matched,
            RefMatchStatus::Flipped => &mut self.flipped,
            RefMatchStatus::ReverseComplement => &mut self.reverse_complement,
            RefMatchStatus::ReverseComplementFlipped => &mut self.reverse_complement_flipped,
            RefMatchStatus::Ambiguous => &mut self.ambiguous,
            RefMatchStatus::NotOnReference => &mut self.not_on_reference,
            RefMatchStatus::Unchecked => &mut self.unchecked,
        }
    }

    #[must_use]
    pub fn get(&self, status: RefMatchStatus) -> usize {
        match status {
            RefMatchStatus::Match => self.matched,
            RefMatchStatus::Flipped => self.flipped,
            RefMatchStatus::ReverseComplement => self.reverse_complement,
            RefMatchStatus::ReverseComplementFlipped => self.reverse_complement_flipped,
            RefMatchStatus::Ambiguous => self.ambiguous,
            RefMatchStatus::NotOnReference => self.not_on_reference,
            RefMatchStatus::Unchecked => self.unchecked,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        RefMatchStatus::ALL.iter().map(|&s| self.get(s)).sum::<usize>() + self.other
    }
}

/// Diagnostics of one reference check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Rows in the table (before any removal)
    pub total: usize,

    /// Rows with position, EA and NEA present
    pub available: usize,

    /// Rows whose digit was written by this check
    pub checked: usize,

    /// Available rows whose chromosome is absent from the reference
    pub missing_chromosome: usize,

    /// Available rows whose reference chromosome holds a non-nucleotide symbol
    pub invalid_reference: usize,

    /// Reference-match digits over the whole table (before any removal)
    pub counts: StatusCounts,

    /// (matched + flipped) / available
    pub matching_rate: Option<f64>,

    /// flipped / available
    pub flip_rate: Option<f64>,

    pub path: ExecutionPath,

    /// Why the batched path was abandoned, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,

    /// Rows dropped because they are not on the reference
    pub removed: usize,
}

impl CheckSummary {
    #[must_use]
    pub fn new(counts: StatusCounts, total: usize, available: usize) -> Self {
        let rate = |n: usize| {
            (available > 0).then(|| count_to_f64(n) / count_to_f64(available))
        };

        Self {
            total,
            available,
            checked: 0,
            missing_chromosome: 0,
            invalid_reference: 0,
            counts,
            matching_rate: rate(counts.matched + counts.flipped),
            flip_rate: rate(counts.flipped),
            path: ExecutionPath::Skipped,
            fallback_reason: None,
            removed: 0,
        }
    }

    /// Summarise the reference-match digits already present in a table.
    ///
    /// # Errors
    ///
    /// Returns a `StatusError` if the status codes cannot be decoded.
    pub fn from_records(variants: &[VariantRecord]) -> Result<Self, StatusError> {
        let statuses: Vec<&str> = variants.iter().map(|v| v.status.as_str()).collect();
        let matrix = StatusMatrix::decode(&statuses)?;
        Ok(Self::from_matrix(&matrix, variants))
    }

    /// Summarise decoded status codes of `variants`
    #[must_use]
    pub fn from_matrix(matrix: &StatusMatrix, variants: &[VariantRecord]) -> Self {
        let counts =
            StatusCounts::from_digits(matrix.column(StatusField::ReferenceMatch).iter().copied());
        let available = variants.iter().filter(|v| v.is_available()).count();
        Self::new(counts, variants.len(), available)
    }

    /// Matching rate is below the configured threshold (likely wrong build)
    #[must_use]
    pub fn has_low_matching_rate(&self, config: &CheckConfig) -> bool {
        self.matching_rate
            .is_some_and(|rate| rate < config.low_matching_rate)
    }

    /// Flip rate is above the configured threshold (EA likely aligned with REF)
    #[must_use]
    pub fn has_high_flip_rate(&self, config: &CheckConfig) -> bool {
        self.flip_rate.is_some_and(|rate| rate > config.high_flip_rate)
    }

    /// Emit the summary as structured log events
    pub fn log(&self, config: &CheckConfig) {
        info!(
            total = self.total,
            available = self.available,
            checked = self.checked,
            path = ?self.path,
            "Reference check finished"
        );
        for status in RefMatchStatus::ALL {
            info!(
                digit = status.digit(),
                count = self.counts.get(status),
                "Variants {}",
                status.description()
            );
        }
        if self.missing_chromosome > 0 {
            info!(
                count = self.missing_chromosome,
                "Variants on chromosomes absent from the reference left unchecked"
            );
        }
        if self.invalid_reference > 0 {
            info!(
                count = self.invalid_reference,
                "Variants on chromosomes with an invalid reference sequence left unchecked"
            );
        }
        if let Some(rate) = self.matching_rate {
            info!("Raw matching rate: {:.2}%", rate * 100.0);
        }
        if self.has_low_matching_rate(config) {
            warn!("Matching rate is low, please check if the right reference genome is used");
        }
        if self.has_high_flip_rate(config) {
            info!(
                "Flipping variants rate > {:.2}, it is likely that the EA is aligned with REF in the original dataset",
                config.high_flip_rate
            );
        }
        if self.removed > 0 {
            info!(
                count = self.removed,
                "Variants not on given reference sequence were removed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_from_digits() {
        let counts = StatusCounts::from_digits([0, 0, 3, 4, 5, 6, 8, 9, 9, 1, 7]);
        assert_eq!(counts.matched, 2);
        assert_eq!(counts.flipped, 1);
        assert_eq!(counts.reverse_complement, 1);
        assert_eq!(counts.reverse_complement_flipped, 1);
        assert_eq!(counts.ambiguous, 1);
        assert_eq!(counts.not_on_reference, 1);
        assert_eq!(counts.unchecked, 2);
        assert_eq!(counts.other, 2);
        assert_eq!(counts.total(), 11);
    }

    #[test]
    fn test_rates() {
        let counts = StatusCounts::from_digits([0, 0, 0, 3, 8]);
        let summary = CheckSummary::new(counts, 5, 5);
        assert!((summary.matching_rate.unwrap() - 0.8).abs() < 1e-9);
        assert!((summary.flip_rate.unwrap() - 0.2).abs() < 1e-9);

        let config = CheckConfig::default();
        assert!(!summary.has_low_matching_rate(&config));
        assert!(!summary.has_high_flip_rate(&config));
    }

    #[test]
    fn test_low_matching_and_high_flip() {
        let config = CheckConfig::default();

        let summary = CheckSummary::new(StatusCounts::from_digits([0, 8, 8, 8]), 4, 4);
        assert!(summary.has_low_matching_rate(&config));

        let summary = CheckSummary::new(StatusCounts::from_digits([3; 10]), 10, 10);
        assert!(summary.has_high_flip_rate(&config));
        assert!(!summary.has_low_matching_rate(&config));
    }

    #[test]
    fn test_no_available_rows_has_no_rates() {
        let summary = CheckSummary::new(StatusCounts::from_digits([9, 9]), 2, 0);
        assert_eq!(summary.matching_rate, None);
        assert_eq!(summary.flip_rate, None);
        assert!(!summary.has_low_matching_rate(&CheckConfig::default()));
    }

    #[test]
    fn test_from_records() {
        let mut missing = VariantRecord::new("1", 5, "A", "G").with_status("9999999");
        missing.nea = None;
        let variants = vec![
            VariantRecord::new("1", 2, "C", "G").with_status("1960309"),
            VariantRecord::new("1", 3, "C", "G").with_status("1960339"),
            missing,
        ];
        let summary = CheckSummary::from_records(&variants).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.available, 2);
        assert_eq!(summary.counts.matched, 1);
        assert_eq!(summary.counts.flipped, 1);
        assert_eq!(summary.counts.unchecked, 1);
        assert!((summary.matching_rate.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_records_rejects_mixed_widths() {
        let variants = vec![
            VariantRecord::new("1", 2, "C", "G"),
            VariantRecord::new("1", 3, "C", "G").with_status("99999999"),
        ];
        assert!(matches!(
            CheckSummary::from_records(&variants),
            Err(StatusError::InconsistentStatusLength { row: 1, .. })
        ));
    }

    #[test]
    fn test_summary_serializes() {
        let summary = CheckSummary::new(StatusCounts::from_digits([0]), 1, 1);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["counts"]["matched"], 1);
        assert_eq!(json["path"], "skipped");
        assert!(json.get("fallback_reason").is_none());
    }
}
