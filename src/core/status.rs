//! Per-variant status codes.
//!
//! A status code is a fixed-width string of decimal digits. Each digit is
//! owned by one processing stage; this crate only ever writes the
//! [`StatusField::ReferenceMatch`] digit and preserves every other one.
//!
//! ```text
//!  9 9 9 9 9 9 9
//!  └┬┘ │ │ │ │ └─ strand / palindrome
//!   │  │ │ │ └─── reference match        <- written here
//!   │  │ │ └───── allele standardisation
//!   │  │ └─────── chromosome / position
//!   │  └───────── identifier
//!   └──────────── genome build
//! ```

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conventional width of a status code
pub const STATUS_WIDTH: usize = 7;

/// Status string for a variant nothing has looked at yet
pub const UNCHECKED_STATUS: &str = "9999999";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Inconsistent status length on row {row}: expected {expected} digits, found {found}")]
    InconsistentStatusLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid status '{status}' on row {row}: only digits are allowed")]
    InvalidStatusDigit { row: usize, status: String },

    #[error("Status codes are {width} digits wide, too short to hold the {field:?} digit")]
    StatusTooShort { width: usize, field: StatusField },
}

/// Independently addressable digit fields of a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    /// Genome build (two digits, e.g. `19`, `38`, `99`)
    Build,
    Identifier,
    Coordinate,
    Allele,
    /// Agreement of the alleles with the reference sequence
    ReferenceMatch,
    Strand,
}

impl StatusField {
    /// Column of the (first) digit of the field
    #[must_use]
    pub const fn column(self) -> usize {
        match self {
            Self::Build => 0,
            Self::Identifier => 2,
            Self::Coordinate => 3,
            Self::Allele => 4,
            Self::ReferenceMatch => 5,
            Self::Strand => 6,
        }
    }

    /// Number of digits the field spans
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Build => 2,
            _ => 1,
        }
    }
}

/// Value of the reference-match digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefMatchStatus {
    /// NEA matches the reference
    Match,
    /// EA matches the reference, alleles are swapped
    Flipped,
    /// NEA matches the reverse complement of the reference
    ReverseComplement,
    /// EA matches the reverse complement, alleles are swapped
    ReverseComplementFlipped,
    /// Both alleles are on the reference, orientation undecidable
    Ambiguous,
    /// Neither allele found at the position on either strand
    NotOnReference,
    Unchecked,
}

impl RefMatchStatus {
    pub const ALL: [Self; 7] = [
        Self::Match,
        Self::Flipped,
        Self::ReverseComplement,
        Self::ReverseComplementFlipped,
        Self::Ambiguous,
        Self::NotOnReference,
        Self::Unchecked,
    ];

    #[must_use]
    pub const fn digit(self) -> u8 {
        match self {
            Self::Match => 0,
            Self::Flipped => 3,
            Self::ReverseComplement => 4,
            Self::ReverseComplementFlipped => 5,
            Self::Ambiguous => 6,
            Self::NotOnReference => 8,
            Self::Unchecked => 9,
        }
    }

    /// Digits written by other tools (1, 2, 7) have no variant here
    #[must_use]
    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Self::Match),
            3 => Some(Self::Flipped),
            4 => Some(Self::ReverseComplement),
            5 => Some(Self::ReverseComplementFlipped),
            6 => Some(Self::Ambiguous),
            8 => Some(Self::NotOnReference),
            9 => Some(Self::Unchecked),
            _ => None,
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Match => "allele on given reference sequence",
            Self::Flipped => "flipped",
            Self::ReverseComplement => "inferred reverse complement",
            Self::ReverseComplementFlipped => "inferred reverse complement, flipped",
            Self::Ambiguous => "both alleles on genome, unable to distinguish",
            Self::NotOnReference => "not on given reference sequence",
            Self::Unchecked => "unchecked",
        }
    }
}

impl std::fmt::Display for RefMatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digit())
    }
}

/// A batch of status codes decoded into a `rows x width` digit matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMatrix {
    digits: Array2<u8>,
}

impl StatusMatrix {
    /// Decode status strings; all must share one width.
    ///
    /// An empty batch decodes to a `0 x STATUS_WIDTH` matrix.
    ///
    /// # Errors
    ///
    /// Returns `StatusError::InconsistentStatusLength` if widths differ,
    /// `StatusError::InvalidStatusDigit` on a non-digit character, or
    /// `StatusError::StatusTooShort` if the reference-match digit does not fit.
    pub fn decode<S: AsRef<str>>(statuses: &[S]) -> Result<Self, StatusError> {
        let width = statuses
            .first()
            .map_or(STATUS_WIDTH, |s| s.as_ref().len());

        let field = StatusField::ReferenceMatch;
        if width < field.column() + field.width() {
            return Err(StatusError::StatusTooShort { width, field });
        }

        let mut rows = Vec::with_capacity(statuses.len());
        for (row, status) in statuses.iter().enumerate() {
            let status = status.as_ref();
            if status.len() != width {
                return Err(StatusError::InconsistentStatusLength {
                    row,
                    expected: width,
                    found: status.len(),
                });
            }
            if !status.bytes().all(|b| b.is_ascii_digit()) {
                return Err(StatusError::InvalidStatusDigit {
                    row,
                    status: status.to_string(),
                });
            }
            rows.push(status.as_bytes());
        }

        let digits = Array2::from_shape_fn((rows.len(), width), |(r, c)| rows[r][c] - b'0');
        Ok(Self { digits })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.digits.nrows()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.digits.ncols()
    }

    /// Digit column of a single-digit field
    #[must_use]
    pub fn column(&self, field: StatusField) -> ArrayView1<'_, u8> {
        self.digits.column(field.column())
    }

    /// Overwrite a whole single-digit column
    ///
    /// # Panics
    ///
    /// Panics if `values` does not have one entry per row.
    pub fn set_column(&mut self, field: StatusField, values: &Array1<u8>) {
        self.digits.column_mut(field.column()).assign(values);
    }

    /// Re-serialise every row into a digit string
    #[must_use]
    pub fn encode(&self) -> Vec<String> {
        self.digits
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|&d| char::from(b'0' + d)).collect::<String>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_encode_preserves_digits() {
        let statuses = ["1980099", "3899999", "9999999"];
        let matrix = StatusMatrix::decode(&statuses).unwrap();
        assert_eq!(matrix.rows(), 3);
        assert_eq!(matrix.width(), 7);
        assert_eq!(matrix.column(StatusField::Coordinate)[0], 0);
        assert_eq!(matrix.column(StatusField::Identifier)[1], 9);
        assert_eq!(matrix.encode(), statuses);
    }

    #[test]
    fn test_set_column_only_touches_one_digit() {
        let mut matrix = StatusMatrix::decode(&["1234567", "7654321"]).unwrap();
        let digits = Array1::from(vec![0, RefMatchStatus::Flipped.digit()]);
        matrix.set_column(StatusField::ReferenceMatch, &digits);
        assert_eq!(matrix.encode(), vec!["1234507", "7654331"]);
        assert_eq!(matrix.column(StatusField::Strand)[1], 1);
    }

    #[test]
    fn test_set_column() {
        let mut matrix = StatusMatrix::decode(&["9999999", "9999999"]).unwrap();
        matrix.set_column(StatusField::ReferenceMatch, &Array1::from(vec![4, 8]));
        assert_eq!(matrix.encode(), vec!["9999949", "9999989"]);
        assert_eq!(matrix.column(StatusField::ReferenceMatch).to_vec(), vec![4, 8]);
    }

    #[test]
    fn test_inconsistent_length() {
        let err = StatusMatrix::decode(&["9999999", "999999"]).unwrap_err();
        assert_eq!(
            err,
            StatusError::InconsistentStatusLength {
                row: 1,
                expected: 7,
                found: 6
            }
        );
    }

    #[test]
    fn test_invalid_digit() {
        let err = StatusMatrix::decode(&["99999x9"]).unwrap_err();
        assert!(matches!(err, StatusError::InvalidStatusDigit { row: 0, .. }));
    }

    #[test]
    fn test_too_short() {
        let err = StatusMatrix::decode(&["999", "999"]).unwrap_err();
        assert!(matches!(err, StatusError::StatusTooShort { width: 3, .. }));
    }

    #[test]
    fn test_empty_batch() {
        let matrix = StatusMatrix::decode::<&str>(&[]).unwrap();
        assert_eq!(matrix.rows(), 0);
        assert!(matrix.encode().is_empty());
    }

    #[test]
    fn test_ref_match_digits_roundtrip() {
        for status in RefMatchStatus::ALL {
            assert_eq!(RefMatchStatus::from_digit(status.digit()), Some(status));
        }
        assert_eq!(RefMatchStatus::from_digit(1), None);
        assert_eq!(RefMatchStatus::from_digit(7), None);
    }

    #[test]
    fn test_field_layout() {
        assert_eq!(StatusField::ReferenceMatch.column(), 5);
        assert_eq!(StatusField::Build.width(), 2);
        assert_eq!(
            StatusField::Strand.column() + StatusField::Strand.width(),
            STATUS_WIDTH
        );
    }
}
