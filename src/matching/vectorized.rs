//! Batched reference-match classification.
//!
//! A batch shares one window length `L`, the longest allele in the batch.
//! Alleles are encoded into `n x L` code matrices, reference windows are
//! gathered into another `n x L` matrix, and the four match predicates are
//! computed row-wise with sentinel cells ignored:
//!
//! ```text
//! reference  A C T G A A G          pos = 2, L = 2
//! window       C T
//! NEA          C _      -> nea_fwd (only the real base is compared)
//! EA           G _
//! rc(NEA)      G _
//! rc(EA)       C _
//! ```
//!
//! Reverse complements are built by complementing, left-padding to `L`, and
//! reversing the row, which leaves the real bases aligned to the start of the
//! window exactly like the forward alleles.

use ndarray::{aview1, s, Array1, Array2, Zip};
use thiserror::Error;

use crate::core::alphabet::{self, AlphabetError, BaseCode, SENTINEL};
use crate::core::reference::ReferenceIndex;
use crate::core::status::RefMatchStatus;
use crate::matching::decision::{CheckRow, MatchPredicates};
use crate::matching::window::{extract_windows, WindowRequest};

/// Failure of the batched path. Always recovered by the sequential fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VectorizedError {
    #[error("Reference index has {available} padding codes, {needed} needed")]
    InsufficientPadding { needed: usize, available: usize },

    #[error("Invalid allele in record {}: {source}", .row + 1)]
    InvalidAllele {
        row: usize,
        #[source]
        source: AlphabetError,
    },
}

/// Alleles of a batch encoded into padded code matrices
#[derive(Debug)]
struct EncodedAlleles {
    /// Forward codes, right-padded with the sentinel
    forward: Array2<BaseCode>,
    /// Reverse-complement codes, real bases first, right-padded
    reverse: Array2<BaseCode>,
    /// Number of real bases per row
    lengths: Array1<usize>,
}

impl EncodedAlleles {
    fn encode<'a>(
        rows: &[CheckRow<'a>],
        allele: impl Fn(&CheckRow<'a>) -> &'a str,
        length: usize,
    ) -> Result<Self, VectorizedError> {
        let n = rows.len();
        let mut forward = Array2::from_elem((n, length), SENTINEL);
        let mut left_padded = Array2::from_elem((n, length), SENTINEL);
        let mut lengths = Array1::zeros(n);

        for (i, row) in rows.iter().enumerate() {
            let bases = allele(row).as_bytes();
            let invalid = |source: AlphabetError| VectorizedError::InvalidAllele {
                row: row.row,
                source,
            };
            let codes = alphabet::encode(bases).map_err(invalid)?;
            let complement = alphabet::complement(bases).map_err(invalid)?;

            let len = codes.len();
            forward.slice_mut(s![i, ..len]).assign(&aview1(&codes));
            left_padded
                .slice_mut(s![i, length - len..])
                .assign(&aview1(&complement));
            lengths[i] = len;
        }

        let reverse = left_padded.slice(s![.., ..;-1]).to_owned();

        Ok(Self {
            forward,
            reverse,
            lengths,
        })
    }
}

/// Row-wise: every real (non-sentinel) allele code equals the window code
fn matches_window(alleles: &Array2<BaseCode>, windows: &Array2<BaseCode>) -> Array1<bool> {
    Zip::from(alleles.rows())
        .and(windows.rows())
        .map_collect(|allele, window| {
            allele
                .iter()
                .zip(window.iter())
                .all(|(&a, &w)| a == SENTINEL || a == w)
        })
}

/// Classify a batch of variants with bulk array operations.
///
/// The index is padded in place for the batch's window length. Results are
/// returned in the order of `rows`.
///
/// # Errors
///
/// Returns a `VectorizedError` if an allele is not over the nucleotide
/// alphabet. Callers are expected to fall back to
/// [`crate::matching::sequential::classify_rows`].
pub fn classify_batch(
    index: &mut ReferenceIndex,
    rows: &[CheckRow<'_>],
) -> Result<Vec<RefMatchStatus>, VectorizedError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let length = rows.iter().map(CheckRow::max_allele_len).max().unwrap_or(0);
    index.ensure_padding(length);

    let requests: Vec<WindowRequest> = rows
        .iter()
        .map(|r| WindowRequest {
            slot: r.slot,
            pos: r.pos,
        })
        .collect();
    let windows = extract_windows(index, &requests, length)?;

    let nea = EncodedAlleles::encode(rows, |r| r.nea, length)?;
    let ea = EncodedAlleles::encode(rows, |r| r.ea, length)?;

    let nea_fwd = matches_window(&nea.forward, &windows);
    let ea_fwd = matches_window(&ea.forward, &windows);
    let nea_rev = matches_window(&nea.reverse, &windows);
    let ea_rev = matches_window(&ea.reverse, &windows);
    let len_eq = Zip::from(&nea.lengths)
        .and(&ea.lengths)
        .map_collect(|a, b| a == b);

    let statuses = (0..rows.len())
        .map(|i| {
            MatchPredicates {
                nea_fwd: nea_fwd[i],
                ea_fwd: ea_fwd[i],
                nea_rev: nea_rev[i],
                ea_rev: ea_rev[i],
                len_eq: len_eq[i],
            }
            .classify()
        })
        .collect();

    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::ReferenceSequences;

    fn make_index() -> ReferenceIndex {
        let reference: ReferenceSequences = [("1", b"ACTGAAG".to_vec()), ("2", b"TTGCA".to_vec())]
            .into_iter()
            .collect();
        ReferenceIndex::build(&reference, ["1", "2"])
    }

    fn row<'a>(slot: usize, pos: u64, nea: &'a str, ea: &'a str) -> CheckRow<'a> {
        CheckRow {
            row: 0,
            slot,
            pos,
            nea,
            ea,
        }
    }

    #[test]
    fn test_reference_scenarios() {
        let mut index = make_index();
        let rows = [
            row(0, 2, "C", "G"),
            row(0, 2, "G", "C"),
            row(0, 6, "T", "C"),
            row(0, 6, "C", "T"),
            row(0, 2, "A", "T"),
        ];
        let statuses = classify_batch(&mut index, &rows).unwrap();
        assert_eq!(
            statuses,
            vec![
                RefMatchStatus::Match,
                RefMatchStatus::Flipped,
                RefMatchStatus::ReverseComplement,
                RefMatchStatus::ReverseComplementFlipped,
                RefMatchStatus::NotOnReference,
            ]
        );
    }

    #[test]
    fn test_indels_and_ambiguity() {
        let mut index = make_index();
        let rows = [
            // Both alleles are a prefix of the window
            row(0, 2, "CT", "C"),
            row(0, 2, "C", "CTG"),
            row(0, 5, "A", "AA"),
        ];
        let statuses = classify_batch(&mut index, &rows).unwrap();
        assert_eq!(
            statuses,
            vec![
                RefMatchStatus::Ambiguous,
                RefMatchStatus::Ambiguous,
                RefMatchStatus::Ambiguous,
            ]
        );

        let rows = [row(0, 2, "CTGA", "GG"), row(0, 2, "GG", "CTGA")];
        let statuses = classify_batch(&mut index, &rows).unwrap();
        assert_eq!(
            statuses,
            vec![RefMatchStatus::Match, RefMatchStatus::Flipped]
        );
    }

    #[test]
    fn test_reverse_complement_multibase() {
        let mut index = make_index();
        // Window "TTG" on chr2; reverse complement of "CAA" is "TTG"
        let rows = [row(1, 1, "CAA", "G"), row(1, 1, "G", "CAA")];
        let statuses = classify_batch(&mut index, &rows).unwrap();
        assert_eq!(
            statuses,
            vec![
                RefMatchStatus::ReverseComplement,
                RefMatchStatus::ReverseComplementFlipped
            ]
        );
    }

    #[test]
    fn test_reverse_strand_ambiguity_is_not_on_reference() {
        let mut index = make_index();
        // Window "AA" at chr1:5; rc("T") = "A", rc("TT") = "AA"
        let statuses = classify_batch(&mut index, &[row(0, 5, "T", "TT")]).unwrap();
        assert_eq!(statuses, vec![RefMatchStatus::NotOnReference]);
    }

    #[test]
    fn test_allele_past_chromosome_end_does_not_match() {
        let mut index = make_index();
        // chr1 ends in "G", chr2 starts with "TT": "GT" must not match
        let statuses = classify_batch(&mut index, &[row(0, 7, "GT", "A")]).unwrap();
        assert_eq!(statuses, vec![RefMatchStatus::NotOnReference]);
    }

    #[test]
    fn test_case_insensitive_alleles() {
        let mut index = make_index();
        let statuses = classify_batch(&mut index, &[row(0, 2, "c", "g")]).unwrap();
        assert_eq!(statuses, vec![RefMatchStatus::Match]);
    }

    #[test]
    fn test_empty_batch() {
        let mut index = make_index();
        assert!(classify_batch(&mut index, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_allele_fails() {
        let mut index = make_index();
        let mut bad = row(0, 2, "C", "<DEL>");
        bad.row = 17;
        let err = classify_batch(&mut index, &[bad]).unwrap_err();
        assert!(matches!(err, VectorizedError::InvalidAllele { row: 17, .. }));
        assert!(err.to_string().starts_with("Invalid allele in record 18: "));
    }

    #[test]
    fn test_position_out_of_range_is_not_on_reference() {
        let mut index = make_index();
        let rows = [row(1, 99, "A", "C"), row(0, 0, "A", "C"), row(0, 2, "C", "G")];
        let statuses = classify_batch(&mut index, &rows).unwrap();
        assert_eq!(
            statuses,
            vec![
                RefMatchStatus::NotOnReference,
                RefMatchStatus::NotOnReference,
                RefMatchStatus::Match,
            ]
        );
    }

    #[test]
    fn test_reverse_matrix_layout() {
        let rows = [row(0, 1, "AAC", "A"), row(0, 1, "G", "A")];
        let encoded = EncodedAlleles::encode(&rows, |r| r.nea, 4).unwrap();
        assert_eq!(
            encoded.reverse.row(0).to_vec(),
            vec![alphabet::CODE_G, alphabet::CODE_T, alphabet::CODE_T, SENTINEL]
        );
        assert_eq!(
            encoded.forward.row(1).to_vec(),
            vec![alphabet::CODE_G, SENTINEL, SENTINEL, SENTINEL]
        );
        assert_eq!(encoded.lengths.to_vec(), vec![3, 1]);
    }
}
