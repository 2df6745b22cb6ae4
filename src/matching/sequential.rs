//! Row-by-row reference-match classification.
//!
//! Slower than [`crate::matching::vectorized`] but has no batch-wide
//! preconditions. Positions outside a chromosome see an empty window.
//! Both paths feed the same [`MatchPredicates::classify`] decision table.

use crate::core::alphabet::{self, AlphabetError, BaseCode};
use crate::core::reference::ReferenceIndex;
use crate::core::status::RefMatchStatus;
use crate::matching::decision::{CheckRow, MatchPredicates};

/// Error raised while classifying a single row
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid allele in record {}: {source}", .row + 1)]
pub struct RowError {
    pub row: usize,
    #[source]
    pub source: AlphabetError,
}

/// Reference codes from the variant's position to the end of its chromosome
fn window<'a>(index: &'a ReferenceIndex, row: &CheckRow<'_>) -> &'a [BaseCode] {
    let sequence = index.sequence(row.slot);
    match usize::try_from(row.pos) {
        Ok(pos) if pos >= 1 && pos <= sequence.len() => &sequence[pos - 1..],
        _ => &[],
    }
}

/// Compute the match predicates of one row.
///
/// # Errors
///
/// Returns `RowError` if an allele contains a symbol outside the nucleotide alphabet.
pub fn predicates(index: &ReferenceIndex, row: &CheckRow<'_>) -> Result<MatchPredicates, RowError> {
    let err = |source: AlphabetError| RowError {
        row: row.row,
        source,
    };
    let nea = alphabet::encode(row.nea.as_bytes()).map_err(err)?;
    let ea = alphabet::encode(row.ea.as_bytes()).map_err(err)?;
    let nea_rc = alphabet::reverse_complement(row.nea.as_bytes()).map_err(err)?;
    let ea_rc = alphabet::reverse_complement(row.ea.as_bytes()).map_err(err)?;

    let window = window(index, row);

    Ok(MatchPredicates {
        nea_fwd: window.starts_with(&nea),
        ea_fwd: window.starts_with(&ea),
        nea_rev: window.starts_with(&nea_rc),
        ea_rev: window.starts_with(&ea_rc),
        len_eq: nea.len() == ea.len(),
    })
}

/// Classify rows one at a time.
///
/// # Errors
///
/// Returns the first `RowError` encountered; no partial result is returned.
pub fn classify_rows(
    index: &ReferenceIndex,
    rows: &[CheckRow<'_>],
) -> Result<Vec<RefMatchStatus>, RowError> {
    rows.iter()
        .map(|row| predicates(index, row).map(MatchPredicates::classify))
        .collect()
}
