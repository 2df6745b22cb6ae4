use ndarray::{s, Array2};

use crate::core::alphabet::{BaseCode, SENTINEL};
use crate::core::reference::ReferenceIndex;
use crate::matching::vectorized::VectorizedError;

/// Location of the window to extract for one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest {
    /// Chromosome slot in the [`ReferenceIndex`]
    pub slot: usize,
    /// 1-based position
    pub pos: u64,
}

/// Gather one `length`-wide window of reference codes per request.
///
/// Windows start at `offset[slot] + pos - 1`. The index must carry at least
/// `length` padding codes so windows at the end of the last chromosome can be
/// gathered without bounds checks. Cells past the end of the variant's own
/// chromosome are replaced by the sentinel so a window never picks up bases
/// from the next chromosome. A position of 0 or past the chromosome end gets
/// an all-sentinel window.
///
/// # Errors
///
/// Returns `VectorizedError::InsufficientPadding` if the index is not padded
/// for `length`.
pub fn extract_windows(
    index: &ReferenceIndex,
    requests: &[WindowRequest],
    length: usize,
) -> Result<Array2<BaseCode>, VectorizedError> {
    let codes = index.codes();
    let padding = codes.len() - index.len();
    if padding < length {
        return Err(VectorizedError::InsufficientPadding {
            needed: length,
            available: padding,
        });
    }

    // (absolute start, absolute end of the chromosome) per row; empty when out of range
    let bounds: Vec<(usize, usize)> = requests
        .iter()
        .map(|request| {
            let chrom_len = index.chrom_len(request.slot);
            match usize::try_from(request.pos) {
                Ok(pos) if pos >= 1 && pos <= chrom_len => (
                    index.absolute_index(request.slot, pos - 1),
                    index.offset(request.slot) + chrom_len,
                ),
                _ => (0, 0),
            }
        })
        .collect();

    let mut windows = Array2::from_shape_fn((requests.len(), length), |(row, k)| {
        codes[bounds[row].0 + k]
    });

    for (mut window, &(start, end)) in windows.rows_mut().into_iter().zip(&bounds) {
        let valid = (end - start).min(length);
        window.slice_mut(s![valid..]).fill(SENTINEL);
    }

    Ok(windows)
}
