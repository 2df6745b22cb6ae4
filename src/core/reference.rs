use std::collections::{BTreeMap, BTreeSet};

use crate::core::alphabet::{self, AlphabetError, BaseCode, SENTINEL};

/// Normalise a chromosome identifier so FASTA record names and table values agree.
///
/// Strips a leading `chr` (any case) and upper-cases the rest, e.g.
/// `chrX` -> `X`, `Chr1` -> `1`, `mt` -> `MT`.
#[must_use]
pub fn normalize_chrom(name: &str) -> String {
    let name = name.trim();
    let stripped = match name.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") && name.len() > 3 => &name[3..],
        _ => name,
    };
    stripped.to_ascii_uppercase()
}

/// Raw reference sequences keyed by chromosome id.
///
/// Only the chromosomes needed by the current batch are expected to be loaded.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSequences {
    sequences: BTreeMap<String, Vec<u8>>,
}

impl ReferenceSequences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the sequence of a chromosome
    pub fn insert(&mut self, chrom: impl Into<String>, sequence: impl Into<Vec<u8>>) {
        self.sequences.insert(chrom.into(), sequence.into());
    }

    #[must_use]
    pub fn get(&self, chrom: &str) -> Option<&[u8]> {
        self.sequences.get(chrom).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, chrom: &str) -> bool {
        self.sequences.contains_key(chrom)
    }

    /// Chromosome ids in sorted order
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl<K: Into<String>, V: Into<Vec<u8>>> FromIterator<(K, V)> for ReferenceSequences {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut reference = Self::new();
        for (chrom, sequence) in iter {
            reference.insert(chrom, sequence);
        }
        reference
    }
}

/// Error raised while encoding a reference chromosome
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Reference chromosome '{chrom}': {source}")]
pub struct ReferenceEncodingError {
    pub chrom: String,
    #[source]
    pub source: AlphabetError,
}

/// Encoded reference: every loaded chromosome concatenated into one code array.
///
/// `offsets[i]` is the start of chromosome `i` (sorted id order) and
/// `offsets[i + 1] - offsets[i]` is its length. The array carries a tail of
/// sentinel codes so fixed-length windows can be read without bounds checks
/// near the end of the last chromosome.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    chroms: Vec<String>,
    offsets: Vec<usize>,
    codes: Vec<BaseCode>,
    invalid: Vec<ReferenceEncodingError>,
}

impl ReferenceIndex {
    /// Encode the `wanted` chromosomes that are present in `reference`.
    ///
    /// Wanted chromosomes that the reference lacks are simply not indexed.
    /// A chromosome holding a symbol outside the nucleotide alphabet is left
    /// out as well and its encoding error is kept in [`Self::invalid`].
    pub fn build<'a>(
        reference: &ReferenceSequences,
        wanted: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let wanted: BTreeSet<&str> = wanted
            .into_iter()
            .filter(|chrom| reference.contains(chrom))
            .collect();

        let total: usize = wanted
            .iter()
            .filter_map(|chrom| reference.get(chrom))
            .map(<[u8]>::len)
            .sum();

        let mut chroms = Vec::with_capacity(wanted.len());
        let mut offsets = Vec::with_capacity(wanted.len() + 1);
        let mut codes = Vec::with_capacity(total);
        let mut invalid = Vec::new();
        offsets.push(0);

        // BTreeSet iteration keeps the concatenation in sorted id order
        for chrom in wanted {
            let Some(sequence) = reference.get(chrom) else {
                continue;
            };
            let start = codes.len();
            if let Err(source) = alphabet::encode_into(sequence, &mut codes) {
                codes.truncate(start);
                invalid.push(ReferenceEncodingError {
                    chrom: chrom.to_string(),
                    source,
                });
                continue;
            }
            chroms.push(chrom.to_string());
            offsets.push(codes.len());
        }

        Self {
            chroms,
            offsets,
            codes,
            invalid,
        }
    }

    /// Wanted chromosomes left out because their sequence could not be encoded
    #[must_use]
    pub fn invalid(&self) -> &[ReferenceEncodingError] {
        &self.invalid
    }

    /// Chromosome was requested but could not be encoded
    #[must_use]
    pub fn is_invalid(&self, chrom: &str) -> bool {
        self.invalid.iter().any(|e| e.chrom == chrom)
    }

    /// Slot of a chromosome in the index, if loaded
    #[must_use]
    pub fn slot(&self, chrom: &str) -> Option<usize> {
        self.chroms
            .binary_search_by(|id| id.as_str().cmp(chrom))
            .ok()
    }

    /// Chromosome ids in index order
    #[must_use]
    pub fn chromosomes(&self) -> &[String] {
        &self.chroms
    }

    /// Start of chromosome `slot` in the concatenated array
    #[must_use]
    pub fn offset(&self, slot: usize) -> usize {
        self.offsets[slot]
    }

    /// Encoded length of chromosome `slot`
    #[must_use]
    pub fn chrom_len(&self, slot: usize) -> usize {
        self.offsets[slot + 1] - self.offsets[slot]
    }

    /// Total number of real (non-padding) codes
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encoded sequence of chromosome `slot`
    #[must_use]
    pub fn sequence(&self, slot: usize) -> &[BaseCode] {
        &self.codes[self.offsets[slot]..self.offsets[slot + 1]]
    }

    /// Absolute index of a 0-based position on chromosome `slot`
    #[must_use]
    pub fn absolute_index(&self, slot: usize, position: usize) -> usize {
        self.offsets[slot] + position
    }

    /// Make sure at least `padding` sentinel codes follow the last chromosome
    pub fn ensure_padding(&mut self, padding: usize) {
        let wanted = self.len() + padding;
        if self.codes.len() < wanted {
            self.codes.resize(wanted, SENTINEL);
        }
    }

    /// Concatenated codes including the sentinel tail
    #[must_use]
    pub fn codes(&self) -> &[BaseCode] {
        &self.codes
    }
}
