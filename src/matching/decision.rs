use crate::core::status::RefMatchStatus;

/// A variant selected for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckRow<'a> {
    /// Row in the source table
    pub row: usize,
    /// Chromosome slot in the reference index
    pub slot: usize,
    /// 1-based position
    pub pos: u64,
    pub nea: &'a str,
    pub ea: &'a str,
}

impl CheckRow<'_> {
    /// Longest of the two alleles
    #[must_use]
    pub fn max_allele_len(&self) -> usize {
        self.nea.len().max(self.ea.len())
    }
}

/// Outcome of comparing one variant's alleles with its reference window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchPredicates {
    /// Forward NEA equals the reference over its real bases
    pub nea_fwd: bool,
    /// Forward EA equals the reference over its real bases
    pub ea_fwd: bool,
    /// Reverse-complemented NEA equals the reference
    pub nea_rev: bool,
    /// Reverse-complemented EA equals the reference
    pub ea_rev: bool,
    /// NEA and EA have the same number of bases
    pub len_eq: bool,
}

impl MatchPredicates {
    /// Decision table shared by the batched and the sequential classifier.
    ///
    /// Rules are evaluated in order and the first one that holds wins.
    #[must_use]
    pub const fn classify(self) -> RefMatchStatus {
        let Self {
            nea_fwd,
            ea_fwd,
            nea_rev,
            ea_rev,
            len_eq,
        } = self;

        if nea_fwd && ea_fwd && !len_eq {
            RefMatchStatus::Ambiguous
        } else if nea_fwd && !ea_fwd {
            RefMatchStatus::Match
        } else if !nea_fwd && ea_fwd {
            RefMatchStatus::Flipped
        } else if !nea_fwd && !ea_fwd && nea_rev && ea_rev && !len_eq {
            // Ambiguous on the reverse strand is reported as not on reference
            RefMatchStatus::NotOnReference
        } else if nea_rev && !ea_rev {
            RefMatchStatus::ReverseComplement
        } else if !nea_rev && ea_rev {
            RefMatchStatus::ReverseComplementFlipped
        } else {
            RefMatchStatus::NotOnReference
        }
    }
}
