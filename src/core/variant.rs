use serde::{Deserialize, Serialize};

use crate::core::status::UNCHECKED_STATUS;

/// A single variant row of a summary-statistics table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Chromosome id, normalised the same way as reference record names
    pub chrom: String,

    /// 1-based position
    pub pos: Option<u64>,

    /// Effect allele
    pub ea: Option<String>,

    /// Non-effect allele
    pub nea: Option<String>,

    /// Fixed-width digit status code
    pub status: String,

    /// All fields of the source row, used to re-emit the table unchanged
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_fields: Vec<String>,
}

impl VariantRecord {
    /// New record with an all-unchecked status
    pub fn new(
        chrom: impl Into<String>,
        pos: u64,
        nea: impl Into<String>,
        ea: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos: Some(pos),
            ea: Some(ea.into()),
            nea: Some(nea.into()),
            status: UNCHECKED_STATUS.to_string(),
            source_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Position and both alleles are present
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.pos.is_some() && self.ea.is_some() && self.nea.is_some()
    }
}
