//! Reference FASTA loader using noodles.
//!
//! Only the chromosomes a table refers to are kept in memory; every other
//! record is read and dropped. Record names are normalised with
//! [`normalize_chrom`] so `>chr1` and `>1` both serve CHR `1`.
//!
//! Supports both uncompressed and gzip/bgzip compressed files.

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use tracing::{debug, info, warn};

use crate::core::reference::{normalize_chrom, ReferenceSequences};
use crate::parsing::ParseError;

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub(crate) fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Load the `wanted` chromosomes of a FASTA file.
///
/// `wanted` holds normalised chromosome ids. Requested chromosomes that the
/// file lacks are simply absent from the result.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or `ParseError::Noodles`
/// if a record is malformed.
pub fn load_reference(
    path: &Path,
    wanted: &BTreeSet<String>,
) -> Result<ReferenceSequences, ParseError> {
    let file = std::fs::File::open(path)?;
    let reference = if is_gzipped(path) {
        let mut reader = fasta::io::Reader::new(BufReader::new(MultiGzDecoder::new(file)));
        read_reference(&mut reader, wanted)?
    } else {
        let mut reader = fasta::io::Reader::new(BufReader::new(file));
        read_reference(&mut reader, wanted)?
    };

    info!(
        path = %path.display(),
        loaded = reference.len(),
        requested = wanted.len(),
        "Loaded reference sequences"
    );
    Ok(reference)
}

/// Read wanted records from a noodles FASTA reader
fn read_reference<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
    wanted: &BTreeSet<String>,
) -> Result<ReferenceSequences, ParseError> {
    let mut reference = ReferenceSequences::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        let chrom = normalize_chrom(&String::from_utf8_lossy(record.name()));
        if !wanted.contains(&chrom) {
            continue;
        }
        if reference.contains(&chrom) {
            warn!(chrom = %chrom, "Duplicate reference record, keeping the first one");
            continue;
        }

        debug!(chrom = %chrom, length = record.sequence().len(), "Reference record");
        reference.insert(chrom, record.sequence().as_ref().to_vec());
    }

    Ok(reference)
}
