//! Delimited summary-statistics table reader and writer.
//!
//! The first non-empty line is the header. Required columns are located by
//! name through [`ColumnNames`]; every other column is carried through
//! untouched so a checked table differs from its input only in STATUS.
//!
//! | Token | Meaning |
//! |-------|---------|
//! | empty, `NA`, `nan`, `.` | Missing value |
//!
//! A table without a STATUS column gets one appended, initialised to
//! [`UNCHECKED_STATUS`].

use std::collections::BTreeSet;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::reference::normalize_chrom;
use crate::core::status::UNCHECKED_STATUS;
use crate::core::variant::VariantRecord;
use crate::parsing::fasta::is_gzipped;
use crate::parsing::ParseError;

/// Cell values read as missing
pub const MISSING_TOKENS: [&str; 4] = ["", "NA", "nan", "."];

/// Header names of the columns the checker reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub chrom: String,
    pub pos: String,
    pub ea: String,
    pub nea: String,
    pub status: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            chrom: "CHR".to_string(),
            pos: "POS".to_string(),
            ea: "EA".to_string(),
            nea: "NEA".to_string(),
            status: "STATUS".to_string(),
        }
    }
}

/// Positions of the required columns within a header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndices {
    chrom: usize,
    pos: usize,
    ea: usize,
    nea: usize,
    status: usize,
}

impl ColumnIndices {
    /// Locate the columns, appending STATUS to `header` if absent
    fn resolve(header: &mut Vec<String>, names: &ColumnNames) -> Result<Self, ParseError> {
        let find = |name: &str| header.iter().position(|h| h == name);
        let required = |name: &str| find(name).ok_or_else(|| ParseError::MissingColumn(name.to_string()));

        let chrom = required(&names.chrom)?;
        let pos = required(&names.pos)?;
        let ea = required(&names.ea)?;
        let nea = required(&names.nea)?;
        let status = match find(&names.status) {
            Some(index) => index,
            None => {
                debug!(column = %names.status, "Status column not found, creating it");
                header.push(names.status.clone());
                header.len() - 1
            }
        };

        Ok(Self {
            chrom,
            pos,
            ea,
            nea,
            status,
        })
    }
}

/// A parsed table: header, delimiter and one record per data row
#[derive(Debug, Clone)]
pub struct VariantTable {
    pub header: Vec<String>,
    pub delimiter: char,
    pub records: Vec<VariantRecord>,
    columns: ColumnIndices,
}

impl VariantTable {
    /// Normalised chromosomes of rows that can be checked
    #[must_use]
    pub fn chromosomes(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .filter(|r| r.is_available())
            .map(|r| r.chrom.clone())
            .collect()
    }

    /// Output fields of one record, with its current status
    fn row_fields(&self, record: &VariantRecord) -> Vec<String> {
        let mut fields = record.source_fields.clone();
        if fields.is_empty() {
            fields.resize(self.header.len(), String::new());
            fields[self.columns.chrom].clone_from(&record.chrom);
            fields[self.columns.pos] = record.pos.map(|p| p.to_string()).unwrap_or_default();
            fields[self.columns.ea] = record.ea.clone().unwrap_or_default();
            fields[self.columns.nea] = record.nea.clone().unwrap_or_default();
        }
        fields.resize(self.header.len(), String::new());
        fields[self.columns.status].clone_from(&record.status);
        fields
    }
}

fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

fn optional(value: &str) -> Option<String> {
    (!is_missing(value)).then(|| value.to_string())
}

/// Read a plain or gzip-compressed table
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn read_table(
    path: &Path,
    delimiter: char,
    columns: &ColumnNames,
) -> Result<VariantTable, ParseError> {
    let file = std::fs::File::open(path)?;
    let mut content = String::new();
    if is_gzipped(path) {
        MultiGzDecoder::new(file).read_to_string(&mut content)?;
    } else {
        std::io::BufReader::new(file).read_to_string(&mut content)?;
    }
    parse_table_text(&content, delimiter, columns)
}

/// Parse table text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the header is missing, a row has
/// the wrong number of fields or a position is not a non-negative integer,
/// or `ParseError::MissingColumn` if a required column is absent.
pub fn parse_table_text(
    text: &str,
    delimiter: char,
    columns: &ColumnNames,
) -> Result<VariantTable, ParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Err(ParseError::InvalidFormat("Table has no header line".to_string()));
    };
    let mut header: Vec<String> = header_line
        .split(delimiter)
        .map(|h| h.trim().to_string())
        .collect();
    let source_width = header.len();
    let indices = ColumnIndices::resolve(&mut header, columns)?;

    let mut records = Vec::new();
    for (i, line) in lines {
        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;
        let mut fields: Vec<String> = line
            .split(delimiter)
            .map(str::to_string)
            .collect();

        if fields.len() != source_width {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has {} fields, header has {source_width}",
                fields.len()
            )));
        }

        let pos_field = fields[indices.pos].trim();
        let pos = if is_missing(pos_field) {
            None
        } else {
            Some(pos_field.parse::<u64>().map_err(|_| {
                ParseError::InvalidFormat(format!(
                    "Invalid position on line {line_num}: '{pos_field}'"
                ))
            })?)
        };

        if fields.len() < header.len() {
            fields.push(UNCHECKED_STATUS.to_string());
        }
        let status = match fields[indices.status].trim() {
            s if is_missing(s) => UNCHECKED_STATUS.to_string(),
            s => s.to_string(),
        };

        records.push(VariantRecord {
            chrom: normalize_chrom(fields[indices.chrom].trim()),
            pos,
            ea: optional(fields[indices.ea].trim()),
            nea: optional(fields[indices.nea].trim()),
            status,
            source_fields: fields,
        });
    }

    debug!(rows = records.len(), columns = header.len(), "Parsed variant table");

    Ok(VariantTable {
        header,
        delimiter,
        records,
        columns: indices,
    })
}

/// Write a table, gzip-compressed if `path` ends in `.gz`/`.bgz`
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be written.
pub fn write_table(path: &Path, table: &VariantTable) -> Result<(), ParseError> {
    let file = std::fs::File::create(path)?;
    if is_gzipped(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_table_to(&mut encoder, table)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_table_to(&mut writer, table)?;
        writer.flush()?;
    }
    Ok(())
}

/// Write a table to any writer
///
/// # Errors
///
/// Returns `ParseError::Io` on write failure.
pub fn write_table_to<W: Write>(writer: &mut W, table: &VariantTable) -> Result<(), ParseError> {
    let delimiter = table.delimiter.to_string();
    writeln!(writer, "{}", table.header.join(&delimiter))?;
    for record in &table.records {
        writeln!(writer, "{}", table.row_fields(record).join(&delimiter))?;
    }
    Ok(())
}
