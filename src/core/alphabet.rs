//! Compact integer encoding of nucleotide letters.
//!
//! Every base of the five-letter alphabet `{A, T, C, G, N}` maps to a small,
//! non-zero code. Code `0` is reserved as the padding sentinel, so a padded
//! allele or window can never be confused with a real base.
//!
//! | Base | Code | Complement |
//! |------|------|------------|
//! | A    | 2    | T (3)      |
//! | T    | 3    | A (2)      |
//! | C    | 4    | G (5)      |
//! | G    | 5    | C (4)      |
//! | N    | 6    | N (6)      |
//!
//! Lower-case letters encode to the same codes as upper-case ones.

use thiserror::Error;

/// Integer code of a single encoded base
pub type BaseCode = u8;

/// Padding / no-data value. Never equal to a real base code.
pub const SENTINEL: BaseCode = 0;

pub const CODE_A: BaseCode = 2;
pub const CODE_T: BaseCode = 3;
pub const CODE_C: BaseCode = 4;
pub const CODE_G: BaseCode = 5;
pub const CODE_N: BaseCode = 6;

/// Marks bytes outside the alphabet in the lookup tables
const INVALID: u8 = u8::MAX;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlphabetError {
    #[error("Invalid nucleotide '{symbol}' at position {position}")]
    InvalidAlphabet { symbol: char, position: usize },
}

const fn build_table(complement: bool) -> [u8; 256] {
    let mut table = [INVALID; 256];
    let letters: [(u8, BaseCode, BaseCode); 5] = [
        (b'A', CODE_A, CODE_T),
        (b'T', CODE_T, CODE_A),
        (b'C', CODE_C, CODE_G),
        (b'G', CODE_G, CODE_C),
        (b'N', CODE_N, CODE_N),
    ];
    let mut i = 0;
    while i < letters.len() {
        let (letter, code, compl) = letters[i];
        let value = if complement { compl } else { code };
        table[letter as usize] = value;
        table[letter.to_ascii_lowercase() as usize] = value;
        i += 1;
    }
    table
}

/// Letter -> code of the letter
static ENCODE_TABLE: [u8; 256] = build_table(false);

/// Letter -> code of the complementary letter
static COMPLEMENT_TABLE: [u8; 256] = build_table(true);

fn lookup(table: &[u8; 256], symbol: u8, position: usize) -> Result<BaseCode, AlphabetError> {
    match table[usize::from(symbol)] {
        INVALID => Err(AlphabetError::InvalidAlphabet {
            symbol: char::from(symbol),
            position,
        }),
        code => Ok(code),
    }
}

/// Encode a nucleotide sequence into base codes.
///
/// # Errors
///
/// Returns `AlphabetError::InvalidAlphabet` for the first byte outside
/// `{A, T, C, G, N}` (case-insensitive).
pub fn encode(sequence: &[u8]) -> Result<Vec<BaseCode>, AlphabetError> {
    let mut codes = Vec::with_capacity(sequence.len());
    encode_into(sequence, &mut codes)?;
    Ok(codes)
}

/// Encode a sequence, appending the codes to `out`.
///
/// On error `out` may contain a prefix of the encoded sequence.
///
/// # Errors
///
/// Returns `AlphabetError::InvalidAlphabet` on the first byte outside the alphabet.
pub fn encode_into(sequence: &[u8], out: &mut Vec<BaseCode>) -> Result<(), AlphabetError> {
    out.reserve(sequence.len());
    for (position, &symbol) in sequence.iter().enumerate() {
        out.push(lookup(&ENCODE_TABLE, symbol, position)?);
    }
    Ok(())
}

/// Encode the complement of each base, keeping the original order.
///
/// # Errors
///
/// Returns `AlphabetError::InvalidAlphabet` on the first byte outside the alphabet.
pub fn complement(sequence: &[u8]) -> Result<Vec<BaseCode>, AlphabetError> {
    sequence
        .iter()
        .enumerate()
        .map(|(position, &symbol)| lookup(&COMPLEMENT_TABLE, symbol, position))
        .collect()
}

/// Encode the reverse complement of a sequence.
///
/// # Errors
///
/// Returns `AlphabetError::InvalidAlphabet` on the first byte outside the alphabet.
pub fn reverse_complement(sequence: &[u8]) -> Result<Vec<BaseCode>, AlphabetError> {
    let mut codes = complement(sequence)?;
    codes.reverse();
    Ok(codes)
}

/// Map a base code back to its upper-case letter.
#[must_use]
pub fn decode(code: BaseCode) -> Option<u8> {
    match code {
        CODE_A => Some(b'A'),
        CODE_T => Some(b'T'),
        CODE_C => Some(b'C'),
        CODE_G => Some(b'G'),
        CODE_N => Some(b'N'),
        _ => None,
    }
}
