//! Pure conversions of nucleotide and quality strings into model inputs.

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Symbol used to right-pad the last k-mer of a sequence.
pub const KMER_PAD: char = 'X';

/// Offset of the ASCII-encoded Phred quality scores in FASTQ files.
pub const PHRED_OFFSET: u32 = 33;

/// Error returned by the tokenizer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CodecError {
    /// k-mer size must be at least 1.
    InvalidKmerSize(usize),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::InvalidKmerSize(k) => {
                write!(f, "Invalid k-mer size: {} (must be at least 1)", k)
            }
        }
    }
}

impl Error for CodecError {}

/// Nucleotide category used by the model alphabet.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Nucleotide {
    /// Adenine.
    A = 0,
    /// Cytosine.
    C = 1,
    /// Guanine.
    G = 2,
    /// Thymine.
    T = 3,
    /// Unknown base; also the sentinel for symbols outside the alphabet.
    #[default]
    N = 4,
}

impl Nucleotide {
    pub const SIZE: usize = 5;

    pub const VALUES: [Nucleotide; Self::SIZE] = [
        Nucleotide::A,
        Nucleotide::C,
        Nucleotide::G,
        Nucleotide::T,
        Nucleotide::N,
    ];

    #[inline]
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        BYTE_TO_NUCLEOTIDE[byte as usize]
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for Nucleotide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ch = match self {
            Nucleotide::A => 'A',
            Nucleotide::C => 'C',
            Nucleotide::G => 'G',
            Nucleotide::T => 'T',
            Nucleotide::N => 'N',
        };

        write!(f, "{}", ch)
    }
}

const BYTE_TO_NUCLEOTIDE: [Nucleotide; 256] = {
    let mut table = [Nucleotide::N; 256];

    table[b'A' as usize] = Nucleotide::A;
    table[b'C' as usize] = Nucleotide::C;
    table[b'G' as usize] = Nucleotide::G;
    table[b'T' as usize] = Nucleotide::T;
    table[b'a' as usize] = Nucleotide::A;
    table[b'c' as usize] = Nucleotide::C;
    table[b'g' as usize] = Nucleotide::G;
    table[b't' as usize] = Nucleotide::T;

    table
};

/// Maps every symbol of `sequence` to its [`Nucleotide`] category.
///
/// Symbols outside of `ACGTN` (in either case) are mapped to
/// [`Nucleotide::N`].
///
/// # Examples
/// ```
/// use pairtok::codec::{encode_sequence, Nucleotide};
///
/// let encoded = encode_sequence("ACgtZ");
/// assert_eq!(
///     encoded,
///     [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T, Nucleotide::N]
/// );
/// ```
#[must_use]
pub fn encode_sequence(sequence: &str) -> Vec<Nucleotide> {
    sequence.bytes().map(Nucleotide::from_byte).collect()
}

/// Splits `sequence` into non-overlapping k-mers separated by single spaces.
///
/// The last k-mer is right-padded with `pad` if it is shorter than `k`.
///
/// # Examples
/// ```
/// use pairtok::codec::tokenize_to_kmers;
///
/// assert_eq!(tokenize_to_kmers("ACGTA", 'X', 2).unwrap(), "AC GT AX");
/// assert!(tokenize_to_kmers("ACGTA", 'X', 0).is_err());
/// ```
pub fn tokenize_to_kmers(sequence: &str, pad: char, k: usize) -> Result<String, CodecError> {
    if k == 0 {
        return Err(CodecError::InvalidKmerSize(k));
    }

    let mut result = String::with_capacity(sequence.len() + sequence.len() / k + k);
    let mut in_chunk = 0;
    for ch in sequence.chars() {
        if in_chunk == k {
            result.push(' ');
            in_chunk = 0;
        }
        result.push(ch);
        in_chunk += 1;
    }
    if in_chunk > 0 {
        result.extend(std::iter::repeat(pad).take(k - in_chunk));
    }

    Ok(result)
}

/// Reverses [`tokenize_to_kmers`]: removes the token separators and the
/// trailing padding.
#[must_use]
pub fn detokenize(tokens: &str, pad: char) -> String {
    let joined: String = tokens.split(' ').collect();
    joined.trim_end_matches(pad).to_owned()
}

/// Returns the raw ordinal value of each quality character.
#[must_use]
pub fn quality_to_scores(quality: &str) -> Vec<u32> {
    quality.chars().map(|ch| ch as u32).collect()
}

/// Returns the mean Phred score (`ordinal - 33`) of a quality string, or
/// `None` if it is empty.
#[must_use]
pub fn mean_phred_score(quality: &str) -> Option<f64> {
    let scores = quality_to_scores(quality);
    if scores.is_empty() {
        return None;
    }

    let total: f64 = scores
        .iter()
        .map(|&score| f64::from(score.saturating_sub(PHRED_OFFSET)))
        .sum();
    Some(total / scores.len() as f64)
}

/// k-mer tokenizer with a validated k-mer size.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct KmerTokenizer {
    k: usize,
    pad: char,
}

impl KmerTokenizer {
    /// Creates a tokenizer padding with [`KMER_PAD`].
    pub fn new(k: usize) -> Result<Self, CodecError> {
        Self::with_pad(k, KMER_PAD)
    }

    pub fn with_pad(k: usize, pad: char) -> Result<Self, CodecError> {
        if k == 0 {
            return Err(CodecError::InvalidKmerSize(k));
        }

        Ok(Self { k, pad })
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn pad(&self) -> char {
        self.pad
    }

    #[must_use]
    pub fn tokenize(&self, sequence: &str) -> String {
        tokenize_to_kmers(sequence, self.pad, self.k).expect("k-mer size validated on creation")
    }
}
