//! Text format of the tokenized pair-classification dataset.
//!
//! A dataset file starts with the [`DATASET_HEADER`] line and continues with
//! one [`DatasetRecord`] per line:
//!
//! ```text
//! sequence\tlabel
//! AAA CCC [SEP] TTT GGG\t1
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod stats;
pub mod writer;

/// First line of every dataset file.
pub const DATASET_HEADER: &str = "sequence\tlabel";
/// Token separating the two tokenized reads of a record.
pub const READ_SEPARATOR: &str = "[SEP]";
/// Number of header lines in a dataset file.
pub const DATASET_HEADER_LINES: usize = 1;

/// Class of a record.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Label {
    /// Synthesized, mismatched pair.
    Negative = 0,
    /// True mate pair.
    Positive = 1,
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

impl FromStr for Label {
    type Err = DatasetRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Label::Negative),
            "1" => Ok(Label::Positive),
            _ => Err(DatasetRecordError::InvalidLabel(s.to_owned())),
        }
    }
}

/// Error occurring when decoding or validating a dataset line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DatasetRecordError {
    MissingSeparator,
    MultipleSeparators,
    MissingLabel,
    InvalidLabel(String),
    /// One side of the record has no tokens.
    EmptyRead,
    /// A token contains symbols outside of the nucleotide alphabet.
    InvalidToken(String),
}

impl Display for DatasetRecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetRecordError::MissingSeparator => {
                write!(f, "missing `{}` separator", READ_SEPARATOR)
            }
            DatasetRecordError::MultipleSeparators => {
                write!(f, "more than one `{}` separator", READ_SEPARATOR)
            }
            DatasetRecordError::MissingLabel => write!(f, "missing tab-delimited label"),
            DatasetRecordError::InvalidLabel(label) => write!(f, "invalid label: `{}`", label),
            DatasetRecordError::EmptyRead => write!(f, "read without tokens"),
            DatasetRecordError::InvalidToken(token) => write!(f, "invalid token: `{}`", token),
        }
    }
}

impl Error for DatasetRecordError {}

/// A single labeled pair of tokenized reads.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DatasetRecord {
    left: String,
    right: String,
    label: Label,
}

impl DatasetRecord {
    /// Creates a new record from two already tokenized reads.
    ///
    /// # Examples
    /// ```
    /// use pairtok::dataset::{DatasetRecord, Label};
    ///
    /// let record = DatasetRecord::new("AAA CCC", "TTT GGG", Label::Positive);
    /// assert_eq!(record.to_string(), "AAA CCC [SEP] TTT GGG\t1");
    /// ```
    #[must_use]
    pub fn new<T, U>(left: T, right: U, label: Label) -> Self
    where
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            left: left.into(),
            right: right.into(),
            label,
        }
    }

    /// Returns the tokens before the separator.
    #[must_use]
    pub fn left(&self) -> &str {
        &self.left
    }

    /// Returns the tokens after the separator.
    #[must_use]
    pub fn right(&self) -> &str {
        &self.right
    }

    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }

    /// Combines the left side of `self` with the right side of `other` into a
    /// negative record.
    #[must_use]
    pub fn mismatched_with(&self, other: &DatasetRecord) -> DatasetRecord {
        DatasetRecord::new(self.left.clone(), other.right.clone(), Label::Negative)
    }

    /// Checks that both sides have tokens and that every token consists of
    /// nucleotide symbols or `pad`.
    pub fn validate(&self, pad: char) -> Result<(), DatasetRecordError> {
        for side in [&self.left, &self.right] {
            if side.trim().is_empty() {
                return Err(DatasetRecordError::EmptyRead);
            }

            for token in side.split_whitespace() {
                let valid = token.chars().all(|ch| {
                    ch == pad || matches!(ch.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'N')
                });
                if !valid {
                    return Err(DatasetRecordError::InvalidToken(token.to_owned()));
                }
            }
        }

        Ok(())
    }
}

impl Display for DatasetRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}\t{}",
            self.left, READ_SEPARATOR, self.right, self.label
        )
    }
}

impl FromStr for DatasetRecord {
    type Err = DatasetRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim_end_matches(&['\n', '\r'][..]);

        let (body, label) = line
            .rsplit_once('\t')
            .ok_or(DatasetRecordError::MissingLabel)?;
        let label = label.parse()?;

        let (left, right) = body
            .split_once(READ_SEPARATOR)
            .ok_or(DatasetRecordError::MissingSeparator)?;
        if right.contains(READ_SEPARATOR) {
            return Err(DatasetRecordError::MultipleSeparators);
        }

        let left = left.strip_suffix(' ').unwrap_or(left);
        let right = right.strip_prefix(' ').unwrap_or(right);
        Ok(Self::new(left, right, label))
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::{DatasetRecord, DatasetRecordError, Label};

    #[test]
    fn test_record_encoding() {
        let record = DatasetRecord::new("ACG TAX", "GGG", Label::Negative);

        assert_eq!(record.to_string(), "ACG TAX [SEP] GGG\t0");
    }

    #[test]
    fn test_record_decoding() {
        let record: DatasetRecord = "AAA CCC [SEP] TTT GGG\t1\n".parse().unwrap();

        assert_eq!(record.left(), "AAA CCC");
        assert_eq!(record.right(), "TTT GGG");
        assert_eq!(record.label(), Label::Positive);
        assert_eq!(record.to_string(), "AAA CCC [SEP] TTT GGG\t1");
    }

    #[test]
    fn decoding_empty_sides() {
        let record: DatasetRecord = " [SEP] \t1".parse().unwrap();

        assert_eq!(record.left(), "");
        assert_eq!(record.right(), "");
        assert_eq!(record.to_string(), " [SEP] \t1");
    }

    #[test]
    fn test_decoding_errors() {
        assert_eq!(
            "AAA [SEP] CCC".parse::<DatasetRecord>(),
            Err(DatasetRecordError::MissingLabel)
        );
        assert_eq!(
            "AAA CCC\t1".parse::<DatasetRecord>(),
            Err(DatasetRecordError::MissingSeparator)
        );
        assert_eq!(
            "AAA [SEP] CCC [SEP] GGG\t1".parse::<DatasetRecord>(),
            Err(DatasetRecordError::MultipleSeparators)
        );
        assert_eq!(
            "AAA [SEP] CCC\t2".parse::<DatasetRecord>(),
            Err(DatasetRecordError::InvalidLabel("2".to_owned()))
        );
        assert_eq!(
            "sequence\tlabel".parse::<DatasetRecord>(),
            Err(DatasetRecordError::InvalidLabel("label".to_owned()))
        );
    }

    #[test]
    fn test_mismatched_with() {
        let first = DatasetRecord::new("AAA", "CCC", Label::Positive);
        let second = DatasetRecord::new("GGG", "TTT", Label::Positive);

        assert_eq!(
            first.mismatched_with(&second),
            DatasetRecord::new("AAA", "TTT", Label::Negative)
        );
    }

    #[test]
    fn test_validate() {
        assert!(DatasetRecord::new("ACG TAX", "NNN", Label::Positive)
            .validate('X')
            .is_ok());
        assert!(DatasetRecord::new("acg", "ttt", Label::Positive)
            .validate('X')
            .is_ok());
        assert_eq!(
            DatasetRecord::new("", "NNN", Label::Positive).validate('X'),
            Err(DatasetRecordError::EmptyRead)
        );
        assert_eq!(
            DatasetRecord::new("ACG", "AZA", Label::Positive).validate('X'),
            Err(DatasetRecordError::InvalidToken("AZA".to_owned()))
        );
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Negative.to_string(), "0");
        assert_eq!(Label::Positive.to_string(), "1");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DatasetRecordError::MissingSeparator.to_string(),
            "missing `[SEP]` separator"
        );
        assert_eq!(
            DatasetRecordError::InvalidToken("AZ".to_owned()).to_string(),
            "invalid token: `AZ`"
        );
    }
}
