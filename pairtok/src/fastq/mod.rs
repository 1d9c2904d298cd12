use crate::progress::ByteNum;

pub mod input;
pub mod paired;
pub mod reader;

pub(crate) const FASTQ_TITLE_PREFIX: u8 = b'@';
pub(crate) const FASTQ_QUALITY_SCORE_SEPARATOR: u8 = b'+';
pub(crate) const FASTQ_LINES_PER_RECORD: usize = 4;

/// A single FASTQ read.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct FastqRead {
    identifier: String,
    sequence: String,
    quality: String,
    size: ByteNum,
}

impl FastqRead {
    /// Creates a new instance of `FastqRead`.
    ///
    /// # Examples
    /// ```
    /// use pairtok::fastq::FastqRead;
    ///
    /// let read = FastqRead::new("read_1", "ACGT", "IIII");
    /// assert_eq!(read.sequence(), "ACGT");
    /// assert_eq!(read.len(), 4);
    /// ```
    #[must_use]
    pub fn new<T, U, V>(identifier: T, sequence: U, quality: V) -> Self
    where
        T: Into<String>,
        U: Into<String>,
        V: Into<String>,
    {
        let identifier = identifier.into();
        let sequence = sequence.into();
        let quality = quality.into();

        const FASTQ_BOILERPLATE_LEN: usize = "@\n\n+\n\n".len();
        let approximate_size =
            identifier.len() + sequence.len() + quality.len() + FASTQ_BOILERPLATE_LEN;

        Self::with_size(identifier, sequence, quality, ByteNum::new(approximate_size))
    }

    #[must_use]
    pub fn with_size<T, U, V>(identifier: T, sequence: U, quality: V, size: ByteNum) -> Self
    where
        T: Into<String>,
        U: Into<String>,
        V: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            sequence: sequence.into(),
            quality: quality.into(),
            size,
        }
    }

    /// Returns the identifier of this read (header line without the `@`,
    /// up to the first whitespace).
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    #[must_use]
    pub fn quality(&self) -> &str {
        &self.quality
    }

    /// Returns the number of bytes this read occupied in the source file.
    #[must_use]
    pub fn size(&self) -> ByteNum {
        self.size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Consumes this read and returns its sequence.
    #[must_use]
    pub fn into_sequence(self) -> String {
        self.sequence
    }
}
