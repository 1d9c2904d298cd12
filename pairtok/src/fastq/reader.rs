use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io::BufRead;

use log::warn;

use crate::fastq::{
    FastqRead, FASTQ_LINES_PER_RECORD, FASTQ_QUALITY_SCORE_SEPARATOR, FASTQ_TITLE_PREFIX,
};
use crate::progress::ByteNum;

/// Error occurring during parsing a FASTQ file.
#[derive(Debug)]
pub enum FastqReaderError {
    /// I/O error occurred when reading the FASTQ file.
    IoError(std::io::Error),
    /// A line does not have the structure required at its position in the
    /// record.
    InvalidFormat { line: u64, expected: &'static str },
    /// The length of the sequence and the quality string is not equal.
    LengthMismatch {
        line: u64,
        sequence: usize,
        quality: usize,
    },
}

impl From<std::io::Error> for FastqReaderError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastqReaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastqReaderError::IoError(e) => write!(f, "IO error: {}", e),
            FastqReaderError::InvalidFormat { line, expected } => {
                write!(f, "Invalid format at line {}: expected {}", line, expected)
            }
            FastqReaderError::LengthMismatch {
                line,
                sequence,
                quality,
            } => write!(
                f,
                "Sequence and quality length mismatch at line {}: {} != {}",
                line, sequence, quality
            ),
        }
    }
}

impl Error for FastqReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastqReaderError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of a FASTQ reading operation.
pub type FastqResult<T> = Result<T, FastqReaderError>;

/// FASTQ format reader.
///
/// Records are 4-line groups. A group cut short by the end of the file is
/// dropped with a warning; a malformed group anywhere else is an error.
#[derive(Debug)]
pub struct FastqReader<R> {
    reader: R,
    line_number: u64,
    buffer: Vec<u8>,
}

impl<R: BufRead> FastqReader<R> {
    /// Creates new `FastqReader` instance.
    ///
    /// # Examples
    /// ```
    /// use pairtok::fastq::reader::FastqReader;
    ///
    /// let buf = Vec::new();
    /// let _reader = FastqReader::new(buf.as_slice());
    /// ```
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Returns the number of lines consumed so far.
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Reads a single FASTQ record; returns `None` at the end of the stream.
    pub fn read_sequence(&mut self) -> FastqResult<Option<FastqRead>> {
        let mut bytes_read = 0;

        let identifier = loop {
            let line = match self.next_line(&mut bytes_read)? {
                Some(line) => line,
                None => return Ok(None),
            };
            if line.trim().is_empty() {
                continue;
            }
            if !line.as_bytes().starts_with(&[FASTQ_TITLE_PREFIX]) {
                return Err(FastqReaderError::InvalidFormat {
                    line: self.line_number,
                    expected: "a record header starting with `@`",
                });
            }

            break line[1..]
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_owned();
        };
        let title_line = self.line_number;

        let sequence = match self.next_line(&mut bytes_read)? {
            Some(line) => line.trim().to_owned(),
            None => return Ok(self.truncated(title_line, 1)),
        };

        match self.next_line(&mut bytes_read)? {
            Some(line) => {
                if !line.as_bytes().starts_with(&[FASTQ_QUALITY_SCORE_SEPARATOR]) {
                    return Err(FastqReaderError::InvalidFormat {
                        line: self.line_number,
                        expected: "a separator line starting with `+`",
                    });
                }
            }
            None => return Ok(self.truncated(title_line, 2)),
        }

        let quality = match self.next_line(&mut bytes_read)? {
            Some(line) => line.trim().to_owned(),
            None => return Ok(self.truncated(title_line, 3)),
        };

        if sequence.len() != quality.len() {
            return Err(FastqReaderError::LengthMismatch {
                line: self.line_number,
                sequence: sequence.len(),
                quality: quality.len(),
            });
        }

        Ok(Some(FastqRead::with_size(
            identifier,
            sequence,
            quality,
            ByteNum::new(bytes_read),
        )))
    }

    fn truncated(&self, title_line: u64, lines: usize) -> Option<FastqRead> {
        warn!(
            "Discarding truncated FASTQ record starting at line {} ({} of {} lines present)",
            title_line, lines, FASTQ_LINES_PER_RECORD
        );

        None
    }

    fn next_line(&mut self, total_bytes_read: &mut usize) -> FastqResult<Option<&str>> {
        self.buffer.clear();
        let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        *total_bytes_read += bytes_read;
        self.line_number += 1;

        let line = std::str::from_utf8(&self.buffer).map_err(|_| {
            FastqReaderError::InvalidFormat {
                line: self.line_number,
                expected: "UTF-8 text",
            }
        })?;
        Ok(Some(line.trim_end_matches(&['\n', '\r'][..])))
    }
}

impl<R: BufRead> IntoIterator for FastqReader<R> {
    type Item = FastqResult<FastqRead>;
    type IntoIter = FastqReaderIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            reader: self,
            finished: false,
        }
    }
}

/// Iterator implementation for [`FastqReader`] which iterates over all
/// reads in a file.
#[derive(Debug)]
pub struct FastqReaderIterator<R> {
    reader: FastqReader<R>,
    finished: bool,
}

impl<R: BufRead> Iterator for FastqReaderIterator<R> {
    type Item = FastqResult<FastqRead>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.reader.read_sequence().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.finished = true;
        }
        result
    }
}
