use std::io::BufRead;

use log::warn;

use crate::fastq::reader::{FastqReader, FastqResult};
use crate::fastq::FastqRead;
use crate::progress::ByteNum;

/// Two reads at the same ordinal position in the R1 and R2 files.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReadPair {
    pub r1: FastqRead,
    pub r2: FastqRead,
}

impl ReadPair {
    #[must_use]
    pub fn new(r1: FastqRead, r2: FastqRead) -> Self {
        Self { r1, r2 }
    }

    /// Returns the combined on-disk size of both reads.
    #[must_use]
    pub fn size(&self) -> ByteNum {
        self.r1.size() + self.r2.size()
    }

    /// Consumes the pair and returns both sequences.
    #[must_use]
    pub fn into_sequences(self) -> (String, String) {
        (self.r1.into_sequence(), self.r2.into_sequence())
    }
}

/// Reads R1 and R2 FASTQ files in lockstep.
///
/// Iteration stops as soon as either file has no complete record left. A
/// record count mismatch between the files is logged, not treated as an
/// error.
#[derive(Debug)]
pub struct PairedFastqReader<R1, R2> {
    reader_1: FastqReader<R1>,
    reader_2: FastqReader<R2>,
    pairs_read: usize,
    finished: bool,
}

impl<R1: BufRead, R2: BufRead> PairedFastqReader<R1, R2> {
    /// Creates a new `PairedFastqReader` over two buffered readers.
    ///
    /// # Examples
    /// ```
    /// use pairtok::fastq::paired::PairedFastqReader;
    ///
    /// let r1 = "@a/1\nACGT\n+\nIIII\n".as_bytes();
    /// let r2 = "@a/2\nTTGG\n+\nIIII\n".as_bytes();
    /// let pairs: Vec<_> = PairedFastqReader::new(r1, r2)
    ///     .map(|pair| pair.unwrap().into_sequences())
    ///     .collect();
    ///
    /// assert_eq!(pairs, [("ACGT".to_owned(), "TTGG".to_owned())]);
    /// ```
    #[must_use]
    pub fn new(reader_1: R1, reader_2: R2) -> Self {
        Self {
            reader_1: FastqReader::new(reader_1),
            reader_2: FastqReader::new(reader_2),
            pairs_read: 0,
            finished: false,
        }
    }

    /// Returns the number of pairs read so far.
    #[must_use]
    pub fn pairs_read(&self) -> usize {
        self.pairs_read
    }

    /// Reads the next pair; returns `None` once either file is exhausted.
    pub fn read_pair(&mut self) -> FastqResult<Option<ReadPair>> {
        if self.finished {
            return Ok(None);
        }

        let r1 = self.reader_1.read_sequence();
        let r2 = self.reader_2.read_sequence();

        match (r1, r2) {
            (Ok(Some(r1)), Ok(Some(r2))) => {
                self.pairs_read += 1;
                Ok(Some(ReadPair::new(r1, r2)))
            }
            (Err(e), _) | (_, Err(e)) => {
                self.finished = true;
                Err(e)
            }
            (Ok(r1), Ok(r2)) => {
                self.finished = true;
                if r1.is_some() || r2.is_some() {
                    let longer = if r1.is_some() { "R1" } else { "R2" };
                    warn!(
                        "{} has more records than its mate file; stopping after {} pairs",
                        longer, self.pairs_read
                    );
                }
                Ok(None)
            }
        }
    }
}

impl<R1: BufRead, R2: BufRead> Iterator for PairedFastqReader<R1, R2> {
    type Item = FastqResult<ReadPair>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_pair().transpose()
    }
}
