use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::codec::KmerTokenizer;
use crate::dataset::{DatasetRecord, DATASET_HEADER, READ_SEPARATOR};
use crate::error::PipelineResult;
use crate::fastq::paired::ReadPair;
use crate::fastq::reader::FastqResult;
use crate::progress::ProgressNotifier;

/// Writes one positive record built from two raw read sequences.
///
/// # Examples
/// ```
/// use pairtok::codec::KmerTokenizer;
/// use pairtok::dataset::writer::write_pair_record;
///
/// let mut out = Vec::new();
/// let tokenizer = KmerTokenizer::new(3).unwrap();
/// write_pair_record(&mut out, "ACGTA", "TTT", &tokenizer).unwrap();
///
/// assert_eq!(out, b"ACG TAX [SEP] TTT\t1\n");
/// ```
pub fn write_pair_record<W: Write>(
    writer: &mut W,
    sequence_1: &str,
    sequence_2: &str,
    tokenizer: &KmerTokenizer,
) -> io::Result<()> {
    writeln!(
        writer,
        "{} {} {}\t1",
        tokenizer.tokenize(sequence_1),
        READ_SEPARATOR,
        tokenizer.tokenize(sequence_2)
    )
}

/// Dataset file writer: a header line followed by counted records.
#[derive(Debug)]
pub struct DatasetWriter<W: Write> {
    writer: W,
    tokenizer: KmerTokenizer,
    records: usize,
    header_written: bool,
}

impl<W: Write> DatasetWriter<W> {
    #[must_use]
    pub fn new(writer: W, tokenizer: KmerTokenizer) -> Self {
        Self {
            writer,
            tokenizer,
            records: 0,
            header_written: false,
        }
    }

    /// Writes the header line unless it has been written already.
    pub fn write_header(&mut self) -> io::Result<()> {
        if !self.header_written {
            writeln!(self.writer, "{}", DATASET_HEADER)?;
            self.header_written = true;
        }

        Ok(())
    }

    /// Tokenizes both reads of a pair and writes them as a positive record.
    pub fn write_pair(&mut self, pair: &ReadPair) -> io::Result<()> {
        self.write_header()?;
        write_pair_record(
            &mut self.writer,
            pair.r1.sequence(),
            pair.r2.sequence(),
            &self.tokenizer,
        )?;
        self.records += 1;

        Ok(())
    }

    pub fn write_record(&mut self, record: &DatasetRecord) -> io::Result<()> {
        self.write_header()?;
        writeln!(self.writer, "{}", record)?;
        self.records += 1;

        Ok(())
    }

    /// Returns the number of records written so far, header excluded.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// Writes the header if there were no records, flushes and returns the
    /// number of records written.
    pub fn finish(mut self) -> io::Result<usize> {
        self.write_header()?;
        self.writer.flush()?;

        Ok(self.records)
    }
}

/// Writes every read pair to a new dataset file at `output_path`.
///
/// Returns the number of records written; this count is what the splitter
/// relies on, so the output never has to be scanned again.
pub fn save_fastq<I>(
    pairs: I,
    output_path: &Path,
    tokenizer: KmerTokenizer,
    progress_notifier: &dyn ProgressNotifier,
) -> PipelineResult<usize>
where
    I: IntoIterator<Item = FastqResult<ReadPair>>,
{
    let file = File::create(output_path)?;
    let mut writer = DatasetWriter::new(BufWriter::new(file), tokenizer);
    writer.write_header()?;

    for pair in pairs {
        let pair = pair?;
        writer.write_pair(&pair)?;
        progress_notifier.processed_bytes(pair.size());
    }

    let records = writer.finish()?;
    debug!(
        "Wrote {} records to `{}`",
        records,
        output_path.display()
    );

    Ok(records)
}
