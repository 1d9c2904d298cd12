use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;

use crate::error::{check_fraction, PipelineError, PipelineResult};
use crate::lines::LineBlockReader;
use crate::replace::AtomicFile;

/// Parameters of [`split_records`].
#[derive(Debug, Clone)]
pub struct SplitParams {
    train_fraction: f64,
    lines_per_record: usize,
    header_lines: usize,
}

impl SplitParams {
    pub fn builder() -> SplitParamsBuilder {
        SplitParamsBuilder::new()
    }

    #[must_use]
    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    #[must_use]
    pub fn lines_per_record(&self) -> usize {
        self.lines_per_record
    }

    #[must_use]
    pub fn header_lines(&self) -> usize {
        self.header_lines
    }
}

impl Default for SplitParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct SplitParamsBuilder {
    train_fraction: f64,
    lines_per_record: usize,
    header_lines: usize,
}

impl SplitParamsBuilder {
    pub fn new() -> Self {
        Self {
            train_fraction: 0.8,
            lines_per_record: 1,
            header_lines: 0,
        }
    }

    pub fn train_fraction(&mut self, train_fraction: f64) -> &mut Self {
        let mut new = self;
        new.train_fraction = train_fraction;
        new
    }

    pub fn lines_per_record(&mut self, lines_per_record: usize) -> &mut Self {
        let mut new = self;
        new.lines_per_record = lines_per_record;
        new
    }

    pub fn header_lines(&mut self, header_lines: usize) -> &mut Self {
        let mut new = self;
        new.header_lines = header_lines;
        new
    }

    pub fn build(&mut self) -> SplitParams {
        SplitParams {
            train_fraction: self.train_fraction,
            lines_per_record: self.lines_per_record,
            header_lines: self.header_lines,
        }
    }
}

impl Default for SplitParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Record counts of both partitions after a split.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize)]
pub struct SplitSummary {
    pub train_records: usize,
    pub test_records: usize,
}

impl SplitSummary {
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.train_records + self.test_records
    }

    /// Returns `true` if there were records, but one of the partitions ended
    /// up empty.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.total_records() > 0 && (self.train_records == 0 || self.test_records == 0)
    }
}

/// Returns the number of records that stay in the training partition.
///
/// # Examples
/// ```
/// use pairtok::split::num_train_records;
///
/// assert_eq!(num_train_records(0.67, 3), 2);
/// assert_eq!(num_train_records(0.8, 10), 8);
/// ```
#[must_use]
pub fn num_train_records(train_fraction: f64, total_records: usize) -> usize {
    let num_train = (train_fraction * total_records as f64).floor() as usize;
    num_train.min(total_records)
}

/// Splits a file with one record per line and no header.
///
/// The first `floor(train_fraction * total_records)` lines stay in `source`,
/// the remaining ones are moved to `dest`, which is created or overwritten.
pub fn split_file(
    source: &Path,
    dest: &Path,
    train_fraction: f64,
    total_records: usize,
) -> PipelineResult<SplitSummary> {
    let params = SplitParams::builder()
        .train_fraction(train_fraction)
        .build();
    split_records(source, dest, &params, total_records)
}

/// Splits `source` into a training part (kept in `source`) and a test part
/// (written to `dest`).
///
/// The leading `header_lines` lines are copied to both outputs; the rest of
/// the file is handled in records of `lines_per_record` lines. `source` is
/// replaced atomically, so an error leaves it as it was.
pub fn split_records(
    source: &Path,
    dest: &Path,
    params: &SplitParams,
    total_records: usize,
) -> PipelineResult<SplitSummary> {
    let train_fraction = check_fraction("train fraction", params.train_fraction)?;
    if params.lines_per_record == 0 {
        return Err(PipelineError::InvalidParameter(
            "a record must span at least one line".to_owned(),
        ));
    }
    let num_train = num_train_records(train_fraction, total_records);
    debug!(
        "Splitting `{}`: {} of {} records stay in the training set",
        source.display(),
        num_train,
        total_records
    );

    let mut train = AtomicFile::new(source)?;
    let mut test = AtomicFile::new(dest)?;
    let mut summary = SplitSummary::default();

    {
        let file = File::open(source)?;
        let mut reader = LineBlockReader::new(BufReader::new(file), params.lines_per_record);
        let mut buf = Vec::new();

        for _ in 0..params.header_lines {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                break;
            }
            train.write_all(&buf)?;
            test.write_all(&buf)?;
        }

        while let Some(span) = reader.read_block(&mut buf)? {
            if span.lines < params.lines_per_record {
                warn!(
                    "Trailing record at byte {} of `{}` has only {} of {} lines",
                    span.offset,
                    source.display(),
                    span.lines,
                    params.lines_per_record
                );
            }

            if summary.train_records < num_train {
                train.write_all(&buf)?;
                summary.train_records += 1;
            } else {
                test.write_all(&buf)?;
                summary.test_records += 1;
            }
        }
    }

    test.commit()?;
    train.commit()?;

    if summary.total_records() != total_records {
        warn!(
            "Expected {} records in `{}`, found {}",
            total_records,
            source.display(),
            summary.total_records()
        );
    }
    if summary.is_degenerate() {
        warn!(
            "Degenerate split with fraction {}: {} training and {} test records",
            train_fraction, summary.train_records, summary.test_records
        );
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::_internal_test_data::{numbered_dataset, KMER_3_DATASET, R1_FASTQ};
    use crate::error::PipelineError;
    use crate::split::{split_file, split_records, SplitParams, SplitSummary};

    fn lines(num: usize) -> String {
        (0..num).map(|i| format!("line {}\n", i)).collect()
    }

    #[test]
    fn split_moves_tail_to_dest() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("train.tsv");
        let dest = dir.path().join("test.tsv");
        fs::write(&source, lines(10)).unwrap();

        let summary = split_file(&source, &dest, 0.8, 10).unwrap();

        assert_eq!(
            summary,
            SplitSummary {
                train_records: 8,
                test_records: 2
            }
        );
        assert!(!summary.is_degenerate());
        assert_eq!(fs::read_to_string(&source).unwrap(), lines(8));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "line 8\nline 9\n");
    }

    #[test]
    fn split_with_zero_fraction() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("train.tsv");
        let dest = dir.path().join("test.tsv");
        fs::write(&source, lines(4)).unwrap();

        let summary = split_file(&source, &dest, 0.0, 4).unwrap();

        assert_eq!(summary.train_records, 0);
        assert!(summary.is_degenerate());
        assert_eq!(fs::read_to_string(&source).unwrap(), "");
        assert_eq!(fs::read_to_string(&dest).unwrap(), lines(4));
    }

    #[test]
    fn split_with_full_fraction() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("train.tsv");
        let dest = dir.path().join("test.tsv");
        fs::write(&source, lines(4)).unwrap();
        fs::write(&dest, "stale contents\n").unwrap();

        let summary = split_file(&source, &dest, 1.0, 4).unwrap();

        assert_eq!(summary.test_records, 0);
        assert!(summary.is_degenerate());
        assert_eq!(fs::read_to_string(&source).unwrap(), lines(4));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "");
    }

    #[test]
    fn split_copies_header_to_both_outputs() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("train.tsv");
        let dest = dir.path().join("test.tsv");
        fs::write(&source, KMER_3_DATASET).unwrap();

        let params = SplitParams::builder()
            .train_fraction(0.67)
            .header_lines(1)
            .build();
        let summary = split_records(&source, &dest, &params, 3).unwrap();

        assert_eq!(summary.train_records, 2);
        assert_eq!(summary.test_records, 1);
        assert_eq!(
            fs::read_to_string(&source).unwrap(),
            "sequence\tlabel\nAAA CCC [SEP] TTT GGG\t1\nGGG TTT [SEP] CCC AAA\t1\n"
        );
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "sequence\tlabel\nACG TAC [SEP] GTA CGT\t1\n"
        );
    }

    #[test]
    fn split_keeps_multiline_records_together() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("reads.fastq");
        let dest = dir.path().join("reads_test.fastq");
        fs::write(&source, R1_FASTQ).unwrap();

        let params = SplitParams::builder()
            .train_fraction(0.5)
            .lines_per_record(4)
            .build();
        let summary = split_records(&source, &dest, &params, 3).unwrap();

        assert_eq!(summary.train_records, 1);
        assert_eq!(summary.test_records, 2);
        let test = fs::read_to_string(&dest).unwrap();
        assert!(test.starts_with("@pair_2"));
        assert_eq!(test.lines().count(), 8);
    }

    #[test]
    fn split_counts_are_complete() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("train.tsv");
        let dest = dir.path().join("test.tsv");
        fs::write(&source, numbered_dataset(37)).unwrap();

        let params = SplitParams::builder()
            .train_fraction(0.3)
            .header_lines(1)
            .build();
        let summary = split_records(&source, &dest, &params, 37).unwrap();

        assert_eq!(summary.total_records(), 37);
        let train = fs::read_to_string(&source).unwrap();
        let test = fs::read_to_string(&dest).unwrap();
        assert_eq!(train.lines().count() - 1, 11);
        assert_eq!(test.lines().count() - 1, 26);
    }

    #[test]
    fn split_rejects_invalid_fraction() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("train.tsv");
        let dest = dir.path().join("test.tsv");
        fs::write(&source, lines(2)).unwrap();

        let result = split_file(&source, &dest, 1.2, 2);

        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
        assert_eq!(fs::read_to_string(&source).unwrap(), lines(2));
        assert!(!dest.exists());
    }
}
