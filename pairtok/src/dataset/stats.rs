use std::io::BufRead;

use serde::Serialize;

use crate::dataset::{DatasetRecord, DatasetRecordError, Label, DATASET_HEADER};
use crate::error::{PipelineError, PipelineResult};
use crate::lines::{trim_line_end, LineBlockReader};

/// Decodes and validates a single dataset line.
///
/// # Examples
/// ```
/// use pairtok::dataset::stats::validate_line;
///
/// assert!(validate_line("ACG TAX [SEP] TTT\t1", 'X').is_ok());
/// assert!(validate_line("ACG TAX TTT\t1", 'X').is_err());
/// ```
pub fn validate_line(line: &str, pad: char) -> Result<DatasetRecord, DatasetRecordError> {
    let record: DatasetRecord = line.parse()?;
    record.validate(pad)?;

    Ok(record)
}

/// Summary of a dataset file.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct DatasetStats {
    pub header_present: bool,
    pub positives: usize,
    pub negatives: usize,
    pub invalid: usize,
    /// 1-based line number and reason of the first invalid line.
    #[serde(skip)]
    pub first_invalid: Option<(u64, DatasetRecordError)>,
}

impl DatasetStats {
    /// Scans a whole dataset file.
    pub fn from_reader<R: BufRead>(reader: R, pad: char) -> PipelineResult<Self> {
        let mut stats = Self::default();
        let mut lines = LineBlockReader::new(reader, 1);
        let mut buf = Vec::new();

        if lines.read_block(&mut buf)?.is_none() {
            return Ok(stats);
        }
        stats.header_present = trim_line_end(&buf) == DATASET_HEADER.as_bytes();
        if !stats.header_present {
            stats.add_line(1, &buf, pad);
        }

        while lines.read_block(&mut buf)?.is_some() {
            stats.add_line(lines.lines_read(), &buf, pad);
        }

        Ok(stats)
    }

    /// Total number of valid records.
    #[must_use]
    pub fn records(&self) -> usize {
        self.positives + self.negatives
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.header_present && self.invalid == 0
    }

    /// Converts the first invalid line into an error, if there is one.
    pub fn check(&self) -> PipelineResult<()> {
        match &self.first_invalid {
            Some((line, error)) => Err(PipelineError::Record {
                line: *line,
                error: error.clone(),
            }),
            None => Ok(()),
        }
    }

    fn add_line(&mut self, line_number: u64, line: &[u8], pad: char) {
        let result = std::str::from_utf8(trim_line_end(line))
            .map_err(|_| DatasetRecordError::InvalidToken(String::from_utf8_lossy(line).into()))
            .and_then(|line| validate_line(line, pad));

        match result {
            Ok(record) => match record.label() {
                Label::Positive => self.positives += 1,
                Label::Negative => self.negatives += 1,
            },
            Err(error) => {
                self.invalid += 1;
                if self.first_invalid.is_none() {
                    self.first_invalid = Some((line_number, error));
                }
            }
        }
    }
}
