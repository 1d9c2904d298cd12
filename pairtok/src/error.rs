use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::codec::CodecError;
use crate::dataset::DatasetRecordError;
use crate::fastq::reader::FastqReaderError;

/// Error aborting a dataset operation.
#[derive(Debug)]
pub enum PipelineError {
    /// A required input file does not exist.
    MissingInput(PathBuf),
    /// An input FASTQ file is malformed.
    Fastq(FastqReaderError),
    /// The tokenizer could not be configured.
    Codec(CodecError),
    /// A dataset line does not follow the record format.
    Record { line: u64, error: DatasetRecordError },
    /// A numeric parameter is out of its allowed range.
    InvalidParameter(String),
    /// I/O error occurred when reading or writing a file.
    IoError(std::io::Error),
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<tempfile::PersistError> for PipelineError {
    fn from(e: tempfile::PersistError) -> Self {
        Self::IoError(e.error)
    }
}

impl From<FastqReaderError> for PipelineError {
    fn from(e: FastqReaderError) -> Self {
        match e {
            FastqReaderError::IoError(e) => Self::IoError(e),
            e => Self::Fastq(e),
        }
    }
}

impl From<CodecError> for PipelineError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MissingInput(path) => {
                write!(f, "Input file does not exist: {}", path.display())
            }
            PipelineError::Fastq(e) => write!(f, "Malformed FASTQ input: {}", e),
            PipelineError::Codec(e) => write!(f, "{}", e),
            PipelineError::Record { line, error } => {
                write!(f, "Invalid dataset record at line {}: {}", line, error)
            }
            PipelineError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PipelineError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Fastq(e) => Some(e),
            PipelineError::Codec(e) => Some(e),
            PipelineError::Record { error, .. } => Some(error),
            PipelineError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Checks that `value` is a finite fraction in `[0, 1]`.
pub(crate) fn check_fraction(name: &str, value: f64) -> PipelineResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(PipelineError::InvalidParameter(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}
