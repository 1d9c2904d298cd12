use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use pairtok::fastq::input::{open_paired, uncompressed_size, FastqInput};
use pairtok::fastq::paired::PairedFastqReader;

/// Path to a file that existed when the arguments were parsed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InputFile {
    path: PathBuf,
}

impl Display for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

pub fn input_file(path: &str) -> Result<InputFile, String> {
    let input_path = Path::new(path);
    if !input_path.is_file() {
        return Err(format!("File does not exist: {}", path));
    }

    Ok(InputFile {
        path: input_path.to_path_buf(),
    })
}

impl InputFile {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_reader(&self) -> anyhow::Result<BufReader<File>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Could not open {}", self.path.display()))?;
        Ok(BufReader::new(file))
    }
}

/// Returns the number of bytes the pair of FASTQ inputs yields, or 0 if it is
/// not known before reading them (gzipped input).
pub fn pair_length(r1: &InputFile, r2: &InputFile) -> anyhow::Result<u64> {
    let length = uncompressed_size(&[r1.path(), r2.path()])
        .with_context(|| format!("Could not read the size of {} and {}", r1, r2))?;
    Ok(length.unwrap_or(0))
}

/// Opens two FASTQ inputs as a pair, returning the reader and the value of
/// [`pair_length`].
pub fn open_pair(
    r1: &InputFile,
    r2: &InputFile,
) -> anyhow::Result<(PairedFastqReader<FastqInput, FastqInput>, u64)> {
    let reader = open_paired(r1.path(), r2.path())
        .with_context(|| format!("Could not open {} and {}", r1, r2))?;
    let length = pair_length(r1, r2)?;

    Ok((reader, length))
}

/// Parses a number in `[0, 1]`.
pub fn fraction(value: &str) -> Result<f64, String> {
    let fraction: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if !(0.0..=1.0).contains(&fraction) {
        return Err(format!("`{}` is not within [0, 1]", value));
    }

    Ok(fraction)
}
