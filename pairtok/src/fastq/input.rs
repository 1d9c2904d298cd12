use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;

use crate::fastq::paired::PairedFastqReader;

/// Buffered FASTQ input, transparently decompressed if gzipped.
pub type FastqInput = Box<dyn BufRead + Send>;

const GZIP_EXTENSION: &str = "gz";

/// Opens a FASTQ file; files with a `.gz` extension are decompressed on the
/// fly.
pub fn open_fastq(path: &Path) -> io::Result<FastqInput> {
    let file = File::open(path)?;
    let is_gzip = is_gzip(path);

    debug!(
        "Opening FASTQ file `{}`{}",
        path.display(),
        if is_gzip { " (gzip)" } else { "" }
    );

    let input: FastqInput = if is_gzip {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(input)
}

/// Opens R1 and R2 and pairs them.
pub fn open_paired(r1: &Path, r2: &Path) -> io::Result<PairedFastqReader<FastqInput, FastqInput>> {
    Ok(PairedFastqReader::new(open_fastq(r1)?, open_fastq(r2)?))
}

/// Returns whether the file at `path` is read through a gzip decoder.
#[must_use]
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map_or(false, |extension| extension == GZIP_EXTENSION)
}

/// Returns the number of bytes the FASTQ readers will yield for the given
/// files, or `None` if any of them is gzipped and its decompressed size is
/// not known up front.
pub fn uncompressed_size(paths: &[&Path]) -> io::Result<Option<u64>> {
    if paths.iter().any(|path| is_gzip(path)) {
        return Ok(None);
    }

    total_file_size(paths).map(Some)
}

/// Returns the combined size of the given files in bytes, as stored on disk.
pub fn total_file_size(paths: &[&Path]) -> io::Result<u64> {
    let mut total = 0;
    for path in paths {
        total += path.metadata()?.len();
    }

    Ok(total)
}
