//! Shuffling of files too large to be loaded into memory.
//!
//! The file is scanned once to record the byte offset of every block of
//! `lines_per_block` lines ([`ShuffleIndex::build`]). Only the offsets are
//! permuted; the shuffled file is then reconstructed by seeking to each
//! offset in turn and copying the block verbatim
//! ([`ShuffleIndex::write_shuffled`]).

use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::{check_fraction, PipelineError, PipelineResult};
use crate::lines::LineBlockReader;
use crate::replace::AtomicFile;

#[derive(Debug, Clone)]
pub struct ShuffleParams {
    lines_per_block: usize,
    retention_fraction: f64,
    header_lines: usize,
    comment_prefix: Option<String>,
}

impl ShuffleParams {
    pub fn builder() -> ShuffleParamsBuilder {
        ShuffleParamsBuilder::new()
    }

    #[must_use]
    pub fn lines_per_block(&self) -> usize {
        self.lines_per_block
    }

    #[must_use]
    pub fn retention_fraction(&self) -> f64 {
        self.retention_fraction
    }

    #[must_use]
    pub fn header_lines(&self) -> usize {
        self.header_lines
    }

    #[must_use]
    pub fn comment_prefix(&self) -> Option<&str> {
        self.comment_prefix.as_deref()
    }

    fn is_comment(&self, line: &[u8]) -> bool {
        match &self.comment_prefix {
            Some(prefix) if !prefix.is_empty() => line.starts_with(prefix.as_bytes()),
            _ => false,
        }
    }
}

impl Default for ShuffleParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct ShuffleParamsBuilder {
    lines_per_block: usize,
    retention_fraction: f64,
    header_lines: usize,
    comment_prefix: Option<String>,
}

impl ShuffleParamsBuilder {
    pub fn new() -> Self {
        Self {
            lines_per_block: 1,
            retention_fraction: 0.0,
            header_lines: 0,
            comment_prefix: None,
        }
    }

    pub fn lines_per_block(&mut self, lines_per_block: usize) -> &mut Self {
        let mut new = self;
        new.lines_per_block = lines_per_block;
        new
    }

    pub fn retention_fraction(&mut self, retention_fraction: f64) -> &mut Self {
        let mut new = self;
        new.retention_fraction = retention_fraction;
        new
    }

    pub fn header_lines(&mut self, header_lines: usize) -> &mut Self {
        let mut new = self;
        new.header_lines = header_lines;
        new
    }

    pub fn comment_prefix<T: Into<String>>(&mut self, comment_prefix: T) -> &mut Self {
        let mut new = self;
        new.comment_prefix = Some(comment_prefix.into());
        new
    }

    pub fn build(&mut self) -> ShuffleParams {
        ShuffleParams {
            lines_per_block: self.lines_per_block,
            retention_fraction: self.retention_fraction,
            header_lines: self.header_lines,
            comment_prefix: self.comment_prefix.clone(),
        }
    }
}

impl Default for ShuffleParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Header lines and block offsets of a file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShuffleIndex {
    header: Vec<Vec<u8>>,
    offsets: Vec<u64>,
    lines_per_block: usize,
}

impl ShuffleIndex {
    /// Scans `reader` from the start, recording header lines and the offset
    /// of each block.
    ///
    /// # Panics
    /// This function panics if `params.lines_per_block()` is 0.
    pub fn build<R: BufRead>(reader: R, params: &ShuffleParams) -> io::Result<Self> {
        let mut lines = LineBlockReader::new(reader, params.lines_per_block);
        let mut header = Vec::new();
        let mut offsets = Vec::new();
        let mut buf = Vec::new();

        loop {
            let offset = lines.position();
            buf.clear();
            if lines.read_line(&mut buf)? == 0 {
                break;
            }

            if lines.lines_read() <= params.header_lines as u64 || params.is_comment(&buf) {
                header.push(buf.clone());
                continue;
            }

            offsets.push(offset);
            lines.skip_lines(params.lines_per_block - 1)?;
        }

        Ok(Self {
            header,
            offsets,
            lines_per_block: params.lines_per_block,
        })
    }

    /// Returns the number of blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    #[must_use]
    pub fn header_lines(&self) -> usize {
        self.header.len()
    }

    /// Returns the block offsets in output order.
    #[must_use]
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Keeps the first `floor(len * retention_fraction)` blocks in place and
    /// shuffles the rest. Returns the number of blocks kept in place.
    pub fn permute<R: Rng + ?Sized>(&mut self, retention_fraction: f64, rng: &mut R) -> usize {
        let cutoff = ((self.offsets.len() as f64 * retention_fraction).floor() as usize)
            .min(self.offsets.len());
        self.offsets[cutoff..].shuffle(rng);

        cutoff
    }

    /// Writes the header lines, then every block in index order, reading the
    /// blocks from `source`.
    ///
    /// Returns the number of bytes written.
    pub fn write_shuffled<S, W>(&self, source: S, out: &mut W) -> io::Result<u64>
    where
        S: Read + Seek,
        W: Write,
    {
        let mut written = 0;
        for line in &self.header {
            written += write_terminated(out, line)?;
        }

        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        for &offset in &self.offsets {
            reader.seek(SeekFrom::Start(offset))?;
            let mut lines = LineBlockReader::new(&mut reader, self.lines_per_block);
            if lines.read_block(&mut buf)?.is_none() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("no block at offset {}", offset),
                ));
            }
            written += write_terminated(out, &buf)?;
        }

        Ok(written)
    }
}

fn write_terminated<W: Write>(out: &mut W, data: &[u8]) -> io::Result<u64> {
    out.write_all(data)?;
    if data.ends_with(b"\n") {
        Ok(data.len() as u64)
    } else {
        out.write_all(b"\n")?;
        Ok(data.len() as u64 + 1)
    }
}

/// Result of [`shuffle_file`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize)]
pub struct ShuffleSummary {
    pub header_lines: usize,
    pub blocks: usize,
    /// Number of leading blocks that kept their position.
    pub retained: usize,
}

/// Shuffles the blocks of the file at `path` in place.
///
/// The result is written to a temporary file that replaces `path` only after
/// it is complete.
pub fn shuffle_file<R: Rng + ?Sized>(
    path: &Path,
    params: &ShuffleParams,
    rng: &mut R,
) -> PipelineResult<ShuffleSummary> {
    let retention_fraction = check_fraction("retention fraction", params.retention_fraction)?;
    if params.lines_per_block == 0 {
        return Err(PipelineError::InvalidParameter(
            "a block must span at least one line".to_owned(),
        ));
    }

    let mut index = ShuffleIndex::build(BufReader::new(File::open(path)?), params)?;
    let retained = index.permute(retention_fraction, rng);
    debug!(
        "Indexed {} blocks of `{}`, {} kept in place",
        index.len(),
        path.display(),
        retained
    );

    let mut out = AtomicFile::new(path)?;
    index.write_shuffled(File::open(path)?, &mut out)?;
    out.commit()?;

    Ok(ShuffleSummary {
        header_lines: index.header_lines(),
        blocks: index.len(),
        retained,
    })
}
