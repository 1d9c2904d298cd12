//! Grouping of text lines into fixed-size blocks.
//!
//! Every component that has to know where a logical record starts and ends
//! (the splitter, the shuffle engine, the negative sampler) reads its input
//! through [`LineBlockReader`], which tracks the byte offset of each block so
//! that it can be revisited later with a seek.

use std::io;
use std::io::BufRead;

/// Location of a block of lines within the underlying stream.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BlockSpan {
    /// Byte offset of the first line of the block.
    pub offset: u64,
    /// Number of lines actually read; smaller than the block size only for
    /// a truncated block at the end of the stream.
    pub lines: usize,
    /// Number of bytes the block occupies, including line terminators.
    pub bytes: u64,
}

/// Reader that hands out lines in blocks of `lines_per_block`.
#[derive(Debug)]
pub struct LineBlockReader<R> {
    reader: R,
    lines_per_block: usize,
    position: u64,
    lines_read: u64,
}

impl<R: BufRead> LineBlockReader<R> {
    /// Creates a new `LineBlockReader`.
    ///
    /// # Panics
    /// This function panics if `lines_per_block` is 0.
    #[must_use]
    pub fn new(reader: R, lines_per_block: usize) -> Self {
        assert!(lines_per_block > 0, "a block must contain at least one line");

        Self {
            reader,
            lines_per_block,
            position: 0,
            lines_read: 0,
        }
    }

    /// Returns the number of lines in a complete block.
    #[must_use]
    pub fn lines_per_block(&self) -> usize {
        self.lines_per_block
    }

    /// Returns the byte offset of the next unread line.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the number of lines consumed so far.
    #[must_use]
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Appends the next line (including its terminator, if any) to `buf`.
    ///
    /// Returns the number of bytes read; 0 means the end of the stream.
    pub fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        let bytes_read = self.reader.read_until(b'\n', buf)?;
        if bytes_read > 0 {
            self.position += bytes_read as u64;
            self.lines_read += 1;
        }

        Ok(bytes_read)
    }

    /// Consumes the next line without retaining its content.
    ///
    /// Returns the number of bytes skipped; 0 means the end of the stream.
    pub fn skip_line(&mut self) -> io::Result<usize> {
        let mut skipped = 0;

        loop {
            let (consumed, line_end) = {
                let available = match self.reader.fill_buf() {
                    Ok(available) => available,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if available.is_empty() {
                    break;
                }

                match available.iter().position(|&byte| byte == b'\n') {
                    Some(index) => (index + 1, true),
                    None => (available.len(), false),
                }
            };

            self.reader.consume(consumed);
            skipped += consumed;
            if line_end {
                break;
            }
        }

        if skipped > 0 {
            self.position += skipped as u64;
            self.lines_read += 1;
        }
        Ok(skipped)
    }

    /// Skips up to `num` lines, returning how many were actually skipped.
    pub fn skip_lines(&mut self, num: usize) -> io::Result<usize> {
        for skipped in 0..num {
            if self.skip_line()? == 0 {
                return Ok(skipped);
            }
        }

        Ok(num)
    }

    /// Replaces the contents of `buf` with the next block of lines.
    ///
    /// Returns `None` at the end of the stream.
    pub fn read_block(&mut self, buf: &mut Vec<u8>) -> io::Result<Option<BlockSpan>> {
        buf.clear();
        let offset = self.position;

        let mut lines = 0;
        while lines < self.lines_per_block {
            if self.read_line(buf)? == 0 {
                break;
            }
            lines += 1;
        }

        Ok(Self::span(offset, lines, self.position))
    }

    /// Skips the next block of lines, returning where it was located.
    pub fn skip_block(&mut self) -> io::Result<Option<BlockSpan>> {
        let offset = self.position;
        let lines = self.skip_lines(self.lines_per_block)?;

        Ok(Self::span(offset, lines, self.position))
    }

    fn span(offset: u64, lines: usize, end: u64) -> Option<BlockSpan> {
        if lines == 0 {
            None
        } else {
            Some(BlockSpan {
                offset,
                lines,
                bytes: end - offset,
            })
        }
    }
}

/// Strips the trailing `\n` or `\r\n` from a line.
#[must_use]
pub fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
