use std::io;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::error::PipelineResult;

/// Output file that replaces `target` only once it has been fully written.
///
/// Data goes to a temporary file in the target's directory; [`commit`]
/// renames it over the target in a single filesystem operation. Dropping an
/// uncommitted `AtomicFile` removes the temporary file and leaves the target
/// untouched.
///
/// [`commit`]: AtomicFile::commit
#[derive(Debug)]
pub struct AtomicFile {
    writer: BufWriter<NamedTempFile>,
    target: PathBuf,
}

impl AtomicFile {
    pub fn new(target: &Path) -> io::Result<Self> {
        let directory = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(directory)?;
        debug!(
            "Writing `{}` through temporary file `{}`",
            target.display(),
            temp.path().display()
        );

        Ok(Self {
            writer: BufWriter::new(temp),
            target: target.to_path_buf(),
        })
    }

    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Flushes the data and atomically moves it to the target path.
    pub fn commit(self) -> PipelineResult<()> {
        let temp = self.writer.into_inner().map_err(|e| e.into_error())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.target)?;

        Ok(())
    }
}

impl Write for AtomicFile {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.writer.write_all(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
