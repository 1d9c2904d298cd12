use std::io;

/// Optional machine-readable output of a command, written as CSV to the
/// standard output.
#[derive(Debug)]
pub(crate) struct CsvStatOutput {
    writer: Option<csv::Writer<io::Stdout>>,
    header_written: bool,
}

impl CsvStatOutput {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        let writer = enabled.then(|| csv::Writer::from_writer(io::stdout()));

        Self {
            writer,
            header_written: false,
        }
    }

    pub fn use_header(&mut self, header: &[&str]) -> anyhow::Result<()> {
        if let Some(writer) = &mut self.writer {
            if !self.header_written {
                writer.write_record(header)?;
                self.header_written = true;
            }
        }

        Ok(())
    }

    pub fn add_record<I, T>(&mut self, values: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        if let Some(writer) = &mut self.writer {
            writer.write_record(values)?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        if let Some(writer) = &mut self.writer {
            writer.flush()?;
        }

        Ok(())
    }
}
