use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use chrono::Local;
use lazy_static::lazy_static;
use log::LevelFilter;
use log::{Metadata, Record};

use crate::PROGRESS_BAR;

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format!(
            "{} [{}] [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
            record.level(),
            record.target(),
            record.args()
        );

        if let Ok(mut file) = LOG_FILE.lock() {
            if let Some(file) = file.as_mut() {
                let _ = writeln!(file, "{}", msg);
            }
        }

        if PROGRESS_BAR.is_hidden() {
            eprintln!("{}", msg);
        } else {
            PROGRESS_BAR.println(msg);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = LOG_FILE.lock() {
            if let Some(file) = file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

static LOGGER: Logger = Logger;

/// Installs the logger; messages are also appended to `log_file`, if given.
pub fn init_logging(filter: LevelFilter, log_file: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Could not create log directory {}", parent.display())
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Could not open log file {}", path.display()))?;
        *LOG_FILE.lock().expect("Could not acquire log file lock") = Some(file);
    }

    log::set_logger(&LOGGER).map_err(|e| anyhow!("Could not initialize logging: {}", e))?;
    log::set_max_level(filter);

    Ok(())
}
