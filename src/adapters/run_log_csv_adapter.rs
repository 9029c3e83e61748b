//! CSV run ledger.

use crate::domain::error::EarnsightError;
use crate::domain::run_log::RunLogEntry;
use crate::ports::run_log_port::RunLogPort;
use chrono::SecondsFormat;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

pub const RUN_LOG_HEADER: [&str; 4] = ["timestamp", "ticker", "accuracy", "notes"];

pub struct RunLogCsvAdapter {
    path: PathBuf,
}

impl RunLogCsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn sink_error(&self, e: impl std::fmt::Display) -> EarnsightError {
        EarnsightError::sink("run log", format!("{}: {}", self.path.display(), e))
    }
}

impl RunLogPort for RunLogCsvAdapter {
    fn append(&mut self, entries: &[RunLogEntry]) -> Result<(), EarnsightError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.sink_error(e))?;
        }
        let needs_header = fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.sink_error(e))?;
        let mut writer = csv::Writer::from_writer(file);

        if needs_header {
            writer
                .write_record(RUN_LOG_HEADER)
                .map_err(|e| self.sink_error(e))?;
        }
        for entry in entries {
            writer
                .write_record([
                    entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
                    entry.symbol.clone(),
                    entry.accuracy.to_string(),
                    entry.notes.clone(),
                ])
                .map_err(|e| self.sink_error(e))?;
        }
        writer.flush().map_err(|e| self.sink_error(e))?;
        Ok(())
    }
}
