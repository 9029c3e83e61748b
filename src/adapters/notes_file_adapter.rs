//! Plain-text notes file: one `[timestamp] text` line per note.

use crate::domain::error::EarnsightError;
use crate::domain::notes::NoteEntry;
use crate::ports::notes_port::NotesPort;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct NotesFileAdapter {
    path: PathBuf,
}

impl NotesFileAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn sink_error(&self, e: impl std::fmt::Display) -> EarnsightError {
        EarnsightError::sink("notes", format!("{}: {}", self.path.display(), e))
    }
}

/// Split `[stamp] text`. Lines without a readable stamp are all text.
fn parse_line(line: &str) -> (Option<DateTime<Utc>>, &str) {
    if let Some(rest) = line.strip_prefix('[') {
        if let Some((stamp, text)) = rest.split_once(']') {
            if let Ok(ts) = DateTime::parse_from_rfc3339(stamp.trim()) {
                return (Some(ts.with_timezone(&Utc)), text.trim());
            }
        }
    }
    (None, line)
}

pub fn format_line(entry: &NoteEntry) -> String {
    format!(
        "[{}] {}",
        entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        entry.text
    )
}

impl NotesPort for NotesFileAdapter {
    fn load(&self) -> Result<Vec<NoteEntry>, EarnsightError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.sink_error(e))?;

        let mut entries: Vec<NoteEntry> = Vec::new();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (stamp, text) = parse_line(line);
            // Hand-written lines inherit the previous stamp to keep order.
            let timestamp = stamp
                .or_else(|| entries.last().map(|e| e.timestamp))
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
            entries.push(NoteEntry {
                timestamp,
                text: text.to_string(),
            });
        }
        Ok(entries)
    }

    fn append(&mut self, entries: &[NoteEntry]) -> Result<(), EarnsightError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.sink_error(e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.sink_error(e))?;

        let mut buf = String::new();
        for entry in entries {
            buf.push_str(&format_line(entry));
            buf.push('\n');
        }
        file.write_all(buf.as_bytes()).map_err(|e| self.sink_error(e))?;
        Ok(())
    }
}
