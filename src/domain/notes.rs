//! Append-only memory of free-text notes.
//!
//! Every cycle appends a summary here and the next cycle reads the most
//! recent entries back as prediction context.

use chrono::{DateTime, Utc};

use crate::domain::error::EarnsightError;
use crate::ports::notes_port::NotesPort;

/// Number of recent notes used as prediction context by default.
pub const DEFAULT_RECENT: usize = 5;
/// Separator between notes in a context string.
pub const CONTEXT_SEPARATOR: &str = " ; ";

#[derive(Debug, Clone, PartialEq)]
pub struct NoteEntry {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

pub struct NotesStore {
    sink: Box<dyn NotesPort>,
    last_stamp: Option<DateTime<Utc>>,
    seeded: bool,
}

impl NotesStore {
    pub fn new(sink: Box<dyn NotesPort>) -> Self {
        Self {
            sink,
            last_stamp: None,
            seeded: false,
        }
    }

    pub fn entries(&self) -> Result<Vec<NoteEntry>, EarnsightError> {
        self.sink.load()
    }

    /// Note texts in chronological order.
    pub fn load(&self) -> Result<Vec<String>, EarnsightError> {
        Ok(self.entries()?.into_iter().map(|e| e.text).collect())
    }

    /// Stamp each non-blank line with the current time and append it.
    ///
    /// Stamps never go backwards, even if the wall clock does: the first
    /// append starts from the newest stamp already in the sink.
    pub fn append<I, S>(&mut self, lines: I) -> Result<(), EarnsightError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.seeded {
            self.last_stamp = self.sink.load()?.into_iter().map(|e| e.timestamp).max();
            self.seeded = true;
        }
        let mut entries = Vec::new();
        for line in lines {
            let text = single_line(line.as_ref());
            if text.is_empty() {
                continue;
            }
            let now = Utc::now();
            let stamp = match self.last_stamp {
                Some(last) if last > now => last,
                _ => now,
            };
            self.last_stamp = Some(stamp);
            entries.push(NoteEntry {
                timestamp: stamp,
                text,
            });
        }
        if entries.is_empty() {
            return Ok(());
        }
        self.sink.append(&entries)
    }

    /// The last `n` note texts, oldest first.
    pub fn recent(&self, n: usize) -> Result<Vec<String>, EarnsightError> {
        let mut texts = self.load()?;
        let skip = texts.len().saturating_sub(n);
        Ok(texts.split_off(skip))
    }

    /// Recent notes joined into one context string, `None` if there are none.
    pub fn context(&self, n: usize) -> Result<Option<String>, EarnsightError> {
        let recent = self.recent(n)?;
        if recent.is_empty() {
            return Ok(None);
        }
        Ok(Some(recent.join(CONTEXT_SEPARATOR)))
    }
}

/// Collapse a note onto one line so line-oriented sinks stay parseable.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedSink(Rc<RefCell<Vec<NoteEntry>>>);

    impl NotesPort for SharedSink {
        fn load(&self) -> Result<Vec<NoteEntry>, EarnsightError> {
            Ok(self.0.borrow().clone())
        }

        fn append(&mut self, entries: &[NoteEntry]) -> Result<(), EarnsightError> {
            self.0.borrow_mut().extend_from_slice(entries);
            Ok(())
        }
    }

    fn store() -> (NotesStore, SharedSink) {
        let sink = SharedSink::default();
        (NotesStore::new(Box::new(sink.clone())), sink)
    }

    #[test]
    fn load_is_empty_without_prior_notes() {
        let (store, _) = store();
        assert!(store.load().unwrap().is_empty());
        assert_eq!(store.context(DEFAULT_RECENT).unwrap(), None);
    }

    #[test]
    fn appends_come_back_in_call_order_with_rising_stamps() {
        let (mut store, sink) = store();
        for i in 0..10 {
            store.append([format!("note {i}")]).unwrap();
        }
        let texts = store.load().unwrap();
        let expected: Vec<String> = (0..10).map(|i| format!("note {i}")).collect();
        assert_eq!(texts, expected);

        let entries = sink.0.borrow();
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn stamps_continue_from_persisted_notes() {
        let future = Utc::now() + chrono::Duration::days(365);
        let sink = SharedSink::default();
        sink.0.borrow_mut().push(NoteEntry {
            timestamp: future,
            text: "written by an earlier run".into(),
        });

        let mut store = NotesStore::new(Box::new(sink.clone()));
        store.append(["after restart"]).unwrap();

        let entries = sink.0.borrow();
        assert_eq!(entries.len(), 2);
        assert!(entries[1].timestamp >= future);
    }

    #[test]
    fn recent_keeps_order_and_bounds_length() {
        let (mut store, _) = store();
        store.append(["a", "b", "c", "d", "e", "f", "g"]).unwrap();
        assert_eq!(store.recent(3).unwrap(), vec!["e", "f", "g"]);
        assert_eq!(store.recent(50).unwrap().len(), 7);
        assert!(store.recent(0).unwrap().is_empty());
    }

    #[test]
    fn context_joins_recent_notes() {
        let (mut store, _) = store();
        store.append(["first", "second"]).unwrap();
        assert_eq!(store.context(5).unwrap(), Some("first ; second".to_string()));
    }

    #[test]
    fn blank_lines_are_dropped_and_newlines_collapsed() {
        let (mut store, sink) = store();
        store.append(["", "  ", "line one\nline two"]).unwrap();
        let entries = sink.0.borrow();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "line one line two");
    }
}
