//! Durable sink behind the notes store.

use crate::domain::error::EarnsightError;
use crate::domain::notes::NoteEntry;

/// Append-only note storage. Must keep insertion order across restarts.
pub trait NotesPort {
    fn load(&self) -> Result<Vec<NoteEntry>, EarnsightError>;
    fn append(&mut self, entries: &[NoteEntry]) -> Result<(), EarnsightError>;
}
