//! Run-log sink port trait.

use crate::domain::error::EarnsightError;
use crate::domain::run_log::RunLogEntry;

/// Append-only ledger with one row per symbol per cycle.
pub trait RunLogPort {
    fn append(&mut self, entries: &[RunLogEntry]) -> Result<(), EarnsightError>;
}
