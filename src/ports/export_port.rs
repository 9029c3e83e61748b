//! Result export port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::EarnsightError;
use std::path::Path;

/// Port for dumping scored backtest results for offline analysis.
pub trait ResultExportPort {
    fn export(&self, results: &[BacktestResult], output_path: &Path) -> Result<(), EarnsightError>;
}
