//! CSV dump of scored backtest results.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::EarnsightError;
use crate::ports::export_port::ResultExportPort;
use chrono::SecondsFormat;
use std::fs;
use std::path::Path;

pub const EXPORT_HEADER: [&str; 8] = [
    "ticker",
    "earnings_date",
    "pre_close",
    "post_close",
    "actual_direction",
    "predicted_direction",
    "confidence",
    "rationale",
];

pub struct CsvExportAdapter;

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn export_error(path: &Path, e: impl std::fmt::Display) -> EarnsightError {
    EarnsightError::sink("export", format!("{}: {}", path.display(), e))
}

impl ResultExportPort for CsvExportAdapter {
    fn export(&self, results: &[BacktestResult], output_path: &Path) -> Result<(), EarnsightError> {
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| export_error(output_path, e))?;
        }
        let mut writer = csv::Writer::from_path(output_path).map_err(|e| export_error(output_path, e))?;

        writer.write_record(EXPORT_HEADER).map_err(|e| export_error(output_path, e))?;
        for r in results {
            writer
                .write_record([
                    r.symbol.clone(),
                    r.event_timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                    optional(r.pre_close),
                    optional(r.post_close),
                    r.actual_direction().to_string(),
                    r.predicted.direction.to_string(),
                    r.predicted.confidence.to_string(),
                    r.predicted.rationale.clone(),
                ])
                .map_err(|e| export_error(output_path, e))?;
        }
        writer.flush().map_err(|e| export_error(output_path, e))?;
        Ok(())
    }
}
