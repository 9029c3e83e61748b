//! Per-symbol run ledger rows.

use chrono::{DateTime, Utc};

use crate::domain::backtest::Summary;

#[derive(Debug, Clone, PartialEq)]
pub struct RunLogEntry {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub accuracy: f64,
    pub notes: String,
}

impl RunLogEntry {
    pub fn from_summary(timestamp: DateTime<Utc>, symbol: &str, summary: &Summary) -> Self {
        Self {
            timestamp,
            symbol: symbol.to_string(),
            accuracy: summary.accuracy,
            notes: format!(
                "Predictions={} accuracy={}",
                summary.total_predictions,
                format_pct(summary.accuracy)
            ),
        }
    }
}

/// Mean of per-symbol accuracies; 0.0 for no entries.
pub fn average_accuracy(entries: &[RunLogEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(|e| e.accuracy).sum::<f64>() / entries.len() as f64
}

/// `0.256` → `"25.60%"`.
pub fn format_pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}
