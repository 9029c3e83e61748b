//! Typed run configuration.
//!
//! There is no process-wide default instance: entry points build an
//! [`AppConfig`] (from an INI file through [`ConfigPort`], or by hand) and
//! pass it down explicitly.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::error::EarnsightError;
use crate::domain::strategy::{StrategyConfig, StrategyKind};
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub exchange: String,
    pub market_cap_threshold: f64,
    pub lookback_years: u32,
    pub max_tickers: Option<usize>,
    pub sample_data_dir: PathBuf,
    /// Fixed ticker set; skips listing and market-cap filtering when set.
    pub tickers: Option<Vec<String>>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            exchange: "NASDAQ".to_string(),
            market_cap_threshold: 1_000_000_000.0,
            lookback_years: 2,
            max_tickers: None,
            sample_data_dir: PathBuf::from("sample_data"),
            tickers: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub duration: Duration,
    pub iterative: bool,
    pub notes_path: PathBuf,
    pub log_path: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(30 * 60),
            iterative: true,
            notes_path: PathBuf::from("notes/learning_notes.txt"),
            log_path: PathBuf::from("notes/run_log.csv"),
        }
    }
}

/// `[run] duration_minutes` as a [`Duration`]. Negative, non-finite and
/// unrepresentably large values are rejected.
pub fn duration_from_minutes(minutes: f64) -> Result<Duration, EarnsightError> {
    let invalid = |reason: String| EarnsightError::ConfigInvalid {
        section: "run".into(),
        key: "duration_minutes".into(),
        reason,
    };
    if minutes.is_nan() || minutes < 0.0 {
        return Err(invalid(format!("duration_minutes must be non-negative, got {minutes}")));
    }
    Duration::try_from_secs_f64(minutes * 60.0)
        .map_err(|e| invalid(format!("duration_minutes {minutes} is out of range: {e}")))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub strategy: StrategyConfig,
    pub run: RunConfig,
}

impl AppConfig {
    /// Read every section, falling back to defaults for absent keys.
    ///
    /// Call [`validate_app_config`](crate::domain::config_validation::validate_app_config)
    /// first to reject out-of-range values.
    pub fn from_port(port: &dyn ConfigPort) -> Result<Self, EarnsightError> {
        let data_defaults = DataConfig::default();
        let strategy_defaults = StrategyConfig::default();
        let run_defaults = RunConfig::default();

        let max_tickers = match port.get_int("data", "max_tickers", 0) {
            n if n > 0 => Some(n as usize),
            _ => None,
        };

        let data = DataConfig {
            exchange: port
                .get_string("data", "exchange")
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .unwrap_or(data_defaults.exchange),
            market_cap_threshold: port.get_double(
                "data",
                "market_cap_threshold",
                data_defaults.market_cap_threshold,
            ),
            lookback_years: port
                .get_int("data", "lookback_years", i64::from(data_defaults.lookback_years))
                .max(0) as u32,
            max_tickers,
            sample_data_dir: port
                .get_string("data", "sample_data_dir")
                .map(PathBuf::from)
                .unwrap_or(data_defaults.sample_data_dir),
            tickers: Some(port.get_list("data", "tickers"))
                .filter(|t| !t.is_empty())
                .map(|t| t.into_iter().map(|s| s.to_uppercase()).collect()),
        };

        let kind = match port.get_string("strategy", "provider") {
            Some(raw) => raw
                .parse::<StrategyKind>()
                .map_err(|reason| EarnsightError::ConfigInvalid {
                    section: "strategy".into(),
                    key: "provider".into(),
                    reason,
                })?,
            None => strategy_defaults.kind,
        };
        let strategy = StrategyConfig {
            kind,
            request_budget: port
                .get_int("strategy", "request_budget", strategy_defaults.request_budget as i64)
                .max(0) as u64,
            notes_window: port
                .get_int("strategy", "notes_window", strategy_defaults.notes_window as i64)
                .max(0) as usize,
        };

        let minutes = port.get_double(
            "run",
            "duration_minutes",
            run_defaults.duration.as_secs_f64() / 60.0,
        );
        let run = RunConfig {
            duration: duration_from_minutes(minutes)?,
            iterative: port.get_bool("run", "iterative", run_defaults.iterative),
            notes_path: port
                .get_string("run", "notes_path")
                .map(PathBuf::from)
                .unwrap_or(run_defaults.notes_path),
            log_path: port
                .get_string("run", "log_path")
                .map(PathBuf::from)
                .unwrap_or(run_defaults.log_path),
        };

        Ok(AppConfig {
            data,
            strategy,
            run,
        })
    }
}
