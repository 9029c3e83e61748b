//! Configuration validation.
//!
//! Rejects out-of-range values before a run starts. Absent keys are fine:
//! they fall back to defaults in [`AppConfig::from_port`](crate::domain::config::AppConfig::from_port).

use crate::domain::config::{duration_from_minutes, AppConfig};
use crate::domain::error::EarnsightError;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;

pub fn validate_app_config(config: &dyn ConfigPort) -> Result<(), EarnsightError> {
    validate_data_config(config)?;
    validate_strategy_config(config)?;
    validate_run_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), EarnsightError> {
    validate_exchange(config)?;
    validate_non_negative_double(config, "data", "market_cap_threshold")?;
    validate_non_negative_int(config, "data", "lookback_years")?;
    validate_non_negative_int(config, "data", "max_tickers")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), EarnsightError> {
    validate_provider(config)?;
    validate_non_negative_int(config, "strategy", "request_budget")?;
    validate_notes_window(config)?;
    Ok(())
}

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), EarnsightError> {
    validate_duration(config)?;
    validate_iterative(config)?;
    Ok(())
}

/// Re-check values that command-line overrides may have replaced after the
/// file was validated.
pub fn validate_overrides(config: &AppConfig) -> Result<(), EarnsightError> {
    check_non_negative("data", "market_cap_threshold", config.data.market_cap_threshold)?;
    if config.data.exchange.trim().is_empty() {
        return Err(invalid("data", "exchange", "exchange must not be blank"));
    }
    Ok(())
}

fn check_non_negative(section: &str, key: &str, value: f64) -> Result<(), EarnsightError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(section, key, format!("{key} must be non-negative")))
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> EarnsightError {
    EarnsightError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_exchange(config: &dyn ConfigPort) -> Result<(), EarnsightError> {
    match config.get_string("data", "exchange") {
        Some(s) if s.trim().is_empty() => Err(invalid("data", "exchange", "exchange must not be blank")),
        _ => Ok(()),
    }
}

fn validate_non_negative_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), EarnsightError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) => check_non_negative(section, key, v),
        Err(_) => Err(invalid(section, key, format!("{key} must be a number"))),
    }
}

fn validate_non_negative_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), EarnsightError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 0 => Ok(()),
        Ok(_) => Err(invalid(section, key, format!("{key} must be non-negative"))),
        Err(_) => Err(invalid(section, key, format!("{key} must be an integer"))),
    }
}

fn validate_duration(config: &dyn ConfigPort) -> Result<(), EarnsightError> {
    let Some(raw) = config.get_string("run", "duration_minutes") else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(minutes) => duration_from_minutes(minutes).map(|_| ()),
        Err(_) => Err(invalid("run", "duration_minutes", "duration_minutes must be a number")),
    }
}

fn validate_provider(config: &dyn ConfigPort) -> Result<(), EarnsightError> {
    match config.get_string("strategy", "provider") {
        Some(raw) => raw
            .parse::<StrategyKind>()
            .map(|_| ())
            .map_err(|reason| invalid("strategy", "provider", reason)),
        None => Ok(()),
    }
}

fn validate_notes_window(config: &dyn ConfigPort) -> Result<(), EarnsightError> {
    let Some(raw) = config.get_string("strategy", "notes_window") else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 1 => Ok(()),
        _ => Err(invalid(
            "strategy",
            "notes_window",
            "notes_window must be at least 1",
        )),
    }
}

fn validate_iterative(config: &dyn ConfigPort) -> Result<(), EarnsightError> {
    let Some(raw) = config.get_string("run", "iterative") else {
        return Ok(());
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "false" | "no" | "0" => Ok(()),
        _ => Err(invalid("run", "iterative", "iterative must be true or false")),
    }
}
