//! Ticker universe for a run.
//!
//! The ticker set is either given explicitly or built from the exchange
//! listing, truncated to `max_tickers` and filtered by market cap. It is
//! resolved once per run.

use crate::domain::config::DataConfig;
use crate::domain::error::EarnsightError;
use crate::ports::market_data_port::MarketDataPort;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub tickers: Vec<String>,
    pub exchange: String,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Parse a comma-separated ticker override. Tickers are upper-cased.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// Listing → `max_tickers` truncation → market-cap filter.
///
/// Symbols with an unknown market cap are dropped. Source failures propagate.
pub fn build_universe(
    source: &dyn MarketDataPort,
    config: &DataConfig,
) -> Result<Universe, EarnsightError> {
    let mut listed: Vec<String> = source
        .list_symbols(&config.exchange)?
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();
    if let Some(max) = config.max_tickers {
        listed.truncate(max);
    }

    let mut tickers = Vec::with_capacity(listed.len());
    for symbol in listed {
        match source.market_cap(&symbol)? {
            Some(cap) if cap >= config.market_cap_threshold => tickers.push(symbol),
            Some(cap) => debug!(%symbol, cap, "below market cap threshold"),
            None => debug!(%symbol, "market cap unknown"),
        }
    }

    info!(
        exchange = %config.exchange,
        tickers = tickers.len(),
        threshold = config.market_cap_threshold,
        "built ticker universe"
    );

    Ok(Universe {
        tickers,
        exchange: config.exchange.clone(),
    })
}

/// Use `override_tickers` when given, otherwise build from the listing.
pub fn resolve_universe(
    override_tickers: Option<Vec<String>>,
    source: &dyn MarketDataPort,
    config: &DataConfig,
) -> Result<Universe, EarnsightError> {
    match override_tickers {
        Some(tickers) => Ok(Universe {
            tickers,
            exchange: config.exchange.clone(),
        }),
        None => build_universe(source, config),
    }
}
