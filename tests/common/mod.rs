#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use earnsight::domain::config::AppConfig;
use earnsight::domain::error::EarnsightError;
use earnsight::domain::event::{midnight_utc, EarningsEvent, PriceObservation, PriceSeries};
use earnsight::domain::notes::NoteEntry;
use earnsight::domain::run_log::RunLogEntry;
use earnsight::domain::scheduler::Clock;
use earnsight::ports::market_data_port::MarketDataPort;
use earnsight::ports::notes_port::NotesPort;
use earnsight::ports::run_log_port::RunLogPort;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

pub struct MockMarketData {
    pub listing: Vec<String>,
    pub caps: HashMap<String, f64>,
    pub events: HashMap<String, Vec<EarningsEvent>>,
    pub prices: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            listing: Vec::new(),
            caps: HashMap::new(),
            events: HashMap::new(),
            prices: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    /// Listed symbol with a known market cap.
    pub fn with_listing(mut self, symbol: &str, cap: Option<f64>) -> Self {
        self.listing.push(symbol.to_string());
        if let Some(cap) = cap {
            self.caps.insert(symbol.to_string(), cap);
        }
        self
    }

    pub fn with_event(mut self, symbol: &str, date: &str, surprise: f64) -> Self {
        self.events
            .entry(symbol.to_string())
            .or_default()
            .push(make_event(symbol, date, surprise));
        self
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[(&str, f64)]) -> Self {
        let series = self.prices.entry(symbol.to_string()).or_default();
        series.extend(closes.iter().map(|(d, c)| PriceObservation::on_date(day(d), *c)));
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn check(&self, symbol: &str) -> Result<(), EarnsightError> {
        match self.errors.get(symbol) {
            Some(reason) => Err(EarnsightError::data(reason.clone())),
            None => Ok(()),
        }
    }
}

impl MarketDataPort for MockMarketData {
    fn list_symbols(&self, _exchange: &str) -> Result<Vec<String>, EarnsightError> {
        Ok(self.listing.clone())
    }

    fn market_cap(&self, symbol: &str) -> Result<Option<f64>, EarnsightError> {
        self.check(symbol)?;
        Ok(self.caps.get(symbol).copied())
    }

    fn earnings_events(&self, symbol: &str) -> Result<Vec<EarningsEvent>, EarnsightError> {
        self.check(symbol)?;
        Ok(self.events.get(symbol).cloned().unwrap_or_default())
    }

    fn price_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries, EarnsightError> {
        self.check(symbol)?;
        Ok(self
            .prices
            .get(symbol)
            .map(|s| {
                s.iter()
                    .filter(|o| o.timestamp >= start && o.timestamp <= end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Notes sink whose contents stay visible to the test after boxing.
#[derive(Clone, Default)]
pub struct SharedNotes(pub Rc<RefCell<Vec<NoteEntry>>>);

impl SharedNotes {
    pub fn texts(&self) -> Vec<String> {
        self.0.borrow().iter().map(|e| e.text.clone()).collect()
    }
}

impl NotesPort for SharedNotes {
    fn load(&self) -> Result<Vec<NoteEntry>, EarnsightError> {
        Ok(self.0.borrow().clone())
    }

    fn append(&mut self, entries: &[NoteEntry]) -> Result<(), EarnsightError> {
        self.0.borrow_mut().extend_from_slice(entries);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRunLog {
    pub rows: Vec<RunLogEntry>,
    pub appends: usize,
}

impl RunLogPort for MemoryRunLog {
    fn append(&mut self, entries: &[RunLogEntry]) -> Result<(), EarnsightError> {
        self.rows.extend_from_slice(entries);
        self.appends += 1;
        Ok(())
    }
}

/// Advances by `step` on every read.
pub struct StepClock {
    pub step: Duration,
    pub reads: Cell<u32>,
}

impl StepClock {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            reads: Cell::new(0),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> Duration {
        let n = self.reads.get();
        self.reads.set(n + 1);
        self.step * n
    }
}

pub fn day(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
}

pub fn at(date: &str) -> DateTime<Utc> {
    midnight_utc(day(date))
}

pub fn make_event(symbol: &str, date: &str, surprise: f64) -> EarningsEvent {
    EarningsEvent {
        symbol: symbol.to_string(),
        timestamp: at(date),
        surprise,
    }
}

/// Defaults with the lookback cutoff disabled so fixed fixture dates stay in range.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.data.lookback_years = 0;
    config.data.market_cap_threshold = 1_000.0;
    config
}

pub fn tickers(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}
