//! Earnings-reaction backtest.
//!
//! For every earnings event of a symbol the backtester aligns the event to
//! its bracketing closes, asks the strategy for a direction and records the
//! outcome. Correctness is always derived from the stored closes.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::alignment::{align, POST_WINDOW_DAYS};
use crate::domain::error::EarnsightError;
use crate::domain::event::{EarningsEvent, PriceSeries};
use crate::domain::notes::NotesStore;
use crate::domain::prediction::{
    ActualDirection, Direction, Features, PredictionRecord, EPS_SURPRISE, NOTES,
};
use crate::domain::strategy::PredictionStrategy;
use crate::ports::market_data_port::MarketDataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Years of earnings history to score. Zero disables the cutoff.
    pub lookback_years: u32,
    /// Reference time the lookback is measured from.
    pub as_of: DateTime<Utc>,
}

impl BacktestConfig {
    /// Earliest event time still scored. A lookback reaching past the
    /// representable calendar has no cutoff.
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        if self.lookback_years == 0 {
            return None;
        }
        Duration::try_days(365 * i64::from(self.lookback_years))
            .and_then(|span| self.as_of.checked_sub_signed(span))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub symbol: String,
    pub event_timestamp: DateTime<Utc>,
    pub pre_close: Option<f64>,
    pub post_close: Option<f64>,
    pub predicted: PredictionRecord,
}

impl BacktestResult {
    pub fn actual_direction(&self) -> ActualDirection {
        match (self.pre_close, self.post_close) {
            (Some(pre), Some(post)) if post > pre => ActualDirection::Up,
            (Some(pre), Some(post)) if post < pre => ActualDirection::Down,
            (Some(pre), Some(post)) if post == pre => ActualDirection::Flat,
            _ => ActualDirection::Unknown,
        }
    }

    /// Exact direction match. A flat call is right only on an unchanged close.
    pub fn correct(&self) -> bool {
        self.actual_direction().matches(self.predicted.direction)
    }

    pub fn predicted_direction(&self) -> Direction {
        self.predicted.direction
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub total_predictions: usize,
    pub correct: usize,
    pub accuracy: f64,
}

pub fn summarize(results: &[BacktestResult]) -> Summary {
    let total_predictions = results.len();
    let correct = results.iter().filter(|r| r.correct()).count();
    let accuracy = if total_predictions == 0 {
        0.0
    } else {
        correct as f64 / total_predictions as f64
    };
    Summary {
        total_predictions,
        correct,
        accuracy,
    }
}

pub struct Backtester<'a> {
    source: &'a dyn MarketDataPort,
    strategy: Box<dyn PredictionStrategy>,
    config: BacktestConfig,
    notes_context: Option<String>,
}

impl<'a> Backtester<'a> {
    pub fn new(
        source: &'a dyn MarketDataPort,
        strategy: Box<dyn PredictionStrategy>,
        config: BacktestConfig,
    ) -> Self {
        Self {
            source,
            strategy,
            config,
            notes_context: None,
        }
    }

    pub fn with_notes_context(mut self, context: Option<String>) -> Self {
        self.notes_context = context;
        self
    }

    /// Reload the prediction context from the `window` most recent notes.
    pub fn refresh_notes(&mut self, notes: &NotesStore, window: usize) -> Result<(), EarnsightError> {
        self.notes_context = notes.context(window)?;
        Ok(())
    }

    pub fn notes_context(&self) -> Option<&str> {
        self.notes_context.as_deref()
    }

    pub fn strategy(&self) -> &dyn PredictionStrategy {
        self.strategy.as_ref()
    }

    /// Swap in `strategy`, returning the one it replaces.
    pub fn set_strategy(
        &mut self,
        strategy: Box<dyn PredictionStrategy>,
    ) -> Box<dyn PredictionStrategy> {
        std::mem::replace(&mut self.strategy, strategy)
    }

    pub fn backtest_symbol(&mut self, symbol: &str) -> Result<Vec<BacktestResult>, EarnsightError> {
        let mut events = self.source.earnings_events(symbol)?;
        if let Some(cutoff) = self.config.cutoff() {
            events.retain(|e| e.timestamp >= cutoff);
        }
        if events.is_empty() {
            debug!(symbol, "no earnings events");
            return Ok(Vec::new());
        }

        let series = self.fetch_series(symbol, &events)?;
        let mut results = Vec::with_capacity(events.len());

        for event in &events {
            let closes = align(&series, event.timestamp);
            if !closes.is_complete() {
                debug!(
                    symbol,
                    event = %event.timestamp,
                    pre = ?closes.pre_close,
                    post = ?closes.post_close,
                    "skipping event without a measurable reaction"
                );
                continue;
            }

            let features = self.features_for(event);
            let predicted = self.strategy.predict(symbol, &features);
            results.push(BacktestResult {
                symbol: symbol.to_string(),
                event_timestamp: event.timestamp,
                pre_close: closes.pre_close,
                post_close: closes.post_close,
                predicted,
            });
        }

        Ok(results)
    }

    fn fetch_series(
        &self,
        symbol: &str,
        events: &[EarningsEvent],
    ) -> Result<PriceSeries, EarnsightError> {
        let pad = Duration::days(POST_WINDOW_DAYS);
        let (first, last) = events.iter().fold(
            (events[0].timestamp, events[0].timestamp),
            |(lo, hi), e| (lo.min(e.timestamp), hi.max(e.timestamp)),
        );
        let mut series = self.source.price_series(symbol, first - pad, last + pad)?;
        if !series.is_sorted_by_key(|o| o.timestamp) {
            series.sort_by_key(|o| o.timestamp);
        }
        Ok(series)
    }

    fn features_for(&self, event: &EarningsEvent) -> Features {
        let features = Features::new().with_number(EPS_SURPRISE, event.surprise);
        match &self.notes_context {
            Some(notes) => features.with_text(NOTES, notes.clone()),
            None => features,
        }
    }
}
