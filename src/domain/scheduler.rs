//! Time-boxed iterative execution loop.
//!
//! A cycle backtests every ticker once with a freshly built strategy, so the
//! request budget starts full each cycle. It appends one run-log row per
//! ticker and one summary note. In iterative mode cycles repeat until the
//! configured duration has elapsed; the check happens only between cycles,
//! so a started cycle always finishes.

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::backtest::{summarize, BacktestConfig, Backtester};
use crate::domain::config::{AppConfig, RunConfig};
use crate::domain::error::EarnsightError;
use crate::domain::notes::NotesStore;
use crate::domain::run_log::{average_accuracy, format_pct, RunLogEntry};
use crate::domain::strategy::{build_strategy, PredictionStrategy};
use crate::domain::universe::resolve_universe;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::run_log_port::RunLogPort;

pub const EMPTY_UNIVERSE_NOTE: &str =
    "No tickers resolved for this run; skipped backtest cycles.";

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CycleReport {
    pub entries: Vec<RunLogEntry>,
    pub average_accuracy: f64,
    /// Budget left on the cycle's strategy once every ticker is scored.
    pub remaining_budget: u64,
}

impl CycleReport {
    pub fn summary_note(&self) -> String {
        format!(
            "Completed run for {} tickers; average accuracy: {}",
            self.entries.len(),
            format_pct(self.average_accuracy)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No tickers to work on; a diagnostic note was written.
    EmptyUniverse,
    Completed {
        cycles: usize,
        last_cycle: Option<CycleReport>,
    },
}

/// Builds the strategy used for one cycle.
pub type StrategyFactory<'a> = Box<dyn Fn() -> Box<dyn PredictionStrategy> + 'a>;

pub struct Scheduler<'a> {
    run: RunConfig,
    notes_window: usize,
    new_strategy: StrategyFactory<'a>,
    notes: &'a mut NotesStore,
    run_log: &'a mut dyn RunLogPort,
    clock: &'a dyn Clock,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        run: RunConfig,
        notes_window: usize,
        new_strategy: StrategyFactory<'a>,
        notes: &'a mut NotesStore,
        run_log: &'a mut dyn RunLogPort,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            run,
            notes_window,
            new_strategy,
            notes,
            run_log,
            clock,
        }
    }

    /// Drive `backtester` over `tickers` until the run is over.
    pub fn run(
        &mut self,
        backtester: &mut Backtester<'_>,
        tickers: &[String],
    ) -> Result<RunOutcome, EarnsightError> {
        if tickers.is_empty() {
            warn!("empty ticker universe, not starting any cycle");
            self.notes.append([EMPTY_UNIVERSE_NOTE])?;
            return Ok(RunOutcome::EmptyUniverse);
        }

        let start = self.clock.now();
        let mut cycles = 0;
        let mut last_cycle = None;

        loop {
            if self.run.iterative {
                let elapsed = self.clock.now().saturating_sub(start);
                if elapsed >= self.run.duration {
                    info!(cycles, elapsed_secs = elapsed.as_secs_f64(), "run duration reached");
                    break;
                }
            }

            let report = self.run_cycle(backtester, tickers)?;
            cycles += 1;
            info!(
                cycle = cycles,
                tickers = report.entries.len(),
                average_accuracy = report.average_accuracy,
                remaining_budget = report.remaining_budget,
                "cycle complete"
            );
            last_cycle = Some(report);

            if !self.run.iterative {
                break;
            }
        }

        Ok(RunOutcome::Completed { cycles, last_cycle })
    }

    /// One full pass over `tickers`.
    pub fn run_cycle(
        &mut self,
        backtester: &mut Backtester<'_>,
        tickers: &[String],
    ) -> Result<CycleReport, EarnsightError> {
        backtester.set_strategy((self.new_strategy)());
        backtester.refresh_notes(self.notes, self.notes_window)?;

        let mut entries = Vec::with_capacity(tickers.len());
        for symbol in tickers {
            let results = backtester.backtest_symbol(symbol)?;
            let summary = summarize(&results);
            info!(
                %symbol,
                predictions = summary.total_predictions,
                correct = summary.correct,
                accuracy = summary.accuracy,
                "symbol scored"
            );
            entries.push(RunLogEntry::from_summary(Utc::now(), symbol, &summary));
        }

        self.run_log.append(&entries)?;

        let report = CycleReport {
            average_accuracy: average_accuracy(&entries),
            entries,
            remaining_budget: backtester.strategy().remaining_budget(),
        };
        self.notes.append([report.summary_note()])?;
        Ok(report)
    }
}

/// Resolve the universe once, then run the scheduler over it.
///
/// `tickers`, or failing that `config.data.tickers`, overrides universe
/// construction.
pub fn run_backtests(
    config: &AppConfig,
    source: &dyn MarketDataPort,
    notes: &mut NotesStore,
    run_log: &mut dyn RunLogPort,
    clock: &dyn Clock,
    tickers: Option<Vec<String>>,
) -> Result<RunOutcome, EarnsightError> {
    let override_tickers = tickers.or_else(|| config.data.tickers.clone());
    let universe = resolve_universe(override_tickers, source, &config.data)?;

    let bt_config = BacktestConfig {
        lookback_years: config.data.lookback_years,
        as_of: Utc::now(),
    };
    let mut backtester = Backtester::new(source, build_strategy(&config.strategy), bt_config);

    let mut scheduler = Scheduler::new(
        config.run.clone(),
        config.strategy.notes_window,
        Box::new(|| build_strategy(&config.strategy)),
        notes,
        run_log,
        clock,
    );
    scheduler.run(&mut backtester, &universe.tickers)
}
