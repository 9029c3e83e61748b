//! Prediction strategies.
//!
//! A strategy turns a symbol and its [`Features`] into a
//! [`PredictionRecord`]. Concrete strategies are picked by
//! [`StrategyKind`] when the run is configured; callers only ever see the
//! [`PredictionStrategy`] trait.

use std::fmt;
use std::str::FromStr;

use crate::domain::prediction::{Direction, Features, PredictionRecord};

/// Budget units charged per rationale clause.
pub const UNITS_PER_CLAUSE: u64 = 50;
pub const MAX_CONFIDENCE: f64 = 0.95;
pub const FLAT_CONFIDENCE: f64 = 0.4;

pub trait PredictionStrategy {
    fn predict(&mut self, symbol: &str, features: &Features) -> PredictionRecord;

    /// Units left in the consumption budget. Informational only.
    fn remaining_budget(&self) -> u64;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Heuristic,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" | "local" => Ok(StrategyKind::Heuristic),
            other => Err(format!("unknown strategy provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub request_budget: u64,
    /// How many recent notes feed the prediction context.
    pub notes_window: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            kind: StrategyKind::Heuristic,
            request_budget: 1000,
            notes_window: 5,
        }
    }
}

pub fn build_strategy(config: &StrategyConfig) -> Box<dyn PredictionStrategy> {
    match config.kind {
        StrategyKind::Heuristic => Box::new(HeuristicStrategy::new(config.request_budget)),
    }
}

/// Deterministic stand-in for a language-model call: the sign of the EPS
/// surprise sets the direction and its magnitude the confidence.
#[derive(Debug, Clone)]
pub struct HeuristicStrategy {
    total_budget: u64,
    used_units: u64,
}

impl HeuristicStrategy {
    pub fn new(total_budget: u64) -> Self {
        Self {
            total_budget,
            used_units: 0,
        }
    }

    pub fn used_units(&self) -> u64 {
        self.used_units
    }
}

impl PredictionStrategy for HeuristicStrategy {
    fn predict(&mut self, _symbol: &str, features: &Features) -> PredictionRecord {
        let surprise = features.eps_surprise();
        let mut clauses: Vec<String> = Vec::with_capacity(2);

        let (direction, confidence) = if surprise > 0.0 {
            clauses.push("Positive EPS surprise suggests bullish move.".to_string());
            (Direction::Up, (0.5 + surprise).min(MAX_CONFIDENCE))
        } else if surprise < 0.0 {
            clauses.push("Negative EPS surprise suggests bearish move.".to_string());
            (Direction::Down, (0.5 + surprise.abs()).min(MAX_CONFIDENCE))
        } else {
            clauses.push("No surprise detected; expecting muted reaction.".to_string());
            (Direction::Flat, FLAT_CONFIDENCE)
        };

        if let Some(notes) = features.notes() {
            clauses.push(format!("Incorporated notes: {notes}"));
        }

        self.used_units = self
            .used_units
            .saturating_add(clauses.len() as u64 * UNITS_PER_CLAUSE);

        PredictionRecord::new(direction, confidence, clauses.join(" "))
    }

    fn remaining_budget(&self) -> u64 {
        self.total_budget.saturating_sub(self.used_units)
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::{EPS_SURPRISE, NOTES};
    use approx::assert_relative_eq;

    fn surprise(s: f64) -> Features {
        Features::new().with_number(EPS_SURPRISE, s)
    }

    #[test]
    fn positive_surprise_predicts_up() {
        let mut strategy = HeuristicStrategy::new(1000);
        let record = strategy.predict("AAPL", &surprise(0.3));
        assert_eq!(record.direction, Direction::Up);
        assert_relative_eq!(record.confidence, 0.8);
        assert!(record.rationale.contains("bullish"));
    }

    #[test]
    fn negative_surprise_predicts_down() {
        let mut strategy = HeuristicStrategy::new(1000);
        let record = strategy.predict("AAPL", &surprise(-0.2));
        assert_eq!(record.direction, Direction::Down);
        assert_relative_eq!(record.confidence, 0.7);
        assert!(record.rationale.contains("bearish"));
    }

    #[test]
    fn confidence_caps_at_ninety_five() {
        let mut strategy = HeuristicStrategy::new(1000);
        assert_relative_eq!(strategy.predict("X", &surprise(3.0)).confidence, 0.95);
        assert_relative_eq!(strategy.predict("X", &surprise(-3.0)).confidence, 0.95);
    }

    #[test]
    fn zero_surprise_without_notes_is_single_clause_flat() {
        let mut strategy = HeuristicStrategy::new(1000);
        let record = strategy.predict("MSFT", &surprise(0.0));
        assert_eq!(record.direction, Direction::Flat);
        assert_relative_eq!(record.confidence, 0.4);
        assert_eq!(record.rationale, "No surprise detected; expecting muted reaction.");
        assert_eq!(strategy.used_units(), UNITS_PER_CLAUSE);
    }

    #[test]
    fn notes_add_a_clause_and_cost_budget() {
        let mut strategy = HeuristicStrategy::new(1000);
        let features = surprise(0.1).with_text(NOTES, "guidance raised");
        let record = strategy.predict("MSFT", &features);
        assert!(record.rationale.ends_with("Incorporated notes: guidance raised"));
        assert_eq!(strategy.used_units(), 2 * UNITS_PER_CLAUSE);
        assert_eq!(strategy.remaining_budget(), 900);
    }

    #[test]
    fn budget_floors_at_zero_and_never_blocks() {
        let mut strategy = HeuristicStrategy::new(60);
        strategy.predict("A", &surprise(0.1));
        strategy.predict("A", &surprise(0.1));
        assert_eq!(strategy.remaining_budget(), 0);
        let record = strategy.predict("A", &surprise(0.1));
        assert_eq!(record.direction, Direction::Up);
        assert_eq!(strategy.used_units(), 150);
    }

    #[test]
    fn missing_surprise_is_treated_as_zero() {
        let mut strategy = HeuristicStrategy::new(1000);
        let record = strategy.predict("A", &Features::new());
        assert_eq!(record.direction, Direction::Flat);
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Heuristic".parse::<StrategyKind>(), Ok(StrategyKind::Heuristic));
        assert!("gpt".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn factory_builds_configured_strategy() {
        let strategy = build_strategy(&StrategyConfig {
            request_budget: 250,
            ..StrategyConfig::default()
        });
        assert_eq!(strategy.name(), "heuristic");
        assert_eq!(strategy.remaining_budget(), 250);
    }
}
