//! Prediction records and the feature map handed to strategies.

use std::collections::BTreeMap;
use std::fmt;

/// Feature key carrying the EPS surprise.
pub const EPS_SURPRISE: &str = "eps_surprise";
/// Feature key carrying recent notes as free text.
pub const NOTES: &str = "notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Flat => "flat",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Realised move after an event. `Unknown` when either close is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActualDirection {
    Up,
    Down,
    Flat,
    Unknown,
}

impl ActualDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActualDirection::Up => "up",
            ActualDirection::Down => "down",
            ActualDirection::Flat => "flat",
            ActualDirection::Unknown => "unknown",
        }
    }

    pub fn matches(&self, predicted: Direction) -> bool {
        matches!(
            (self, predicted),
            (ActualDirection::Up, Direction::Up)
                | (ActualDirection::Down, Direction::Down)
                | (ActualDirection::Flat, Direction::Flat)
        )
    }
}

impl fmt::Display for ActualDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub direction: Direction,
    pub confidence: f64,
    pub rationale: String,
}

impl PredictionRecord {
    /// Build a record, clamping confidence into `[0, 1]`.
    pub fn new(direction: Direction, confidence: f64, rationale: impl Into<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            direction,
            confidence,
            rationale: rationale.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

/// Named inputs to a prediction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    values: BTreeMap<String, FeatureValue>,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_number(mut self, key: &str, value: f64) -> Self {
        self.values.insert(key.to_string(), FeatureValue::Number(value));
        self
    }

    pub fn with_text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), FeatureValue::Text(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.values.get(key)
    }

    /// Numeric view of `key`. Text is parsed; anything unparsable or
    /// non-finite yields `None`.
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = match self.values.get(key)? {
            FeatureValue::Number(n) => *n,
            FeatureValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            FeatureValue::Text(s) => Some(s.as_str()),
            FeatureValue::Number(_) => None,
        }
    }

    /// EPS surprise, coerced to 0.0 when missing or malformed.
    pub fn eps_surprise(&self) -> f64 {
        self.number(EPS_SURPRISE).unwrap_or(0.0)
    }

    /// Notes context, `None` when missing or blank.
    pub fn notes(&self) -> Option<&str> {
        self.text(NOTES).filter(|s| !s.trim().is_empty())
    }
}
