//! Earnings events and close-price observations.

use chrono::{DateTime, NaiveDate, Utc};

/// One earnings release and the size of its surprise.
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsEvent {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub surprise: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceObservation {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PriceObservation {
    /// Observation stamped at midnight UTC of `date`.
    pub fn on_date(date: NaiveDate, close: f64) -> Self {
        Self {
            timestamp: midnight_utc(date),
            close,
        }
    }
}

/// Close observations for one symbol, ascending by timestamp.
pub type PriceSeries = Vec<PriceObservation>;

pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn on_date_stamps_midnight() {
        let obs = PriceObservation::on_date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), 101.5);
        assert_eq!(obs.timestamp.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(obs.timestamp.hour(), 0);
        assert_eq!(obs.close, 101.5);
    }
}
