//! Market data access port trait.
//!
//! Implementations report "no data" as an empty `Ok` and reserve `Err` for a
//! source that cannot be reached at all.

use crate::domain::error::EarnsightError;
use crate::domain::event::{EarningsEvent, PriceSeries};
use chrono::{DateTime, Utc};

pub trait MarketDataPort {
    /// Symbols listed on `exchange`, in listing order.
    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, EarnsightError>;

    /// Market capitalisation, `None` when the source does not know it.
    fn market_cap(&self, symbol: &str) -> Result<Option<f64>, EarnsightError>;

    fn earnings_events(&self, symbol: &str) -> Result<Vec<EarningsEvent>, EarnsightError>;

    /// Closes with `start <= timestamp <= end`, ascending.
    fn price_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries, EarnsightError>;
}
