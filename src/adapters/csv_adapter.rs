//! Offline CSV sample store.
//!
//! Layout of the base directory:
//!
//! - `universe.csv`: `symbol,exchange,market_cap`
//! - `<SYMBOL>_earnings.csv`: `date,surprise`
//! - `<SYMBOL>_prices.csv`: `date,close`
//!
//! A missing per-symbol file means "no data". A missing base directory means
//! the source is unavailable.

use crate::domain::error::EarnsightError;
use crate::domain::event::{midnight_utc, EarningsEvent, PriceObservation, PriceSeries};
use crate::ports::market_data_port::MarketDataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

pub const UNIVERSE_FILE: &str = "universe.csv";

/// `(symbol, exchange, market_cap)` as listed in the universe file.
type UniverseRow = (String, String, Option<f64>);

pub struct CsvAdapter {
    base_path: PathBuf,
    universe: OnceCell<Vec<UniverseRow>>,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            universe: OnceCell::new(),
        }
    }

    fn earnings_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}_earnings.csv", symbol))
    }

    fn prices_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}_prices.csv", symbol))
    }

    fn ensure_base(&self) -> Result<(), EarnsightError> {
        if self.base_path.is_dir() {
            Ok(())
        } else {
            Err(EarnsightError::data(format!(
                "sample data directory {} not found",
                self.base_path.display()
            )))
        }
    }

    /// Records of `path`, or `None` if the file does not exist.
    fn read_records(&self, path: &Path) -> Result<Option<Vec<csv::StringRecord>>, EarnsightError> {
        self.ensure_base()?;
        if !path.exists() {
            return Ok(None);
        }
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)
            .map_err(|e| EarnsightError::data(format!("failed to read {}: {}", path.display(), e)))?;

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| {
                EarnsightError::data(format!("CSV parse error in {}: {}", path.display(), e))
            })?;
            records.push(record);
        }
        Ok(Some(records))
    }

    /// Universe rows, read from disk on first use only.
    fn universe_rows(&self) -> Result<&[UniverseRow], EarnsightError> {
        if let Some(rows) = self.universe.get() {
            return Ok(rows.as_slice());
        }
        let rows = self.read_universe()?;
        Ok(self.universe.get_or_init(|| rows).as_slice())
    }

    fn read_universe(&self) -> Result<Vec<UniverseRow>, EarnsightError> {
        let path = self.base_path.join(UNIVERSE_FILE);
        let records = self.read_records(&path)?.unwrap_or_default();
        Ok(records
            .iter()
            .filter_map(|record| {
                let symbol = record.get(0)?.to_uppercase();
                if symbol.is_empty() {
                    return None;
                }
                let exchange = record.get(1).unwrap_or("").to_uppercase();
                let cap = record.get(2).and_then(|s| s.parse::<f64>().ok());
                Some((symbol, exchange, cap))
            })
            .collect())
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or a bare `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(midnight_utc)
}

fn required_timestamp(record: &csv::StringRecord, path: &Path) -> Result<DateTime<Utc>, EarnsightError> {
    let raw = record.get(0).ok_or_else(|| {
        EarnsightError::data(format!("missing date column in {}", path.display()))
    })?;
    parse_timestamp(raw)
        .ok_or_else(|| EarnsightError::data(format!("invalid date '{}' in {}", raw, path.display())))
}

impl MarketDataPort for CsvAdapter {
    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, EarnsightError> {
        let exchange = exchange.to_uppercase();
        Ok(self
            .universe_rows()?
            .iter()
            .filter(|(_, ex, _)| *ex == exchange)
            .map(|(symbol, _, _)| symbol.clone())
            .collect())
    }

    fn market_cap(&self, symbol: &str) -> Result<Option<f64>, EarnsightError> {
        let symbol = symbol.to_uppercase();
        Ok(self
            .universe_rows()?
            .iter()
            .find(|(s, _, _)| *s == symbol)
            .and_then(|(_, _, cap)| *cap))
    }

    fn earnings_events(&self, symbol: &str) -> Result<Vec<EarningsEvent>, EarnsightError> {
        let path = self.earnings_path(symbol);
        let Some(records) = self.read_records(&path)? else {
            return Ok(Vec::new());
        };

        let mut events = Vec::with_capacity(records.len());
        for record in &records {
            let timestamp = required_timestamp(record, &path)?;
            // Malformed surprise cells become 0.0 so one bad row does not
            // sink the whole symbol.
            let surprise = record
                .get(1)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|s| s.is_finite())
                .unwrap_or(0.0);
            events.push(EarningsEvent {
                symbol: symbol.to_string(),
                timestamp,
                surprise,
            });
        }
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    fn price_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries, EarnsightError> {
        let path = self.prices_path(symbol);
        let Some(records) = self.read_records(&path)? else {
            return Ok(Vec::new());
        };

        let mut series = Vec::with_capacity(records.len());
        for record in &records {
            let timestamp = required_timestamp(record, &path)?;
            if timestamp < start || timestamp > end {
                continue;
            }
            let close: f64 = record
                .get(1)
                .ok_or_else(|| {
                    EarnsightError::data(format!("missing close column in {}", path.display()))
                })?
                .parse()
                .map_err(|e| EarnsightError::data(format!("invalid close value: {}", e)))?;
            series.push(PriceObservation { timestamp, close });
        }
        series.sort_by_key(|o| o.timestamp);
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join(UNIVERSE_FILE),
            "symbol,exchange,market_cap\n\
             aapl,NASDAQ,3000000000000\n\
             TINY,NASDAQ,5000000\n\
             MYST,NASDAQ,\n\
             IBM,NYSE,150000000000\n",
        )
        .unwrap();
        fs::write(
            path.join("AAPL_earnings.csv"),
            "date,surprise\n\
             2024-05-02,0.12\n\
             2024-02-01,n/a\n",
        )
        .unwrap();
        fs::write(
            path.join("AAPL_prices.csv"),
            "date,close\n\
             2024-02-02,186.0\n\
             2024-02-01,185.0\n\
             2024-05-02,173.0\n\
             2024-05-03,183.4\n",
        )
        .unwrap();

        (dir, path)
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        midnight_utc(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn list_symbols_filters_by_exchange() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_symbols("nasdaq").unwrap(), vec!["AAPL", "TINY", "MYST"]);
        assert_eq!(adapter.list_symbols("NYSE").unwrap(), vec!["IBM"]);
    }

    #[test]
    fn market_cap_lookup() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.market_cap("AAPL").unwrap(), Some(3e12));
        assert_eq!(adapter.market_cap("MYST").unwrap(), None);
        assert_eq!(adapter.market_cap("NOPE").unwrap(), None);
    }

    #[test]
    fn universe_file_is_read_once() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path.clone());
        assert_eq!(adapter.market_cap("AAPL").unwrap(), Some(3e12));

        fs::remove_file(path.join(UNIVERSE_FILE)).unwrap();
        assert_eq!(adapter.market_cap("IBM").unwrap(), Some(1.5e11));
        assert_eq!(adapter.list_symbols("NYSE").unwrap(), vec!["IBM"]);
    }

    #[test]
    fn earnings_are_sorted_and_bad_surprise_is_zero() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let events = adapter.earnings_events("AAPL").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp, ts(2024, 2, 1));
        assert_eq!(events[0].surprise, 0.0);
        assert_eq!(events[1].surprise, 0.12);
    }

    #[test]
    fn price_series_is_windowed_and_sorted() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let series = adapter
            .price_series("AAPL", ts(2024, 1, 30), ts(2024, 2, 3))
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].close, 185.0);
        assert_eq!(series[1].close, 186.0);
    }

    #[test]
    fn missing_symbol_files_mean_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.earnings_events("IBM").unwrap().is_empty());
        assert!(adapter
            .price_series("IBM", ts(2024, 1, 1), ts(2024, 12, 31))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/earnsight/sample"));
        assert!(matches!(
            adapter.earnings_events("AAPL"),
            Err(EarnsightError::Data { .. })
        ));
    }

    #[test]
    fn invalid_date_is_an_error() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("BAD_earnings.csv"), "date,surprise\n02/01/2024,0.1\n").unwrap();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.earnings_events("BAD").is_err());
    }

    #[test]
    fn parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-02-01"), Some(ts(2024, 2, 1)));
        assert_eq!(
            parse_timestamp("2024-02-01T21:30:00Z").unwrap().to_rfc3339(),
            "2024-02-01T21:30:00+00:00"
        );
        assert_eq!(
            parse_timestamp("2024-02-01 16:00:00").unwrap(),
            ts(2024, 2, 1) + chrono::Duration::hours(16)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
