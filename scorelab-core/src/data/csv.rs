//! CSV price provider.
//!
//! Reads `<TOKEN>_<interval>.csv` (e.g. `WETH_1h.csv`) or, failing that,
//! `<TOKEN>.csv` from a directory. Files have a `timestamp,price` header;
//! timestamps are RFC 3339 or plain `YYYY-MM-DD` (midnight UTC).

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::provider::{DataError, PriceProvider};
use crate::config::BarInterval;
use crate::domain::{validate_series, PriceBar};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    price: f64,
}

#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, token: &str, interval: BarInterval) -> Option<PathBuf> {
        [
            self.dir.join(format!("{token}_{}.csv", interval.as_str())),
            self.dir.join(format!("{token}.csv")),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }
}

/// Parse an RFC 3339 timestamp or a bare date.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl PriceProvider for CsvPriceProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn get_prices(
        &self,
        token: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: BarInterval,
    ) -> Result<Vec<PriceBar>, DataError> {
        let path = self
            .path_for(token, interval)
            .ok_or_else(|| DataError::TokenNotFound {
                token: token.to_string(),
                path: self.dir.join(format!("{token}.csv")),
            })?;

        let mut reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .from_path(&path)?;

        let mut bars = Vec::new();
        for (row, record) in reader.deserialize::<CsvRow>().enumerate() {
            let record = record?;
            let timestamp =
                parse_timestamp(&record.timestamp).ok_or_else(|| DataError::BadTimestamp {
                    token: token.to_string(),
                    row: row + 1,
                    value: record.timestamp.clone(),
                })?;
            let date = timestamp.date_naive();
            if date < start || date > end {
                continue;
            }
            bars.push(PriceBar::new(timestamp, record.price));
        }

        validate_series(&bars).map_err(|source| DataError::InvalidSeries {
            token: token.to_string(),
            source,
        })?;
        Ok(bars)
    }
}
