//! Price provider trait and structured data errors.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::config::BarInterval;
use crate::domain::{BarError, PriceBar};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("no price data for token '{token}' at {path}")]
    TokenNotFound { token: String, path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("{token}: bad timestamp '{value}' on row {row}")]
    BadTimestamp {
        token: String,
        row: usize,
        value: String,
    },

    #[error("{token}: {source}")]
    InvalidSeries {
        token: String,
        #[source]
        source: BarError,
    },
}

/// Source of historical price series.
///
/// Implementations return bars with strictly increasing timestamps inside
/// `[start, end]` (inclusive, by UTC date).
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn get_prices(
        &self,
        token: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: BarInterval,
    ) -> Result<Vec<PriceBar>, DataError>;
}

/// Fetch every token in `tokens`, keyed by token.
pub fn load_series<'a>(
    provider: &dyn PriceProvider,
    tokens: impl IntoIterator<Item = &'a str>,
    start: NaiveDate,
    end: NaiveDate,
    interval: BarInterval,
) -> Result<BTreeMap<String, Vec<PriceBar>>, DataError> {
    let mut series = BTreeMap::new();
    for token in tokens {
        if series.contains_key(token) {
            continue;
        }
        let bars = provider.get_prices(token, start, end, interval)?;
        debug!(provider = provider.name(), token, bars = bars.len(), "series loaded");
        series.insert(token.to_string(), bars);
    }
    Ok(series)
}
