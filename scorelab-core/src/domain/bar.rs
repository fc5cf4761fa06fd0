//! PriceBar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One sampled price observation for a single token.
///
/// Series are price-only: indicators that classically need high/low treat
/// the bar as high = low = price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("timestamps not strictly increasing at index {index}")]
    NotIncreasing { index: usize },
    #[error("non-positive or non-finite price {price} at index {index}")]
    InvalidPrice { index: usize, price: f64 },
}

impl PriceBar {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Returns true if the price is finite and strictly positive.
    pub fn is_sane(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Check that a series has strictly increasing timestamps and sane prices.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), BarError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(BarError::InvalidPrice {
                index,
                price: bar.price,
            });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(BarError::NotIncreasing { index });
        }
    }
    Ok(())
}

/// Extract the price column of a series.
pub fn prices(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.price).collect()
}
