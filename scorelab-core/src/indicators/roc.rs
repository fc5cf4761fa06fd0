//! Rate of Change (ROC).
//!
//! Percentage price change over N bars.
//! ROC[t] = (price[t] - price[t-period]) / price[t-period] * 100
//! Lookback: period.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
    name: String,
}

impl Roc {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ROC period must be >= 1");
        Self {
            period,
            name: format!("roc_{period}"),
        }
    }
}

impl Indicator for Roc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        pct_change(prices, self.period)
    }
}

/// Percent change over `period` bars; NaN on zero or NaN reference prices.
pub(crate) fn pct_change(prices: &[f64], period: usize) -> Vec<f64> {
    let n = prices.len();
    let mut result = vec![f64::NAN; n];
    for i in period..n {
        let prev = prices[i - period];
        let curr = prices[i];
        if prev.is_nan() || curr.is_nan() || prev == 0.0 {
            continue;
        }
        result[i] = (curr - prev) / prev * 100.0;
    }
    result
}
