//! Price momentum — percent change from `period` bars ago.
//!
//! momentum[t] = (price[t] - price[t-period]) / price[t-period] * 100
//! The signal engine uses period = window length - 1, i.e. first to last
//! price of the lookback window.
//! Lookback: period.

use super::roc::pct_change;
use super::Indicator;

#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    name: String,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Momentum period must be >= 1");
        Self {
            period,
            name: format!("momentum_{period}"),
        }
    }

    /// Momentum measured from the first to the last price of `prices`.
    pub fn over_window(prices: &[f64]) -> Option<f64> {
        if prices.len() < 2 {
            return None;
        }
        Self::new(prices.len() - 1).last_value(prices)
    }
}

impl Indicator for Momentum {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn momentum_over_window() {
        assert_approx(
            Momentum::over_window(&[100.0, 90.0, 125.0]).unwrap(),
            25.0,
            DEFAULT_EPSILON,
        );
    }

    #[test]
    fn momentum_single_point_is_none() {
        assert!(Momentum::over_window(&[100.0]).is_none());
        assert!(Momentum::over_window(&[]).is_none());
    }

    #[test]
    fn momentum_series() {
        let result = Momentum::new(2).compute(&[100.0, 110.0, 105.0, 115.5]);
        assert!(result[1].is_nan());
        assert_approx(result[2], 5.0, DEFAULT_EPSILON);
        assert_approx(result[3], 5.0, DEFAULT_EPSILON);
    }
}
