//! Historical volatility — annualized standard deviation of log returns.
//!
//! vol[t] = stdev(ln(p[j] / p[j-1])) * sqrt(365) * 100, over the last
//! `period` returns ending at t (fewer while history is shorter).
//! Sample standard deviation; needs at least two returns.
//! Lookback: 2.

use super::Indicator;

const ANNUALIZATION_DAYS: f64 = 365.0;

#[derive(Debug, Clone)]
pub struct HistVolatility {
    period: usize,
    name: String,
}

impl HistVolatility {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "volatility period must be >= 2");
        Self {
            period,
            name: format!("hist_vol_{period}"),
        }
    }
}

impl Indicator for HistVolatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let n = prices.len();
        let mut result = vec![f64::NAN; n];

        let log_returns: Vec<f64> = (0..n)
            .map(|i| {
                if i == 0 || prices[i] <= 0.0 || prices[i - 1] <= 0.0 {
                    f64::NAN
                } else {
                    (prices[i] / prices[i - 1]).ln()
                }
            })
            .collect();

        for i in 2..n {
            let start = (i + 1).saturating_sub(self.period).max(1);
            let window = &log_returns[start..=i];
            if window.len() < 2 || window.iter().any(|v| v.is_nan()) {
                continue;
            }
            let mean = window.iter().sum::<f64>() / window.len() as f64;
            let var = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
                / (window.len() - 1) as f64;
            result[i] = var.sqrt() * ANNUALIZATION_DAYS.sqrt() * 100.0;
        }

        result
    }
}
