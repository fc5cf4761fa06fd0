//! Stochastic RSI.
//!
//! Stochastic transform of an RSI series:
//! raw[t] = 100 * (rsi[t] - min(rsi, window)) / (max(rsi, window) - min(rsi, window))
//! K = SMA(raw, k_smoothing). A flat RSI window gives raw = 50.
//! Lookback: rsi_period + stoch_period + k_smoothing - 2.

use super::rsi::rsi_of_series;
use super::sma::sma_of_series;
use super::Indicator;

#[derive(Debug, Clone)]
pub struct StochRsi {
    rsi_period: usize,
    stoch_period: usize,
    k_smoothing: usize,
    name: String,
}

impl StochRsi {
    pub fn new(rsi_period: usize, stoch_period: usize, k_smoothing: usize) -> Self {
        assert!(
            rsi_period >= 1 && stoch_period >= 1 && k_smoothing >= 1,
            "StochRSI periods must be >= 1"
        );
        Self {
            rsi_period,
            stoch_period,
            k_smoothing,
            name: format!("stoch_rsi_k_{rsi_period}_{stoch_period}_{k_smoothing}"),
        }
    }
}

impl Indicator for StochRsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.rsi_period + self.stoch_period + self.k_smoothing - 2
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let n = prices.len();
        let rsi = rsi_of_series(prices, self.rsi_period);
        let mut raw = vec![f64::NAN; n];

        if n >= self.stoch_period {
            for i in (self.stoch_period - 1)..n {
                let window = &rsi[i + 1 - self.stoch_period..=i];
                if window.iter().any(|v| v.is_nan()) {
                    continue;
                }
                let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
                raw[i] = if hi == lo {
                    50.0
                } else {
                    100.0 * (rsi[i] - lo) / (hi - lo)
                };
            }
        }

        sma_of_series(&raw, self.k_smoothing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn stoch_rsi_minimum_points() {
        let ind = StochRsi::new(14, 14, 3);
        assert_eq!(ind.lookback(), 29);
        assert!(ind.last_value(&zigzag(29)).is_none());
        assert!(ind.last_value(&zigzag(30)).is_some());
    }

    #[test]
    fn stoch_rsi_bounds() {
        for v in StochRsi::new(14, 14, 3).compute(&zigzag(80)) {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "StochRSI out of bounds: {v}");
            }
        }
    }

    #[test]
    fn stoch_rsi_flat_is_fifty() {
        assert_eq!(StochRsi::new(14, 14, 3).last_value(&[10.0; 40]), Some(50.0));
    }
}
