//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(price, period)
//! - Bands: middle ± mult * stddev(price, period)
//! - %B: (price - lower) / (upper - lower); 0.5 when the bands collapse
//! - Bandwidth: (upper - lower) / middle * 100
//!
//! Uses population stddev (divide by N). Each output is its own instance.
//! Lookback: period - 1.

use super::Indicator;

/// Which output of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Middle,
    PercentB,
    Bandwidth,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    fn with_band(period: usize, multiplier: f64, band: BollingerBand, label: &str) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Middle, "middle")
    }

    pub fn percent_b(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::PercentB, "pct_b")
    }

    pub fn bandwidth(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Bandwidth, "bandwidth")
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let n = prices.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &prices[i + 1 - self.period..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }

            let mean = window.iter().sum::<f64>() / self.period as f64;
            let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>()
                / self.period as f64;
            let half_width = self.multiplier * variance.sqrt();
            let upper = mean + half_width;
            let lower = mean - half_width;

            result[i] = match self.band {
                BollingerBand::Middle => mean,
                BollingerBand::PercentB => {
                    if upper == lower {
                        0.5
                    } else {
                        (prices[i] - lower) / (upper - lower)
                    }
                }
                BollingerBand::Bandwidth => {
                    if mean == 0.0 {
                        f64::NAN
                    } else {
                        (upper - lower) / mean * 100.0
                    }
                }
            };
        }

        result
    }
}
