//! Aroon — time since the highest and lowest price as a percentage.
//!
//! Aroon Up = 100 * (period - bars_since_highest) / period
//! Aroon Down = 100 * (period - bars_since_lowest) / period
//! Oscillator = Up - Down
//! The window spans period + 1 bars; ties resolve to the most recent bar.
//! Lookback: period.

use super::Indicator;

/// Which output of the Aroon indicator to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AroonBand {
    Up,
    Down,
    Oscillator,
}

#[derive(Debug, Clone)]
pub struct Aroon {
    period: usize,
    band: AroonBand,
    name: String,
}

impl Aroon {
    fn with_band(period: usize, band: AroonBand, label: &str) -> Self {
        assert!(period >= 1, "Aroon period must be >= 1");
        Self {
            period,
            band,
            name: format!("aroon_{label}_{period}"),
        }
    }

    pub fn up(period: usize) -> Self {
        Self::with_band(period, AroonBand::Up, "up")
    }

    pub fn down(period: usize) -> Self {
        Self::with_band(period, AroonBand::Down, "down")
    }

    pub fn oscillator(period: usize) -> Self {
        Self::with_band(period, AroonBand::Oscillator, "osc")
    }
}

impl Indicator for Aroon {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let n = prices.len();
        let mut result = vec![f64::NAN; n];

        if n <= self.period {
            return result;
        }

        let p = self.period as f64;
        for i in self.period..n {
            let window = &prices[i - self.period..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }

            let mut max_val = f64::NEG_INFINITY;
            let mut max_offset = 0;
            let mut min_val = f64::INFINITY;
            let mut min_offset = 0;
            for (j, &price) in window.iter().enumerate() {
                if price >= max_val {
                    max_val = price;
                    max_offset = j;
                }
                if price <= min_val {
                    min_val = price;
                    min_offset = j;
                }
            }

            // offset == period means the extreme is the current bar
            let up = 100.0 * max_offset as f64 / p;
            let down = 100.0 * min_offset as f64 / p;

            result[i] = match self.band {
                AroonBand::Up => up,
                AroonBand::Down => down,
                AroonBand::Oscillator => up - down,
            };
        }

        result
    }
}
