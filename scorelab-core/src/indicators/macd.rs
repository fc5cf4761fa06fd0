//! MACD — Moving Average Convergence/Divergence.
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(signal_period) of line,
//! histogram = line - signal. All EMAs are seeded with their first input.
//! Needs at least two prices; the first bar is NaN.

use super::ema::ema_of_series;
use super::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdOutput {
    Line,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdOutput,
    name: String,
}

impl Macd {
    fn with_output(fast: usize, slow: usize, signal: usize, output: MacdOutput) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        let label = match output {
            MacdOutput::Line => "line",
            MacdOutput::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            output,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdOutput::Line)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdOutput::Histogram)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let n = prices.len();
        if n < 2 {
            return vec![f64::NAN; n];
        }

        let fast = ema_of_series(prices, self.fast);
        let slow = ema_of_series(prices, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        let mut result = match self.output {
            MacdOutput::Line => line,
            MacdOutput::Histogram => {
                let signal = ema_of_series(&line, self.signal);
                line.iter().zip(&signal).map(|(l, s)| l - s).collect()
            }
        };
        result[0] = f64::NAN;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn macd_flat_series_is_zero() {
        let hist = Macd::histogram(12, 26, 9).compute(&[50.0; 40]);
        assert!(hist[0].is_nan());
        assert!(hist[1..].iter().all(|v| v.abs() < DEFAULT_EPSILON));
    }

    #[test]
    fn macd_two_points() {
        // fast alpha = 2/13, slow alpha = 2/27, signal alpha = 2/10
        let prices = [100.0, 110.0];
        let fast = 100.0 + 10.0 * 2.0 / 13.0;
        let slow = 100.0 + 10.0 * 2.0 / 27.0;
        let line = fast - slow;
        let signal = 0.2 * line;
        let hist = Macd::histogram(12, 26, 9).compute(&prices);
        assert_approx(hist[1], line - signal, DEFAULT_EPSILON);
        let l = Macd::line(12, 26, 9).compute(&prices);
        assert_approx(l[1], line, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_rising_series_positive_line() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let line = Macd::line(12, 26, 9).compute(&prices);
        assert!(line[29] > 0.0);
    }

    #[test]
    fn macd_single_point_is_nan() {
        assert!(Macd::histogram(12, 26, 9).last_value(&[100.0]).is_none());
    }
}
