//! Williams %R.
//!
//! %R = -100 * (highest - price) / (highest - lowest) over `period` bars.
//! Range [-100, 0]; a flat window gives -50.
//! Lookback: period - 1.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    name: String,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self {
            period,
            name: format!("williams_r_{period}"),
        }
    }
}

impl Indicator for WilliamsR {
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
            let hi = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let lo = window.iter().copied().fold(f64::INFINITY, f64::min);
            result[i] = if hi == lo {
                -50.0
            } else {
                -100.0 * (hi - prices[i]) / (hi - lo)
            };
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn williams_at_high_is_zero() {
        let result = WilliamsR::new(3).compute(&[1.0, 2.0, 3.0]);
        assert_approx(result[2], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn williams_at_low_is_minus_hundred() {
        let result = WilliamsR::new(3).compute(&[3.0, 2.0, 1.0]);
        assert_approx(result[2], -100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn williams_midpoint() {
        let result = WilliamsR::new(3).compute(&[0.0, 10.0, 5.0]);
        assert_approx(result[2], -50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn williams_flat_is_minus_fifty() {
        assert_eq!(WilliamsR::new(14).last_value(&[4.0; 14]), Some(-50.0));
        assert!(WilliamsR::new(14).last_value(&[4.0; 13]).is_none());
    }
}
