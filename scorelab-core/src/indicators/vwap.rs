//! Anchored VWAP over price-only data.
//!
//! Without volume every bar carries unit weight, so the anchored VWAP is the
//! running mean of prices from the first bar of the series.
//! Deviation output: (price - vwap) / vwap * 100.
//! Lookback: 0.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Vwap {
    name: String,
}

impl Vwap {
    pub fn deviation() -> Self {
        Self {
            name: "vwap_deviation_pct".to_string(),
        }
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let mut sum = 0.0;
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                sum += p;
                let vwap = sum / (i + 1) as f64;
                if vwap != 0.0 {
                    (p - vwap) / vwap * 100.0
                } else {
                    f64::NAN
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn vwap_deviation() {
        let result = Vwap::deviation().compute(&[10.0, 20.0, 30.0]);
        assert_approx(result[0], 0.0, DEFAULT_EPSILON);
        // running means 10, 15, 20
        assert_approx(result[1], (20.0 - 15.0) / 15.0 * 100.0, DEFAULT_EPSILON);
        assert_approx(result[2], 50.0, DEFAULT_EPSILON);
    }
}
