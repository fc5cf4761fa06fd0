//! Average True Range (ATR).
//!
//! With one price per bar, true range is the absolute close-to-close move:
//! TR[t] = |price[t] - price[t-1]|, TR[0] undefined.
//! ATR uses Wilder smoothing (alpha = 1/period) seeded with the mean of the
//! first `period` true ranges.
//! Lookback: period.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        wilder_smooth(&true_range(prices), self.period)
    }
}

/// Close-to-close true range. Index 0 is NaN (no previous price).
pub fn true_range(prices: &[f64]) -> Vec<f64> {
    let n = prices.len();
    let mut tr = vec![f64::NAN; n];
    for i in 1..n {
        tr[i] = (prices[i] - prices[i - 1]).abs();
    }
    tr
}

/// Apply Wilder smoothing to a series. Alpha = 1/period.
///
/// Seed: mean of the first `period` values starting at the first non-NaN
/// entry. A NaN inside the seed window leaves the whole output NaN; a NaN
/// after the seed taints everything from that point on.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    let seed_start = match values.iter().position(|v| !v.is_nan()) {
        Some(s) => s,
        None => return result,
    };
    let seed_end = seed_start + period;
    if seed_end > n {
        return result;
    }

    let seed_window = &values[seed_start..seed_end];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }

    let mut prev = seed_window.iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = prev;

    let alpha = 1.0 / period as f64;
    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn true_range_is_absolute_move() {
        let tr = true_range(&[100.0, 103.0, 101.0]);
        assert!(tr[0].is_nan());
        assert_approx(tr[1], 3.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_seed_and_smoothing() {
        // TR: -, 2, 4, 6, 2  → seed (period 3) at index 3 = 4.0
        // index 4: (1/3)*2 + (2/3)*4 = 3.333...
        let result = Atr::new(3).compute(&[100.0, 102.0, 98.0, 104.0, 102.0]);
        assert!(result[2].is_nan());
        assert_approx(result[3], 4.0, DEFAULT_EPSILON);
        assert_approx(result[4], 10.0 / 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_flat_series_is_zero() {
        assert_eq!(Atr::new(14).last_value(&[50.0; 20]), Some(0.0));
    }

    #[test]
    fn atr_needs_period_plus_one() {
        assert!(Atr::new(14).last_value(&[1.0; 14]).is_none());
        assert!(Atr::new(14).last_value(&[1.0; 15]).is_some());
    }

    #[test]
    fn wilder_smooth_short_input() {
        let result = wilder_smooth(&[1.0, 2.0], 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
