//! ADX — Average Directional Index (Wilder), with +DI and -DI.
//!
//! Steps:
//! 1. +DM = max(Δprice, 0), -DM = max(-Δprice, 0) (close-to-close)
//! 2. Wilder-smooth +DM, -DM and TR over `period`
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), same for -DI
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! A flat window has zero true range: both DIs and DX are 0.
//! Lookback: period for DI, 2 * period - 1 for ADX.

use super::atr::{true_range, wilder_smooth};
use super::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdxOutput {
    Adx,
    PlusDi,
    MinusDi,
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    output: AdxOutput,
    name: String,
}

impl Adx {
    fn with_output(period: usize, output: AdxOutput, label: &str) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            output,
            name: format!("{label}_{period}"),
        }
    }

    pub fn new(period: usize) -> Self {
        Self::with_output(period, AdxOutput::Adx, "adx")
    }

    pub fn plus_di(period: usize) -> Self {
        Self::with_output(period, AdxOutput::PlusDi, "plus_di")
    }

    pub fn minus_di(period: usize) -> Self {
        Self::with_output(period, AdxOutput::MinusDi, "minus_di")
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.output {
            AdxOutput::Adx => 2 * self.period - 1,
            AdxOutput::PlusDi | AdxOutput::MinusDi => self.period,
        }
    }

    fn compute(&self, prices: &[f64]) -> Vec<f64> {
        let n = prices.len();
        if n < 2 {
            return vec![f64::NAN; n];
        }

        let mut plus_dm = vec![f64::NAN; n];
        let mut minus_dm = vec![f64::NAN; n];
        for i in 1..n {
            let diff = prices[i] - prices[i - 1];
            plus_dm[i] = diff.max(0.0);
            minus_dm[i] = (-diff).max(0.0);
        }

        let smooth_tr = wilder_smooth(&true_range(prices), self.period);
        let smooth_plus = wilder_smooth(&plus_dm, self.period);
        let smooth_minus = wilder_smooth(&minus_dm, self.period);

        let mut plus_di = vec![f64::NAN; n];
        let mut minus_di = vec![f64::NAN; n];
        let mut dx = vec![f64::NAN; n];
        for i in 0..n {
            if smooth_tr[i].is_nan() || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() {
                continue;
            }
            let (p, m) = if smooth_tr[i] == 0.0 {
                (0.0, 0.0)
            } else {
                (
                    100.0 * smooth_plus[i] / smooth_tr[i],
                    100.0 * smooth_minus[i] / smooth_tr[i],
                )
            };
            plus_di[i] = p;
            minus_di[i] = m;
            dx[i] = if p + m == 0.0 {
                0.0
            } else {
                100.0 * (p - m).abs() / (p + m)
            };
        }

        match self.output {
            AdxOutput::Adx => wilder_smooth(&dx, self.period),
            AdxOutput::PlusDi => plus_di,
            AdxOutput::MinusDi => minus_di,
        }
    }
}
