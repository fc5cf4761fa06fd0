//! Technical indicators over price-only series.
//!
//! Every indicator implements [`Indicator`]: a price series in, a numeric
//! series of the same length out, with `f64::NAN` for bars that do not yet
//! have enough history. The signal engine computes each indicator over the
//! lookback window and reads the last value; a NaN there means "not enough
//! data" and is replaced by the indicator's neutral default.
//!
//! Multi-output indicators (MACD, ADX, Aroon, Bollinger, VWAP) are exposed as
//! separate named instances per output, keeping the single-series trait
//! unchanged.
//!
//! Series carry a single price per bar, so high = low = close: true range and
//! directional movement are close-to-close quantities.

pub mod adx;
pub mod aroon;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod momentum;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stoch_rsi;
pub mod volatility;
pub mod vwap;
pub mod williams_r;

pub use adx::{Adx, AdxOutput};
pub use aroon::{Aroon, AroonBand};
pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::Ema;
pub use macd::{Macd, MacdOutput};
pub use momentum::Momentum;
pub use roc::Roc;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stoch_rsi::StochRsi;
pub use volatility::HistVolatility;
pub use vwap::Vwap;
pub use williams_r::WilliamsR;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on prices from bar t+1 or later. Every
/// indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "bollinger_pct_b_20_2").
    fn name(&self) -> &str;

    /// Number of leading bars that are NaN before output becomes valid.
    ///
    /// `lookback() + 1` is the minimum series length for one valid value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire price series.
    fn compute(&self, prices: &[f64]) -> Vec<f64>;

    /// Value at the last bar, or `None` when the series is too short.
    fn last_value(&self, prices: &[f64]) -> Option<f64> {
        self.compute(prices).last().copied().filter(|v| v.is_finite())
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
