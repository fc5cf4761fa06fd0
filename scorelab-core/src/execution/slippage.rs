//! Slippage models.
//!
//! - fixed: `bps / 10_000` regardless of size
//! - sqrt: `bps / 10_000 * sqrt(notional / reference_liquidity)`, so an order
//!   the size of the reference liquidity pays exactly the base rate

use crate::config::{ExecutionConfig, SlippageModel};

/// Slippage as a fraction of price for an order of `notional_usd`.
pub fn slippage_fraction(config: &ExecutionConfig, notional_usd: f64) -> f64 {
    let base = config.fixed_slippage_bps / 10_000.0;
    match config.slippage_model {
        SlippageModel::Fixed => base,
        SlippageModel::Sqrt => {
            if config.reference_liquidity_usd <= 0.0 || notional_usd <= 0.0 {
                return 0.0;
            }
            base * (notional_usd / config.reference_liquidity_usd).sqrt()
        }
    }
}
