//! SimulatedExchange — stateless fill simulation.
//!
//! Slippage is directional: buyers pay more, sellers receive less.
//! Fees = notional * swap_fee_bps / 10_000 + flat gas per trade.

use serde::{Deserialize, Serialize};

use super::slippage::slippage_fraction;
use crate::config::ExecutionConfig;
use crate::domain::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Side that opens a position in `direction`.
    pub fn opening(direction: Direction) -> Self {
        match direction {
            Direction::Long => Side::Buy,
            Direction::Short => Side::Sell,
        }
    }

    /// Side that closes a position in `direction`.
    pub fn closing(direction: Direction) -> Self {
        match direction {
            Direction::Long => Side::Sell,
            Direction::Short => Side::Buy,
        }
    }
}

/// Outcome of a simulated fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub fill_price: f64,
    /// Slippage applied, as a fraction of the reference price.
    pub slippage: f64,
    pub total_fees: f64,
}

#[derive(Debug, Clone)]
pub struct SimulatedExchange {
    config: ExecutionConfig,
}

impl SimulatedExchange {
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Fill `notional_usd` on `side` against `price_ref`.
    pub fn fill(&self, side: Side, notional_usd: f64, price_ref: f64) -> Fill {
        let slippage = slippage_fraction(&self.config, notional_usd);
        let fill_price = match side {
            Side::Buy => price_ref * (1.0 + slippage),
            Side::Sell => price_ref * (1.0 - slippage),
        };
        Fill {
            fill_price,
            slippage,
            total_fees: self.fees(notional_usd),
        }
    }

    /// Fill at the reference price with fees only. Used for stop, target and
    /// end-of-data exits, which trigger at a level rather than chase a price.
    pub fn fill_at_reference(&self, notional_usd: f64, price_ref: f64) -> Fill {
        Fill {
            fill_price: price_ref,
            slippage: 0.0,
            total_fees: self.fees(notional_usd),
        }
    }

    /// Swap fee plus flat gas.
    pub fn fees(&self, notional_usd: f64) -> f64 {
        notional_usd.abs() * self.config.swap_fee_bps / 10_000.0 + self.config.gas_per_trade_usd
    }
}
