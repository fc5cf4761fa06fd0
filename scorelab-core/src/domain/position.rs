//! Open position — one exposure in one token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monotonic position identifier, unique within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionId(pub u64);

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pos-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for longs, -1 for shorts.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// An open exposure.
///
/// `size` (token units) and `cost_basis` (USD notional) are fixed at entry.
/// Only `trailing_stop` changes while the position is open, and only in the
/// favorable direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub token: String,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub entry_bar: usize,
    pub entry_timestamp: DateTime<Utc>,
    /// Bar whose data produced the entry decision.
    pub signal_bar: usize,
    pub size: f64,
    pub cost_basis: f64,
    pub entry_fees: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub trailing_stop: Option<f64>,
}

impl Position {
    /// Mark-to-market value of the position at `price`.
    ///
    /// Longs are worth `size * price`. Shorts hold their collateral plus the
    /// unrealized gain: `cost_basis + (entry - price) * size`.
    pub fn market_value(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => self.size * price,
            Direction::Short => self.cost_basis + (self.entry_price - price) * self.size,
        }
    }

    /// Gross price P&L before fees.
    pub fn gross_pnl(&self, exit_price: f64) -> f64 {
        self.direction.sign() * (exit_price - self.entry_price) * self.size
    }
}
