//! Closed trade — one completed round-trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::position::Direction;

/// Why a position was closed. Exactly one per trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
    TrailingStop,
    CircuitBreaker,
    EndOfData,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::Signal => "signal",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::TrailingStop => "trailing_stop",
            ExitReason::CircuitBreaker => "circuit_breaker",
            ExitReason::EndOfData => "end_of_data",
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub token: String,
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_timestamp: DateTime<Utc>,
    pub exit_timestamp: DateTime<Utc>,
    pub entry_bar: usize,
    pub exit_bar: usize,
    /// Bar whose data produced the entry decision (always < `entry_bar`).
    pub signal_bar: usize,
    /// Bar whose data produced a signal exit, when the exit was signal-driven.
    pub exit_signal_bar: Option<usize>,
    pub size: f64,
    pub cost_basis: f64,
    /// Net of entry and exit fees.
    pub pnl: f64,
    pub pnl_percent: f64,
    pub holding_bars: usize,
    pub exit_reason: ExitReason,
    /// Entry plus exit fees.
    pub fees: f64,
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
