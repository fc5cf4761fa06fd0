//! Trend gate on a reference token.
//!
//! Price at or above its SMA admits longs only; below admits shorts only.
//! Until the SMA has enough history, both directions pass.

use serde::{Deserialize, Serialize};

use crate::domain::Direction;
use crate::indicators::{Indicator, Sma};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendGate {
    #[default]
    Open,
    LongOnly,
    ShortOnly,
}

impl TrendGate {
    pub fn allows(self, direction: Direction) -> bool {
        match self {
            TrendGate::Open => true,
            TrendGate::LongOnly => direction == Direction::Long,
            TrendGate::ShortOnly => direction == Direction::Short,
        }
    }
}

/// Gate from the reference prices up to and including the current bar.
pub fn evaluate_gate(history: &[f64], ma_period: usize) -> TrendGate {
    let period = ma_period.max(1);
    if history.len() < period {
        return TrendGate::Open;
    }
    let window = &history[history.len() - period..];
    let (Some(sma), Some(&price)) = (Sma::new(period).last_value(window), window.last()) else {
        return TrendGate::Open;
    };
    if price >= sma {
        TrendGate::LongOnly
    } else {
        TrendGate::ShortOnly
    }
}
