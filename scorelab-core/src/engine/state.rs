//! Simulation state, errors, and the run result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::trend::TrendGate;
use crate::domain::{BarError, ClosedTrade, EquityPoint, PositionId};
use crate::portfolio::{EntryOrder, Portfolio};
use crate::signals::SignalResult;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no price series supplied for {0}")]
    MissingSeries(String),
    #[error("invalid price series for {token}: {source}")]
    InvalidSeries {
        token: String,
        #[source]
        source: BarError,
    },
    #[error("non-finite {field} at bar {bar}")]
    NonFinite { bar: usize, field: &'static str },
}

/// A signal exit decided at `signal_bar`, filled on the next bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingExit {
    pub position: PositionId,
    pub token: String,
    pub signal_bar: usize,
}

/// Everything that evolves bar-by-bar. Moved through the step functions.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub portfolio: Portfolio,
    pub pending_exits: Vec<PendingExit>,
    pub pending_entries: Vec<EntryOrder>,
    /// Signals of the current bar, keyed by token.
    pub signals: BTreeMap<String, SignalResult>,
    pub gate: TrendGate,
    pub equity_curve: Vec<EquityPoint>,
    /// Bar on which the circuit breaker tripped.
    pub circuit_breaker_bar: Option<usize>,
    pub rejected_entries: usize,
}

impl SimulationState {
    pub fn new(portfolio: Portfolio) -> Self {
        Self {
            portfolio,
            pending_exits: Vec::new(),
            pending_entries: Vec::new(),
            signals: BTreeMap::new(),
            gate: TrendGate::Open,
            equity_curve: Vec::new(),
            circuit_breaker_bar: None,
            rejected_entries: 0,
        }
    }

    pub fn has_pending_exit(&self, id: PositionId) -> bool {
        self.pending_exits.iter().any(|e| e.position == id)
    }
}

/// Output of a single engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<ClosedTrade>,
    pub bar_count: usize,
    pub final_equity: f64,
    /// Benchmark token prices over the aligned timeline.
    pub benchmark_prices: Vec<f64>,
    /// Data quality warnings (e.g. "WETH: 3 missing bars forward-filled").
    pub data_warnings: Vec<String>,
    pub circuit_breaker_bar: Option<usize>,
    pub rejected_entries: usize,
}
