//! Backtesting engine — alignment, per-bar steps, and the event loop.
//!
//! Decisions taken with bar `t` data fill at bar `t + 1`: entries and
//! signal exits never see the price of the bar that produced them.

pub mod align;
pub mod event_loop;
pub mod state;
pub mod steps;
pub mod trend;

pub use align::{align_series, AlignedSeries};
pub use event_loop::BacktestEngine;
pub use state::{EngineError, PendingExit, RunResult, SimulationState};
pub use steps::BarContext;
pub use trend::{evaluate_gate, TrendGate};
