//! scorelab core — indicators, signal scoring, simulated exchange,
//! portfolio, and the bar-replay engine.
//!
//! A run is deterministic: identical configuration and price series produce
//! identical equity curves and trade lists.
//! - Price-only indicators with NaN warm-up
//! - Thirteen-indicator long/short scoring in [0, 100]
//! - Fill simulation with slippage, swap fees, and gas
//! - Position accounting with stop-loss, take-profit, and trailing stops
//! - One-bar-delayed execution of every signal decision

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod indicators;
pub mod portfolio;
pub mod signals;

pub use config::{BacktestConfig, BarInterval, ConfigError, RunId};
pub use engine::{BacktestEngine, EngineError, RunResult};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared across threads by sweeps are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::PriceBar>();
        require_sync::<domain::PriceBar>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::ClosedTrade>();
        require_sync::<domain::ClosedTrade>();
        require_send::<domain::EquityPoint>();
        require_sync::<domain::EquityPoint>();

        // Config
        require_send::<config::BacktestConfig>();
        require_sync::<config::BacktestConfig>();

        // Engine
        require_send::<engine::BacktestEngine>();
        require_sync::<engine::BacktestEngine>();
        require_send::<engine::RunResult>();
        require_sync::<engine::RunResult>();
        require_send::<engine::AlignedSeries>();
        require_sync::<engine::AlignedSeries>();

        // Components
        require_send::<signals::SignalEngine>();
        require_sync::<signals::SignalEngine>();
        require_send::<signals::SignalResult>();
        require_sync::<signals::SignalResult>();
        require_send::<execution::SimulatedExchange>();
        require_sync::<execution::SimulatedExchange>();
        require_send::<portfolio::Portfolio>();
        require_sync::<portfolio::Portfolio>();

        // Providers
        require_send::<data::CsvPriceProvider>();
        require_sync::<data::CsvPriceProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
    }

    /// Architecture contract: the signal engine cannot see the portfolio.
    ///
    /// `compute_signal` takes price history and a lookback only. Adding a
    /// portfolio parameter breaks this test.
    #[test]
    fn signal_engine_takes_no_portfolio() {
        fn _check(
            engine: &signals::SignalEngine,
            history: &[domain::PriceBar],
        ) -> signals::SignalResult {
            engine.compute_signal(history, 50)
        }
    }
}
