//! scorelab runner — backtest orchestration on top of `scorelab-core`.
//!
//! - Single-run pipeline: provider → engine → metrics → `BacktestResult`
//! - Performance metrics with a buy-and-hold benchmark
//! - Threshold sweeps in parallel over preloaded series
//! - JSON/CSV export and a path-keyed result cache

pub mod cache;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use cache::ResultContextCache;
pub use export::{
    default_result_path, export_equity_csv, export_json, export_trades_csv, import_json,
    load_result, save_result,
};
pub use metrics::PerformanceMetrics;
pub use runner::{
    load_for_config, required_tokens, run_backtest, run_backtest_from_data, BacktestResult,
    RunError, SCHEMA_VERSION,
};
pub use sweep::{best_by_sharpe, run_sweep, SweepPoint, ThresholdGrid};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn performance_metrics_is_send_sync() {
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn sweep_types_are_send_sync() {
        assert_send::<ThresholdGrid>();
        assert_sync::<ThresholdGrid>();
        assert_send::<SweepPoint>();
        assert_sync::<SweepPoint>();
    }

    #[test]
    fn result_cache_is_send_sync() {
        assert_send::<ResultContextCache>();
        assert_sync::<ResultContextCache>();
    }

    #[test]
    fn run_error_is_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
