//! Parameter sweep over entry/exit thresholds.
//!
//! Series are loaded once; each grid point runs on its own copy in parallel
//! via rayon. Results come back in grid order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use scorelab_core::config::BacktestConfig;
use scorelab_core::domain::PriceBar;

use crate::runner::{run_backtest_from_data, BacktestResult, RunError};

/// Threshold grid. Points are the cartesian product, entry-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdGrid {
    pub entry_thresholds: Vec<f64>,
    pub exit_thresholds: Vec<f64>,
}

impl ThresholdGrid {
    pub fn new(entry_thresholds: Vec<f64>, exit_thresholds: Vec<f64>) -> Self {
        Self {
            entry_thresholds,
            exit_thresholds,
        }
    }

    pub fn size(&self) -> usize {
        self.entry_thresholds.len() * self.exit_thresholds.len()
    }

    /// One config per grid point, derived from `base`.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &entry in &self.entry_thresholds {
            for &exit in &self.exit_thresholds {
                let mut config = base.clone();
                config.strategy.entry_threshold = entry;
                config.strategy.exit_threshold = exit;
                configs.push(config);
            }
        }
        configs
    }
}

/// One completed grid point.
#[derive(Debug, Clone)]
pub struct SweepPoint {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub result: BacktestResult,
}

/// Run every grid point against the same preloaded series.
///
/// Fails on the first invalid grid point.
pub fn run_sweep(
    grid: &ThresholdGrid,
    base: &BacktestConfig,
    series: &BTreeMap<String, Vec<PriceBar>>,
) -> Result<Vec<SweepPoint>, RunError> {
    let configs = grid.generate_configs(base);
    info!(points = configs.len(), "starting threshold sweep");

    configs
        .into_par_iter()
        .map(|config| -> Result<SweepPoint, RunError> {
            let result = run_backtest_from_data(&config, series.clone())?;
            Ok(SweepPoint {
                entry_threshold: config.strategy.entry_threshold,
                exit_threshold: config.strategy.exit_threshold,
                result,
            })
        })
        .collect()
}

/// The point with the highest Sharpe ratio (first in grid order on ties).
pub fn best_by_sharpe(points: &[SweepPoint]) -> Option<&SweepPoint> {
    points.iter().reduce(|best, p| {
        if p.result.metrics.sharpe > best.result.metrics.sharpe {
            p
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn grid_is_entry_major() {
        let base = BacktestConfig::new(
            vec!["WETH".into()],
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        let grid = ThresholdGrid::new(vec![55.0, 62.0], vec![35.0, 40.0, 45.0]);
        assert_eq!(grid.size(), 6);
        let configs = grid.generate_configs(&base);
        let pairs: Vec<(f64, f64)> = configs
            .iter()
            .map(|c| (c.strategy.entry_threshold, c.strategy.exit_threshold))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (55.0, 35.0),
                (55.0, 40.0),
                (55.0, 45.0),
                (62.0, 35.0),
                (62.0, 40.0),
                (62.0, 45.0)
            ]
        );
        assert!(configs.iter().all(|c| c.tokens == base.tokens));
    }

    #[test]
    fn empty_grid_has_no_points() {
        let grid = ThresholdGrid::new(vec![], vec![40.0]);
        assert_eq!(grid.size(), 0);
        assert!(best_by_sharpe(&[]).is_none());
    }
}
