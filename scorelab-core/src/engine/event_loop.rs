//! BacktestEngine — bar-by-bar replay over preloaded price series.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::align::{align_series, AlignedSeries};
use super::state::{EngineError, RunResult, SimulationState};
use super::steps::{self, BarContext};
use crate::config::BacktestConfig;
use crate::domain::{validate_series, PriceBar};
use crate::execution::SimulatedExchange;
use crate::portfolio::Portfolio;
use crate::signals::SignalEngine;

/// Deterministic single-threaded simulation of one configuration.
pub struct BacktestEngine {
    config: BacktestConfig,
    exchange: SimulatedExchange,
    signals: SignalEngine,
    data: AlignedSeries,
    data_warnings: Vec<String>,
}

impl BacktestEngine {
    /// Validate and align `series` for every token the config reads.
    ///
    /// Series are keyed by token. The trend-filter and benchmark tokens must
    /// be present when used; an empty series is accepted and yields an empty
    /// timeline.
    pub fn new(
        config: BacktestConfig,
        series: BTreeMap<String, Vec<PriceBar>>,
    ) -> Result<Self, EngineError> {
        let mut required: Vec<String> = config.tokens.clone();
        if config.strategy.trend_filter.enabled {
            required.push(config.strategy.trend_filter.token.clone());
        }
        if let Some(benchmark) = config.benchmark() {
            required.push(benchmark.to_string());
        }
        required.sort();
        required.dedup();

        let mut selected = BTreeMap::new();
        for token in required {
            let bars = series
                .get(&token)
                .ok_or_else(|| EngineError::MissingSeries(token.clone()))?;
            validate_series(bars).map_err(|source| EngineError::InvalidSeries {
                token: token.clone(),
                source,
            })?;
            selected.insert(token, bars.clone());
        }

        let data = align_series(&selected);
        let data_warnings = data.warnings();
        for warning in &data_warnings {
            warn!("{warning}");
        }
        if data.is_empty() {
            warn!("aligned price matrix is empty, nothing to simulate");
        }

        Ok(Self {
            exchange: SimulatedExchange::new(config.execution.clone()),
            signals: SignalEngine::new(),
            config,
            data,
            data_warnings,
        })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn aligned(&self) -> &AlignedSeries {
        &self.data
    }

    /// Replay every bar and return the equity curve and closed trades.
    pub fn run(&self) -> Result<RunResult, EngineError> {
        let n = self.data.len();
        info!(
            tokens = self.config.tokens.len(),
            bars = n,
            capital = self.config.initial_capital,
            "backtest started"
        );

        let mut state = SimulationState::new(Portfolio::new(
            self.config.initial_capital,
            self.config.strategy.max_positions,
            self.config.risk.clone(),
        ));

        for index in 0..n {
            let ctx = BarContext {
                index,
                timestamp: self.data.timestamps[index],
                prices: self.data.prices_at(index),
                is_final: index + 1 == n,
                data: &self.data,
                config: &self.config,
                exchange: &self.exchange,
                signals: &self.signals,
            };
            state = self.step(state, &ctx)?;
        }

        let final_equity = state
            .equity_curve
            .last()
            .map_or(self.config.initial_capital, |p| p.equity);
        let benchmark_prices = self
            .config
            .benchmark()
            .map(|token| self.data.prices(token))
            .unwrap_or_default();

        let SimulationState {
            portfolio,
            equity_curve,
            circuit_breaker_bar,
            rejected_entries,
            ..
        } = state;
        let trades = portfolio.into_closed_trades();

        info!(
            bars = n,
            trades = trades.len(),
            final_equity,
            "backtest finished"
        );

        Ok(RunResult {
            equity_curve,
            trades,
            bar_count: n,
            final_equity,
            benchmark_prices,
            data_warnings: self.data_warnings.clone(),
            circuit_breaker_bar,
            rejected_entries,
        })
    }

    fn step(
        &self,
        state: SimulationState,
        ctx: &BarContext<'_>,
    ) -> Result<SimulationState, EngineError> {
        let state = steps::fill_pending(state, ctx)?;
        let state = steps::check_orders(state, ctx);
        let state = steps::update_trend_gate(state, ctx);
        let state = steps::compute_signals(state, ctx);

        if ctx.is_final {
            debug!(bar = ctx.index, "final bar, closing open positions");
            let state = steps::close_end_of_data(state, ctx);
            return steps::record_equity(state, ctx);
        }

        let state = steps::close_positions(state, ctx);
        let state = steps::rank_and_open(state, ctx);
        let state = steps::record_equity(state, ctx)?;
        Ok(steps::check_circuit_breaker(state, ctx))
    }
}
