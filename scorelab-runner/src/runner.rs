//! Backtest runner — loads series, runs the engine, computes metrics.
//!
//! Pipeline: config → validate → provider → engine → metrics → BacktestResult.
//! The result carries no wall-clock data, so identical inputs serialize to
//! identical bytes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use scorelab_core::config::{BacktestConfig, ConfigError, RunId};
use scorelab_core::data::{load_series, DataError, PriceProvider};
use scorelab_core::domain::{ClosedTrade, EquityPoint, PriceBar};
use scorelab_core::engine::{BacktestEngine, EngineError};

use crate::metrics::PerformanceMetrics;

/// Current schema version for `BacktestResult` serialization.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: BacktestConfig,
    pub metrics: PerformanceMetrics,
    pub equity_curve: Vec<EquityPoint>,
    /// Per-bar drawdown from the running peak, in percent.
    #[serde(default)]
    pub drawdown_curve: Vec<f64>,
    pub trades: Vec<ClosedTrade>,
    pub bar_count: usize,
    pub final_equity: f64,
    #[serde(default)]
    pub data_warnings: Vec<String>,
    #[serde(default)]
    pub circuit_breaker_bar: Option<usize>,
    #[serde(default)]
    pub rejected_entries: usize,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    /// Plain-text digest of the run.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BacktestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        let c = &self.config;
        writeln!(
            f,
            "Backtest {} .. {} ({}, {} bars)",
            c.start_date,
            c.end_date,
            c.interval.as_str(),
            self.bar_count
        )?;
        writeln!(f, "Tokens:          {}", c.tokens.join(", "))?;
        writeln!(f, "Run id:          {}", &self.run_id[..self.run_id.len().min(16)])?;
        writeln!(
            f,
            "Equity:          {:.2} -> {:.2} {}",
            c.initial_capital, self.final_equity, c.quote_token
        )?;
        writeln!(f, "Total return:    {:.2}%", m.total_return_pct)?;
        writeln!(f, "Annualized:      {:.2}%", m.annualized_return_pct)?;
        writeln!(
            f,
            "Buy & hold:      {:.2}% (alpha {:+.2}%)",
            m.buy_and_hold_return_pct, m.alpha_pct
        )?;
        writeln!(
            f,
            "Max drawdown:    {:.2}% over {} bars",
            m.max_drawdown_pct, m.max_drawdown_duration_bars
        )?;
        writeln!(
            f,
            "Sharpe / Sortino / Calmar: {:.2} / {:.2} / {:.2}",
            m.sharpe, m.sortino, m.calmar
        )?;
        writeln!(
            f,
            "Trades:          {} ({} won, {} lost, win rate {:.1}%)",
            m.trade_count, m.winning_trades, m.losing_trades, m.win_rate_pct
        )?;
        writeln!(f, "Profit factor:   {:.2}", m.profit_factor)?;
        writeln!(f, "Fees paid:       {:.2}", m.total_fees)?;
        if !m.exit_reasons.is_empty() {
            let reasons: Vec<String> = m
                .exit_reasons
                .iter()
                .map(|(reason, count)| format!("{reason}={count}"))
                .collect();
            writeln!(f, "Exits:           {}", reasons.join(" "))?;
        }
        if let Some(bar) = self.circuit_breaker_bar {
            writeln!(f, "Circuit breaker tripped at bar {bar}")?;
        }
        if self.rejected_entries > 0 {
            writeln!(f, "Rejected entries: {}", self.rejected_entries)?;
        }
        for warning in &self.data_warnings {
            writeln!(f, "warning: {warning}")?;
        }
        Ok(())
    }
}

/// Errors from the runner pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Tokens whose series a run reads: the traded set, the trend-filter token
/// and the benchmark.
pub fn required_tokens(config: &BacktestConfig) -> Vec<String> {
    let mut tokens = config.tokens.clone();
    if config.strategy.trend_filter.enabled {
        tokens.push(config.strategy.trend_filter.token.clone());
    }
    if let Some(benchmark) = config.benchmark() {
        tokens.push(benchmark.to_string());
    }
    let mut seen = Vec::with_capacity(tokens.len());
    tokens.retain(|t| {
        if seen.contains(t) {
            false
        } else {
            seen.push(t.clone());
            true
        }
    });
    tokens
}

/// Load every series the config needs from `provider`.
pub fn load_for_config(
    config: &BacktestConfig,
    provider: &dyn PriceProvider,
) -> Result<BTreeMap<String, Vec<PriceBar>>, DataError> {
    let tokens = required_tokens(config);
    load_series(
        provider,
        tokens.iter().map(String::as_str),
        config.start_date,
        config.end_date,
        config.interval,
    )
}

/// Validate the config, load its series, and run.
pub fn run_backtest(
    config: &BacktestConfig,
    provider: &dyn PriceProvider,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    info!(provider = provider.name(), tokens = config.tokens.len(), "loading price series");
    let series = load_for_config(config, provider)?;
    run_backtest_from_data(config, series)
}

/// Run a backtest on preloaded series (keyed by token).
pub fn run_backtest_from_data(
    config: &BacktestConfig,
    series: BTreeMap<String, Vec<PriceBar>>,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let engine = BacktestEngine::new(config.clone(), series)?;
    let run = engine.run()?;

    let metrics = PerformanceMetrics::compute(
        &run.equity_curve,
        &run.trades,
        &run.benchmark_prices,
        config.initial_capital,
        config.interval.bars_per_year(),
    );

    let drawdown_curve = run.equity_curve.iter().map(|p| p.drawdown_pct).collect();

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        config: config.clone(),
        metrics,
        equity_curve: run.equity_curve,
        drawdown_curve,
        trades: run.trades,
        bar_count: run.bar_count,
        final_equity: run.final_equity,
        data_warnings: run.data_warnings,
        circuit_breaker_bar: run.circuit_breaker_bar,
        rejected_entries: run.rejected_entries,
    })
}
