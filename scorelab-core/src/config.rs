//! Serializable backtest configuration.
//!
//! Every nested field has a default, so a TOML or JSON file only needs the
//! token list and the date range. `validate()` rejects bad parameters before
//! any bar is processed.

use std::path::Path;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content hash of a configuration.
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// Bar interval of the price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BarInterval {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "1d")]
    OneDay,
}

impl BarInterval {
    /// Bars in a year of continuous trading.
    pub fn bars_per_year(self) -> f64 {
        match self {
            BarInterval::OneHour => 8760.0,
            BarInterval::FourHours => 2190.0,
            BarInterval::OneDay => 365.0,
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            BarInterval::OneHour => Duration::hours(1),
            BarInterval::FourHours => Duration::hours(4),
            BarInterval::OneDay => Duration::days(1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BarInterval::OneHour => "1h",
            BarInterval::FourHours => "4h",
            BarInterval::OneDay => "1d",
        }
    }
}

/// Full run parameterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Tokens to trade, in ranking tie-break order.
    pub tokens: Vec<String>,
    #[serde(default = "default_quote_token")]
    pub quote_token: String,
    /// Token used for the buy-and-hold benchmark (defaults to the first token).
    #[serde(default)]
    pub benchmark_token: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    #[serde(default)]
    pub interval: BarInterval,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub risk: RiskConfig,
}

fn default_quote_token() -> String {
    "USDC".to_string()
}

fn default_initial_capital() -> f64 {
    10_000.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub max_positions: usize,
    pub use_shorts: bool,
    pub short_entry_threshold: f64,
    pub short_exit_threshold: f64,
    pub lookback_bars: usize,
    /// Leading bars on which no entry or signal exit is decided.
    pub warmup_bars: usize,
    pub trend_filter: TrendFilterConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            entry_threshold: 62.0,
            exit_threshold: 40.0,
            max_positions: 5,
            use_shorts: false,
            short_entry_threshold: 65.0,
            short_exit_threshold: 40.0,
            lookback_bars: 50,
            warmup_bars: 0,
            trend_filter: TrendFilterConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendFilterConfig {
    pub enabled: bool,
    /// Reference token whose SMA gates entry direction.
    pub token: String,
    pub ma_period: usize,
}

impl Default for TrendFilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: "WETH".to_string(),
            ma_period: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlippageModel {
    #[default]
    Fixed,
    Sqrt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub slippage_model: SlippageModel,
    /// Fixed slippage, and the base for the square-root model.
    pub fixed_slippage_bps: f64,
    pub reference_liquidity_usd: f64,
    pub swap_fee_bps: f64,
    pub gas_per_trade_usd: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            slippage_model: SlippageModel::Fixed,
            fixed_slippage_bps: 30.0,
            reference_liquidity_usd: 1_000_000.0,
            swap_fee_bps: 30.0,
            gas_per_trade_usd: 5.0,
        }
    }
}

impl ExecutionConfig {
    /// No slippage, no fees.
    pub fn frictionless() -> Self {
        Self {
            fixed_slippage_bps: 0.0,
            swap_fee_bps: 0.0,
            gas_per_trade_usd: 0.0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub max_position_pct: f64,
    pub stop_loss_atr_multiple: f64,
    pub take_profit_atr_multiple: f64,
    pub max_drawdown_pct: f64,
    pub trailing_stop_pct: Option<f64>,
    /// Close every open position when the circuit breaker trips.
    pub liquidate_on_circuit_breaker: bool,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_pct: 20.0,
            stop_loss_atr_multiple: 2.0,
            take_profit_atr_multiple: 4.0,
            max_drawdown_pct: 25.0,
            trailing_stop_pct: None,
            liquidate_on_circuit_breaker: false,
        }
    }
}

impl BacktestConfig {
    /// Minimal config with defaults for everything but tokens and dates.
    pub fn new(tokens: Vec<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            tokens,
            quote_token: default_quote_token(),
            benchmark_token: None,
            start_date,
            end_date,
            initial_capital: default_initial_capital(),
            interval: BarInterval::default(),
            strategy: StrategyConfig::default(),
            execution: ExecutionConfig::default(),
            risk: RiskConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; `.json` files are JSON, everything else TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }

    /// Token used for buy-and-hold comparison.
    pub fn benchmark(&self) -> Option<&str> {
        self.benchmark_token
            .as_deref()
            .or_else(|| self.tokens.first().map(String::as_str))
    }

    /// Deterministic hash of the canonical JSON form of this config.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }

    /// Reject invalid parameters before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.is_empty() {
            return Err(invalid("token list is empty"));
        }
        for (i, token) in self.tokens.iter().enumerate() {
            if token.trim().is_empty() {
                return Err(invalid(format!("token {i} is blank")));
            }
            if self.tokens[..i].contains(token) {
                return Err(invalid(format!("duplicate token '{token}'")));
            }
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(invalid(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if self.end_date < self.start_date {
            return Err(invalid(format!(
                "end_date {} is before start_date {}",
                self.end_date, self.start_date
            )));
        }

        let s = &self.strategy;
        for (name, value) in [
            ("entry_threshold", s.entry_threshold),
            ("exit_threshold", s.exit_threshold),
            ("short_entry_threshold", s.short_entry_threshold),
            ("short_exit_threshold", s.short_exit_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(invalid(format!("{name} must be in [0, 100], got {value}")));
            }
        }
        if s.max_positions == 0 {
            return Err(invalid("max_positions must be at least 1"));
        }
        if s.lookback_bars < 2 {
            return Err(invalid(format!(
                "lookback_bars must be at least 2, got {}",
                s.lookback_bars
            )));
        }
        if s.trend_filter.enabled && s.trend_filter.ma_period == 0 {
            return Err(invalid("trend_filter.ma_period must be at least 1"));
        }

        let e = &self.execution;
        for (name, value) in [
            ("fixed_slippage_bps", e.fixed_slippage_bps),
            ("swap_fee_bps", e.swap_fee_bps),
            ("gas_per_trade_usd", e.gas_per_trade_usd),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{name} must be non-negative, got {value}")));
            }
        }
        if !e.reference_liquidity_usd.is_finite() || e.reference_liquidity_usd <= 0.0 {
            return Err(invalid("reference_liquidity_usd must be positive"));
        }

        let r = &self.risk;
        if !(r.max_position_pct > 0.0 && r.max_position_pct <= 100.0) {
            return Err(invalid(format!(
                "max_position_pct must be in (0, 100], got {}",
                r.max_position_pct
            )));
        }
        for (name, value) in [
            ("stop_loss_atr_multiple", r.stop_loss_atr_multiple),
            ("take_profit_atr_multiple", r.take_profit_atr_multiple),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{name} must be non-negative, got {value}")));
            }
        }
        if !(r.max_drawdown_pct > 0.0 && r.max_drawdown_pct <= 100.0) {
            return Err(invalid(format!(
                "max_drawdown_pct must be in (0, 100], got {}",
                r.max_drawdown_pct
            )));
        }
        if let Some(pct) = r.trailing_stop_pct {
            if !(pct > 0.0 && pct < 100.0) {
                return Err(invalid(format!(
                    "trailing_stop_pct must be in (0, 100), got {pct}"
                )));
            }
        }

        Ok(())
    }
}
