//! Result persistence — JSON round-trip and CSV tapes.
//!
//! Saved results carry a `schema_version`; files written by a newer schema
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use scorelab_core::domain::{ClosedTrade, EquityPoint};

use crate::runner::{BacktestResult, SCHEMA_VERSION};

/// Where `save_result` writes when no path is given.
pub const DEFAULT_RESULT_PATH: &str = ".backtest-results/latest.json";

pub fn default_result_path() -> PathBuf {
    PathBuf::from(DEFAULT_RESULT_PATH)
}

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Write `result` as JSON, creating parent directories.
pub fn save_result(result: &BacktestResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = export_json(result)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub fn load_result(path: &Path) -> Result<BacktestResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json).with_context(|| format!("invalid result file {}", path.display()))
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Trade tape, one row per closed trade.
pub fn export_trades_csv(trades: &[ClosedTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "token",
        "direction",
        "signal_bar",
        "entry_bar",
        "entry_time",
        "entry_price",
        "exit_bar",
        "exit_time",
        "exit_price",
        "size",
        "cost_basis",
        "fees",
        "pnl",
        "pnl_pct",
        "holding_bars",
        "exit_reason",
    ])?;

    for t in trades {
        wtr.write_record([
            t.token.clone(),
            format!("{:?}", t.direction),
            t.signal_bar.to_string(),
            t.entry_bar.to_string(),
            t.entry_timestamp.to_rfc3339(),
            format!("{:.6}", t.entry_price),
            t.exit_bar.to_string(),
            t.exit_timestamp.to_rfc3339(),
            format!("{:.6}", t.exit_price),
            format!("{:.8}", t.size),
            format!("{:.2}", t.cost_basis),
            format!("{:.2}", t.fees),
            format!("{:.2}", t.pnl),
            format!("{:.4}", t.pnl_percent),
            t.holding_bars.to_string(),
            t.exit_reason.as_str().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Bar-by-bar equity curve.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "timestamp", "equity", "cash", "positions_value", "drawdown_pct"])?;
    for p in equity_curve {
        wtr.write_record([
            &p.bar_index.to_string(),
            &p.timestamp.to_rfc3339(),
            &format!("{:.2}", p.equity),
            &format!("{:.2}", p.cash),
            &format!("{:.2}", p.positions_value),
            &format!("{:.4}", p.drawdown_pct),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}
