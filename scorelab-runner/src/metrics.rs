//! Performance metrics — pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity values and/or trade list in,
//! scalar out. Returns and drawdowns are in percent. Per-bar statistics are
//! annualized with `bars_per_year` (365 for daily, 2190 for 4h, 8760 for 1h).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use scorelab_core::domain::{ClosedTrade, EquityPoint, ExitReason};

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub max_drawdown_pct: f64,
    /// Longest run of consecutive bars spent below a prior equity peak.
    pub max_drawdown_duration_bars: usize,
    pub volatility_pct: f64,
    pub downside_deviation_pct: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: f64,
    pub profit_factor: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    /// Largest single-trade profit in USD.
    pub largest_win: f64,
    /// Largest single-trade loss in USD (non-positive).
    pub largest_loss: f64,
    pub avg_holding_bars: f64,
    pub total_fees: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub exit_reasons: BTreeMap<ExitReason, usize>,
    pub buy_and_hold_return_pct: f64,
    pub alpha_pct: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics.
    ///
    /// The equity series starts at `initial_capital`, followed by one value
    /// per bar of `equity_curve`. `benchmark_prices` covers the same bars.
    pub fn compute(
        equity_curve: &[EquityPoint],
        trades: &[ClosedTrade],
        benchmark_prices: &[f64],
        initial_capital: f64,
        bars_per_year: f64,
    ) -> Self {
        let equity = equity_series(equity_curve, initial_capital);
        let (max_dd, dd_duration) = max_drawdown(&equity);
        let annualized = annualized_return(&equity, bars_per_year);
        let total = total_return(&equity);
        let buy_and_hold = buy_and_hold_return(benchmark_prices);

        Self {
            total_return_pct: total,
            annualized_return_pct: annualized,
            max_drawdown_pct: max_dd,
            max_drawdown_duration_bars: dd_duration,
            volatility_pct: volatility(&equity, bars_per_year),
            downside_deviation_pct: downside_deviation(&equity, bars_per_year),
            sharpe: sharpe_ratio(&equity, bars_per_year),
            sortino: sortino_ratio(&equity, bars_per_year),
            calmar: calmar_ratio(annualized, max_dd),
            trade_count: trades.len(),
            winning_trades: trades.iter().filter(|t| t.is_winner()).count(),
            losing_trades: trades.iter().filter(|t| !t.is_winner()).count(),
            win_rate_pct: win_rate(trades),
            profit_factor: profit_factor(trades),
            avg_win_pct: mean_f64(
                &trades
                    .iter()
                    .filter(|t| t.is_winner())
                    .map(|t| t.pnl_percent)
                    .collect::<Vec<_>>(),
            ),
            avg_loss_pct: mean_f64(
                &trades
                    .iter()
                    .filter(|t| !t.is_winner())
                    .map(|t| t.pnl_percent)
                    .collect::<Vec<_>>(),
            ),
            largest_win: trades.iter().map(|t| t.pnl).fold(0.0, f64::max),
            largest_loss: trades.iter().map(|t| t.pnl).fold(0.0, f64::min),
            avg_holding_bars: mean_f64(
                &trades
                    .iter()
                    .map(|t| t.holding_bars as f64)
                    .collect::<Vec<_>>(),
            ),
            total_fees: trades.iter().map(|t| t.fees).sum(),
            max_consecutive_wins: max_consecutive(trades, true),
            max_consecutive_losses: max_consecutive(trades, false),
            exit_reasons: exit_reason_breakdown(trades),
            buy_and_hold_return_pct: buy_and_hold,
            alpha_pct: total - buy_and_hold,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Prepend the initial capital to the per-bar equity values.
pub fn equity_series(equity_curve: &[EquityPoint], initial_capital: f64) -> Vec<f64> {
    std::iter::once(initial_capital)
        .chain(equity_curve.iter().map(|p| p.equity))
        .collect()
}

/// Total return in percent: (final - initial) / initial * 100.
pub fn total_return(equity: &[f64]) -> f64 {
    match (equity.first(), equity.last()) {
        (Some(&initial), Some(&last)) if equity.len() >= 2 && initial > 0.0 => {
            (last - initial) / initial * 100.0
        }
        _ => 0.0,
    }
}

/// Annualized return in percent: `((final/initial)^(bars_per_year/periods) - 1) * 100`.
pub fn annualized_return(equity: &[f64], bars_per_year: f64) -> f64 {
    let periods = equity.len().saturating_sub(1);
    let (Some(&initial), Some(&last)) = (equity.first(), equity.last()) else {
        return 0.0;
    };
    if periods == 0 || initial <= 0.0 {
        return 0.0;
    }
    if last <= 0.0 {
        return -100.0;
    }
    ((last / initial).powf(bars_per_year / periods as f64) - 1.0) * 100.0
}

/// Maximum drawdown in percent (positive) and the longest underwater run in bars.
pub fn max_drawdown(equity: &[f64]) -> (f64, usize) {
    let Some(&first) = equity.first() else {
        return (0.0, 0);
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut underwater = 0usize;
    let mut longest = 0usize;

    for &eq in equity {
        if eq >= peak {
            peak = eq;
            underwater = 0;
            continue;
        }
        underwater += 1;
        longest = longest.max(underwater);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - eq) / peak * 100.0);
        }
    }
    (max_dd, longest)
}

/// Annualized standard deviation of per-bar returns, in percent.
pub fn volatility(equity: &[f64], bars_per_year: f64) -> f64 {
    std_dev(&bar_returns(equity)) * bars_per_year.sqrt() * 100.0
}

/// Annualized downside deviation in percent.
///
/// Squared negative returns are averaged over all returns, not only the
/// negative ones.
pub fn downside_deviation(equity: &[f64], bars_per_year: f64) -> f64 {
    per_bar_downside(&bar_returns(equity)) * bars_per_year.sqrt() * 100.0
}

/// Sharpe = mean(per-bar returns) / std(per-bar returns) * sqrt(bars_per_year).
///
/// Returns 0.0 if the deviation is zero or there are fewer than two returns.
pub fn sharpe_ratio(equity: &[f64], bars_per_year: f64) -> f64 {
    let returns = bar_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(&returns) / std * bars_per_year.sqrt()
}

/// Sortino = mean(per-bar returns) / downside deviation * sqrt(bars_per_year).
///
/// Returns 0.0 if there is no downside.
pub fn sortino_ratio(equity: &[f64], bars_per_year: f64) -> f64 {
    let returns = bar_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let downside = per_bar_downside(&returns);
    if downside < 1e-15 {
        return 0.0;
    }
    mean_f64(&returns) / downside * bars_per_year.sqrt()
}

/// Calmar = annualized return / max drawdown (both percent).
pub fn calmar_ratio(annualized_return_pct: f64, max_drawdown_pct: f64) -> f64 {
    if max_drawdown_pct <= 0.0 {
        return 0.0;
    }
    annualized_return_pct / max_drawdown_pct
}

/// Win rate in percent.
pub fn win_rate(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Profit factor: gross profits / gross losses.
///
/// Capped at 100.0 for edge cases (all winners, zero losses).
pub fn profit_factor(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { 100.0 } else { 0.0 };
    }
    (gross_profit / gross_loss).min(100.0)
}

/// Buy-and-hold return of the benchmark over the window, in percent.
pub fn buy_and_hold_return(prices: &[f64]) -> f64 {
    total_return(prices)
}

/// Trade count per exit reason.
pub fn exit_reason_breakdown(trades: &[ClosedTrade]) -> BTreeMap<ExitReason, usize> {
    let mut counts = BTreeMap::new();
    for trade in trades {
        *counts.entry(trade.exit_reason).or_insert(0) += 1;
    }
    counts
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Per-bar simple returns of an equity series.
pub fn bar_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

fn per_bar_downside(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    (sum_sq / returns.len() as f64).sqrt()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn max_consecutive(trades: &[ClosedTrade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if trade.is_winner() == winners {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
