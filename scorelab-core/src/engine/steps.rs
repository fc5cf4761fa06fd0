//! Per-bar step functions.
//!
//! Each step takes the state by value and returns it, so steps compose into
//! the loop and can be driven one at a time in tests. Order within a bar:
//!
//! 0. `fill_pending`: last bar's decisions fill at this bar's price
//! 1. `check_orders`: stop-loss, take-profit, trailing stop
//! 2. `update_trend_gate`
//! 3. `compute_signals`
//! 4. `close_positions`: queue signal exits
//! 5. `rank_and_open`: queue entries
//! 6. `record_equity`
//! 7. `check_circuit_breaker`

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::align::AlignedSeries;
use super::state::{EngineError, PendingExit, SimulationState};
use super::trend::{evaluate_gate, TrendGate};
use crate::config::BacktestConfig;
use crate::domain::{Direction, ExitReason};
use crate::execution::SimulatedExchange;
use crate::portfolio::{BarStamp, EntryOrder};
use crate::signals::SignalEngine;

/// Read-only inputs for one bar.
pub struct BarContext<'a> {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    /// Every aligned token's price at this bar.
    pub prices: BTreeMap<String, f64>,
    pub is_final: bool,
    pub data: &'a AlignedSeries,
    pub config: &'a BacktestConfig,
    pub exchange: &'a SimulatedExchange,
    pub signals: &'a SignalEngine,
}

impl BarContext<'_> {
    pub fn stamp(&self) -> BarStamp {
        BarStamp {
            index: self.index,
            timestamp: self.timestamp,
        }
    }

    /// Whether entries and signal exits may be decided on this bar.
    pub fn decides(&self) -> bool {
        !self.is_final && self.index >= self.config.strategy.warmup_bars
    }

    fn price(&self, token: &str) -> Option<f64> {
        self.prices.get(token).copied()
    }
}

fn finite(value: f64, bar: usize, field: &'static str) -> Result<f64, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFinite { bar, field })
    }
}

// ─── 0. Pending fills ───────────────────────────────────────────────

/// Fill the previous bar's decisions: signal exits first, then entries.
pub fn fill_pending(
    mut state: SimulationState,
    ctx: &BarContext<'_>,
) -> Result<SimulationState, EngineError> {
    for exit in std::mem::take(&mut state.pending_exits) {
        debug_assert!(exit.signal_bar < ctx.index);
        let Some(price) = ctx.price(&exit.token) else {
            continue;
        };
        if let Some(trade) = state.portfolio.exit_with_slippage(
            exit.position,
            price,
            ExitReason::Signal,
            ctx.exchange,
            ctx.stamp(),
            Some(exit.signal_bar),
        ) {
            finite(trade.exit_price, ctx.index, "exit fill price")?;
        }
    }

    for order in std::mem::take(&mut state.pending_entries) {
        debug_assert!(order.signal_bar < ctx.index);
        let price = ctx.price(&order.token).unwrap_or(f64::NAN);
        match state
            .portfolio
            .open_position(&order, price, &ctx.prices, ctx.exchange, ctx.stamp())
        {
            Ok(id) => {
                if let Some(pos) = state.portfolio.position(id) {
                    finite(pos.entry_price, ctx.index, "entry fill price")?;
                }
            }
            Err(reason) => {
                warn!(token = %order.token, bar = ctx.index, %reason, "entry rejected");
                state.rejected_entries += 1;
            }
        }
    }

    finite(state.portfolio.cash(), ctx.index, "cash")?;
    Ok(state)
}

// ─── 1. Trigger exits ───────────────────────────────────────────────

pub fn check_orders(mut state: SimulationState, ctx: &BarContext<'_>) -> SimulationState {
    let closed = state
        .portfolio
        .check_orders(ctx.stamp(), &ctx.prices, ctx.exchange);
    if !closed.is_empty() {
        debug!(bar = ctx.index, count = closed.len(), "trigger exits");
    }
    state
}

// ─── 2. Trend gate ──────────────────────────────────────────────────

pub fn update_trend_gate(mut state: SimulationState, ctx: &BarContext<'_>) -> SimulationState {
    let filter = &ctx.config.strategy.trend_filter;
    state.gate = if filter.enabled {
        ctx.data
            .bars(&filter.token)
            .map(|bars| {
                let history: Vec<f64> = bars[..=ctx.index].iter().map(|b| b.price).collect();
                evaluate_gate(&history, filter.ma_period)
            })
            .unwrap_or(TrendGate::Open)
    } else {
        TrendGate::Open
    };
    state
}

// ─── 3. Signals ─────────────────────────────────────────────────────

/// Score every traded token on bars `[0..=t]`, limited to the lookback.
pub fn compute_signals(mut state: SimulationState, ctx: &BarContext<'_>) -> SimulationState {
    let lookback = ctx.config.strategy.lookback_bars;
    state.signals = ctx
        .config
        .tokens
        .iter()
        .filter_map(|token| {
            let bars = ctx.data.bars(token)?;
            let history = &bars[..=ctx.index];
            Some((token.clone(), ctx.signals.compute_signal(history, lookback)))
        })
        .collect();
    state
}

// ─── 4. Signal exits ────────────────────────────────────────────────

/// Queue exits for positions whose own-direction score fell below the exit
/// threshold.
pub fn close_positions(mut state: SimulationState, ctx: &BarContext<'_>) -> SimulationState {
    if !ctx.decides() {
        return state;
    }
    let strategy = &ctx.config.strategy;
    let mut exits = Vec::new();

    for pos in state.portfolio.positions() {
        if state.has_pending_exit(pos.id) {
            continue;
        }
        let Some(signal) = state.signals.get(&pos.token) else {
            continue;
        };
        let threshold = match pos.direction {
            Direction::Long => strategy.exit_threshold,
            Direction::Short => strategy.short_exit_threshold,
        };
        if signal.score_for(pos.direction) < threshold {
            debug!(token = %pos.token, bar = ctx.index, "signal exit queued");
            exits.push(PendingExit {
                position: pos.id,
                token: pos.token.clone(),
                signal_bar: ctx.index,
            });
        }
    }

    state.pending_exits.extend(exits);
    state
}

// ─── 5. Entries ─────────────────────────────────────────────────────

/// Rank candidates by score and queue entries into free slots.
pub fn rank_and_open(mut state: SimulationState, ctx: &BarContext<'_>) -> SimulationState {
    if !ctx.decides() || state.portfolio.is_halted() {
        return state;
    }
    let strategy = &ctx.config.strategy;

    // Positions with a queued exit release their slot before entries fill.
    let occupied = state
        .portfolio
        .open_count()
        .saturating_sub(state.pending_exits.len());
    let free_slots = strategy.max_positions.saturating_sub(occupied + state.pending_entries.len());
    if free_slots == 0 {
        return state;
    }

    let mut candidates: Vec<(usize, EntryOrder)> = ctx
        .config
        .tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !state.portfolio.holds(token))
        .filter(|(_, token)| !state.pending_entries.iter().any(|o| &o.token == *token))
        .filter_map(|(rank, token)| {
            let signal = state.signals.get(token)?;
            let long = (state.gate.allows(Direction::Long)
                && signal.long_score > strategy.entry_threshold)
                .then_some((Direction::Long, signal.long_score));
            let short = (strategy.use_shorts
                && state.gate.allows(Direction::Short)
                && signal.short_score > strategy.short_entry_threshold)
                .then_some((Direction::Short, signal.short_score));
            let (direction, score) = match (long, short) {
                (Some(l), Some(s)) => {
                    if s.1 > l.1 {
                        s
                    } else {
                        l
                    }
                }
                (Some(l), None) => l,
                (None, Some(s)) => s,
                (None, None) => return None,
            };
            Some((
                rank,
                EntryOrder {
                    token: token.clone(),
                    symbol: token.clone(),
                    direction,
                    signal_bar: ctx.index,
                    score,
                    atr: signal.atr,
                },
            ))
        })
        .collect();

    candidates.sort_by(|(ra, a), (rb, b)| b.score.total_cmp(&a.score).then(ra.cmp(rb)));

    for (_, order) in candidates.into_iter().take(free_slots) {
        debug!(
            token = %order.token,
            direction = %order.direction,
            score = order.score,
            bar = ctx.index,
            "entry queued"
        );
        state.pending_entries.push(order);
    }
    state
}

// ─── 6. Equity ──────────────────────────────────────────────────────

pub fn record_equity(
    mut state: SimulationState,
    ctx: &BarContext<'_>,
) -> Result<SimulationState, EngineError> {
    let point = state.portfolio.mark_to_market(ctx.stamp(), &ctx.prices);
    finite(point.equity, ctx.index, "equity")?;
    state.equity_curve.push(point);
    Ok(state)
}

// ─── 7. Circuit breaker ─────────────────────────────────────────────

pub fn check_circuit_breaker(mut state: SimulationState, ctx: &BarContext<'_>) -> SimulationState {
    let risk = &ctx.config.risk;
    let was_halted = state.portfolio.is_halted();
    if !state.portfolio.check_circuit_breaker(risk.max_drawdown_pct) || was_halted {
        return state;
    }

    warn!(
        bar = ctx.index,
        drawdown_pct = state.portfolio.current_drawdown_pct(),
        "circuit breaker tripped, new entries halted"
    );
    state.circuit_breaker_bar = Some(ctx.index);
    state.pending_entries.clear();

    if risk.liquidate_on_circuit_breaker {
        state.pending_exits.clear();
        state.portfolio.liquidate_all(
            ExitReason::CircuitBreaker,
            &ctx.prices,
            ctx.exchange,
            ctx.stamp(),
        );
    }
    state
}

// ─── Final bar ──────────────────────────────────────────────────────

/// Close everything at the last price and drop undecidable orders.
pub fn close_end_of_data(mut state: SimulationState, ctx: &BarContext<'_>) -> SimulationState {
    state.pending_exits.clear();
    state.pending_entries.clear();
    state
        .portfolio
        .liquidate_all(ExitReason::EndOfData, &ctx.prices, ctx.exchange, ctx.stamp());
    state
}
