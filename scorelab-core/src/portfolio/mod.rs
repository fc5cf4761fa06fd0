//! Portfolio — open positions, cash, and the exit state machine.
//!
//! Each position goes OPEN → CLOSED(reason) exactly once. Closed positions
//! leave the open set and survive only as [`ClosedTrade`] records.
//!
//! Exit priority on a bar: stop-loss, then take-profit, then trailing stop.
//! Trigger exits fill at the bar's reference price with fees but without
//! slippage.

pub mod ratchet;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::RiskConfig;
use crate::domain::{ClosedTrade, Direction, EquityPoint, ExitReason, Position, PositionId};
use crate::execution::{SimulatedExchange, Side};

pub use ratchet::TrailingRatchet;

/// Bar index and timestamp of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarStamp {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
}

/// A queued entry decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOrder {
    pub token: String,
    pub symbol: String,
    pub direction: Direction,
    /// Bar whose data produced the decision.
    pub signal_bar: usize,
    /// Score that ranked this entry.
    pub score: f64,
    /// ATR at the signal bar, used for stop and target distances.
    pub atr: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryRejection {
    #[error("max positions ({0}) reached")]
    MaxPositions(usize),
    #[error("already holding {0}")]
    AlreadyHolding(String),
    #[error("insufficient cash for a position in {0}")]
    InsufficientCash(String),
    #[error("circuit breaker halted new entries")]
    Halted,
    #[error("no valid price for {0}")]
    NoPrice(String),
}

#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: f64,
    positions: BTreeMap<PositionId, Position>,
    closed_trades: Vec<ClosedTrade>,
    peak_equity: f64,
    current_drawdown_pct: f64,
    halted: bool,
    next_id: u64,
    max_positions: usize,
    risk: RiskConfig,
}

impl Portfolio {
    pub fn new(initial_capital: f64, max_positions: usize, risk: RiskConfig) -> Self {
        Self {
            cash: initial_capital,
            positions: BTreeMap::new(),
            closed_trades: Vec::new(),
            peak_equity: initial_capital,
            current_drawdown_pct: 0.0,
            halted: false,
            next_id: 1,
            max_positions,
            risk,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Open positions in id (opening) order.
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.get(&id)
    }

    pub fn open_count(&self) -> usize {
        self.positions.len()
    }

    pub fn holds(&self, token: &str) -> bool {
        self.positions.values().any(|p| p.token == token)
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed_trades
    }

    pub fn into_closed_trades(self) -> Vec<ClosedTrade> {
        self.closed_trades
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn current_drawdown_pct(&self) -> f64 {
        self.current_drawdown_pct
    }

    /// Sum of open position values at `prices` (entry price when missing).
    pub fn positions_value(&self, prices: &BTreeMap<String, f64>) -> f64 {
        self.positions
            .values()
            .map(|pos| {
                let price = prices.get(&pos.token).copied().unwrap_or(pos.entry_price);
                pos.market_value(price)
            })
            .sum()
    }

    pub fn equity(&self, prices: &BTreeMap<String, f64>) -> f64 {
        self.cash + self.positions_value(prices)
    }

    // ─── Entries ────────────────────────────────────────────────────

    /// Size, fill, and open a position.
    ///
    /// Notional is `equity * max_position_pct / 100`, reduced when cash net
    /// of fees cannot cover it. Stop and target distances come from the
    /// order's ATR and are measured from the fill price.
    pub fn open_position(
        &mut self,
        order: &EntryOrder,
        price_ref: f64,
        prices: &BTreeMap<String, f64>,
        exchange: &SimulatedExchange,
        at: BarStamp,
    ) -> Result<PositionId, EntryRejection> {
        if self.halted {
            return Err(EntryRejection::Halted);
        }
        if self.positions.len() >= self.max_positions {
            return Err(EntryRejection::MaxPositions(self.max_positions));
        }
        if self.holds(&order.token) {
            return Err(EntryRejection::AlreadyHolding(order.token.clone()));
        }
        if !(price_ref.is_finite() && price_ref > 0.0) {
            return Err(EntryRejection::NoPrice(order.token.clone()));
        }

        let equity = self.equity(prices);
        let target = equity * self.risk.max_position_pct / 100.0;
        let notional = self.affordable_notional(target, exchange);
        if !(notional > 0.0) {
            return Err(EntryRejection::InsufficientCash(order.token.clone()));
        }

        let fill = exchange.fill(Side::opening(order.direction), notional, price_ref);
        let size = notional / fill.fill_price;
        let (stop_loss, take_profit) = self.brackets(order.direction, fill.fill_price, order.atr);
        let trailing_stop = self
            .risk
            .trailing_stop_pct
            .map(|pct| TrailingRatchet::new(order.direction, pct).level_at(fill.fill_price));

        let id = PositionId(self.next_id);
        self.next_id += 1;
        self.cash -= notional + fill.total_fees;

        debug!(
            token = %order.token,
            direction = %order.direction,
            bar = at.index,
            price = fill.fill_price,
            notional,
            fees = fill.total_fees,
            "opened position"
        );

        self.positions.insert(
            id,
            Position {
                id,
                token: order.token.clone(),
                symbol: order.symbol.clone(),
                direction: order.direction,
                entry_price: fill.fill_price,
                entry_bar: at.index,
                entry_timestamp: at.timestamp,
                signal_bar: order.signal_bar,
                size,
                cost_basis: notional,
                entry_fees: fill.total_fees,
                stop_loss,
                take_profit,
                trailing_stop,
            },
        );
        Ok(id)
    }

    /// Largest notional up to `target` that cash covers including fees.
    fn affordable_notional(&self, target: f64, exchange: &SimulatedExchange) -> f64 {
        if target + exchange.fees(target) <= self.cash {
            return target;
        }
        let fee_rate = exchange.config().swap_fee_bps / 10_000.0;
        let gas = exchange.config().gas_per_trade_usd;
        ((self.cash - gas) / (1.0 + fee_rate)).min(target)
    }

    /// Stop-loss and take-profit levels. None when ATR or the multiple is zero.
    fn brackets(&self, direction: Direction, entry: f64, atr: f64) -> (Option<f64>, Option<f64>) {
        if !(atr > 0.0) {
            return (None, None);
        }
        let sign = direction.sign();
        let level = |multiple: f64, toward: f64| {
            (multiple > 0.0).then(|| entry + toward * sign * multiple * atr)
        };
        (
            level(self.risk.stop_loss_atr_multiple, -1.0),
            level(self.risk.take_profit_atr_multiple, 1.0),
        )
    }

    // ─── Exits ──────────────────────────────────────────────────────

    /// Close a position and record the trade.
    ///
    /// pnl = gross price P&L - entry fees - exit fees.
    pub fn close_position(
        &mut self,
        id: PositionId,
        exit_price: f64,
        reason: ExitReason,
        fees: f64,
        at: BarStamp,
        exit_signal_bar: Option<usize>,
    ) -> Option<ClosedTrade> {
        let pos = self.positions.remove(&id)?;
        let value = pos.market_value(exit_price);
        self.cash += value - fees;

        let pnl = pos.gross_pnl(exit_price) - pos.entry_fees - fees;
        let pnl_percent = if pos.cost_basis > 0.0 {
            pnl / pos.cost_basis * 100.0
        } else {
            0.0
        };

        debug!(
            token = %pos.token,
            reason = %reason,
            bar = at.index,
            price = exit_price,
            pnl,
            "closed position"
        );

        let trade = ClosedTrade {
            token: pos.token,
            symbol: pos.symbol,
            direction: pos.direction,
            entry_price: pos.entry_price,
            exit_price,
            entry_timestamp: pos.entry_timestamp,
            exit_timestamp: at.timestamp,
            entry_bar: pos.entry_bar,
            exit_bar: at.index,
            signal_bar: pos.signal_bar,
            exit_signal_bar,
            size: pos.size,
            cost_basis: pos.cost_basis,
            pnl,
            pnl_percent,
            holding_bars: at.index.saturating_sub(pos.entry_bar),
            exit_reason: reason,
            fees: pos.entry_fees + fees,
        };
        self.closed_trades.push(trade.clone());
        Some(trade)
    }

    /// Fill an exit through the exchange (with slippage) and close.
    pub fn exit_with_slippage(
        &mut self,
        id: PositionId,
        price_ref: f64,
        reason: ExitReason,
        exchange: &SimulatedExchange,
        at: BarStamp,
        exit_signal_bar: Option<usize>,
    ) -> Option<ClosedTrade> {
        let pos = self.positions.get(&id)?;
        let notional = pos.size * price_ref;
        let fill = exchange.fill(Side::closing(pos.direction), notional, price_ref);
        self.close_position(id, fill.fill_price, reason, fill.total_fees, at, exit_signal_bar)
    }

    /// Close at the reference price, fees only.
    pub fn exit_at_reference(
        &mut self,
        id: PositionId,
        price_ref: f64,
        reason: ExitReason,
        exchange: &SimulatedExchange,
        at: BarStamp,
    ) -> Option<ClosedTrade> {
        let pos = self.positions.get(&id)?;
        let fill = exchange.fill_at_reference(pos.size * price_ref, price_ref);
        self.close_position(id, fill.fill_price, reason, fill.total_fees, at, None)
    }

    /// Which bracket, if any, `price` triggers for `pos`, in priority order.
    pub fn triggered_exit(pos: &Position, price: f64) -> Option<ExitReason> {
        let adverse = |level: f64| ratchet::stop_hit(pos.direction, level, price);
        let favorable = |level: f64| match pos.direction {
            Direction::Long => price >= level,
            Direction::Short => price <= level,
        };

        if pos.stop_loss.is_some_and(adverse) {
            Some(ExitReason::StopLoss)
        } else if pos.take_profit.is_some_and(favorable) {
            Some(ExitReason::TakeProfit)
        } else if pos.trailing_stop.is_some_and(adverse) {
            Some(ExitReason::TrailingStop)
        } else {
            None
        }
    }

    /// Evaluate stop-loss, take-profit and trailing stop for every open
    /// position at this bar's prices, then ratchet survivors' trailing stops.
    pub fn check_orders(
        &mut self,
        at: BarStamp,
        current_prices: &BTreeMap<String, f64>,
        exchange: &SimulatedExchange,
    ) -> Vec<ClosedTrade> {
        let mut closed = Vec::new();
        let ids: Vec<PositionId> = self.positions.keys().copied().collect();

        for id in ids {
            let Some(pos) = self.positions.get(&id) else {
                continue;
            };
            let Some(&price) = current_prices.get(&pos.token) else {
                continue;
            };

            if let Some(reason) = Self::triggered_exit(pos, price) {
                if let Some(trade) = self.exit_at_reference(id, price, reason, exchange, at) {
                    closed.push(trade);
                }
                continue;
            }

            if let (Some(pct), Some(pos)) = (self.risk.trailing_stop_pct, self.positions.get_mut(&id)) {
                let ratchet = TrailingRatchet::new(pos.direction, pct);
                pos.trailing_stop = pos.trailing_stop.map(|level| ratchet.apply(level, price));
            }
        }

        closed
    }

    /// Close every open position at its reference price.
    pub fn liquidate_all(
        &mut self,
        reason: ExitReason,
        current_prices: &BTreeMap<String, f64>,
        exchange: &SimulatedExchange,
        at: BarStamp,
    ) -> Vec<ClosedTrade> {
        let ids: Vec<PositionId> = self.positions.keys().copied().collect();
        ids.into_iter()
            .filter_map(|id| {
                let pos = self.positions.get(&id)?;
                let price = current_prices
                    .get(&pos.token)
                    .copied()
                    .unwrap_or(pos.entry_price);
                self.exit_at_reference(id, price, reason, exchange, at)
            })
            .collect()
    }

    // ─── Valuation and risk ─────────────────────────────────────────

    /// Snapshot equity at this bar and update the running peak.
    pub fn mark_to_market(
        &mut self,
        at: BarStamp,
        current_prices: &BTreeMap<String, f64>,
    ) -> EquityPoint {
        let positions_value = self.positions_value(current_prices);
        let equity = self.cash + positions_value;
        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        self.current_drawdown_pct = if self.peak_equity > 0.0 {
            ((self.peak_equity - equity) / self.peak_equity * 100.0).max(0.0)
        } else {
            0.0
        };

        EquityPoint {
            timestamp: at.timestamp,
            bar_index: at.index,
            equity,
            cash: self.cash,
            positions_value,
            drawdown_pct: self.current_drawdown_pct,
        }
    }

    /// Latch the halt flag once drawdown exceeds `max_drawdown_pct`.
    pub fn check_circuit_breaker(&mut self, max_drawdown_pct: f64) -> bool {
        if !self.halted && self.current_drawdown_pct > max_drawdown_pct {
            self.halted = true;
        }
        self.halted
    }
}
