//! End-to-end engine scenarios on hand-checkable price paths.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use scorelab_core::config::ExecutionConfig;
use scorelab_core::domain::{Direction, ExitReason, PriceBar};
use scorelab_core::{BacktestConfig, BacktestEngine, EngineError, RunResult};

fn bars(prices: &[f64]) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PriceBar::new(start + chrono::Duration::days(i as i64), p))
        .collect()
}

fn config(tokens: &[&str]) -> BacktestConfig {
    BacktestConfig::new(
        tokens.iter().map(|t| t.to_string()).collect(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    )
}

fn run(config: BacktestConfig, series: &[(&str, Vec<f64>)]) -> RunResult {
    let map: BTreeMap<String, Vec<PriceBar>> = series
        .iter()
        .map(|(token, prices)| (token.to_string(), bars(prices)))
        .collect();
    BacktestEngine::new(config, map).unwrap().run().unwrap()
}

fn assert_equity_identity(result: &RunResult) {
    for point in &result.equity_curve {
        assert!(
            (point.equity - (point.cash + point.positions_value)).abs() < 1e-6,
            "equity identity violated at bar {}",
            point.bar_index
        );
    }
}

#[test]
fn flat_series_trades_nothing() {
    let result = run(config(&["A"]), &[("A", vec![100.0; 5])]);
    assert!(result.trades.is_empty());
    assert_eq!(result.bar_count, 5);
    assert_eq!(result.equity_curve.len(), 5);
    assert!(result.equity_curve.iter().all(|p| p.equity == 10_000.0));
    assert_eq!(result.final_equity, 10_000.0);
}

#[test]
fn rising_series_enters_one_bar_after_signal() {
    let prices: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * 50.0 / 9.0).collect();
    let mut cfg = config(&["A"]);
    cfg.strategy.entry_threshold = 50.0;
    cfg.strategy.exit_threshold = 0.0;

    // Bar 0 scores exactly 50, which does not clear a threshold of 50.
    let result = run(cfg, &[("A", prices.clone())]);
    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.direction, Direction::Long);
    assert_eq!(trade.signal_bar, 1);
    assert_eq!(trade.entry_bar, 2);
    // Default 30 bps slippage on the buy
    assert!((trade.entry_price - prices[2] * 1.003).abs() < 1e-9);
    assert_eq!(trade.exit_reason, ExitReason::EndOfData);
    assert_eq!(trade.exit_bar, 9);
    assert_eq!(trade.exit_price, 150.0);
    assert!(trade.pnl > 0.0);
    assert_equity_identity(&result);
}

#[test]
fn score_equal_to_threshold_does_not_enter() {
    let mut cfg = config(&["A"]);
    cfg.strategy.entry_threshold = 50.0;
    cfg.strategy.use_shorts = true;
    cfg.strategy.short_entry_threshold = 50.0;

    // Flat prices score exactly 50 on both sides.
    let result = run(cfg, &[("A", vec![100.0; 5])]);
    assert!(result.trades.is_empty());
}

#[test]
fn entry_decided_on_first_bar() {
    let prices: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * 50.0 / 9.0).collect();
    let mut cfg = config(&["A"]);
    cfg.strategy.entry_threshold = 40.0;
    cfg.strategy.exit_threshold = 0.0;

    let result = run(cfg, &[("A", prices.clone())]);
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].signal_bar, 0);
    assert_eq!(result.trades[0].entry_bar, 1);
    assert!((result.trades[0].entry_price - prices[1] * 1.003).abs() < 1e-9);
}

#[test]
fn short_round_trip_exits_on_signal() {
    let prices: Vec<f64> = (0..8).map(|i| 100.0 * 0.9f64.powi(i)).collect();
    let mut cfg = config(&["A"]);
    cfg.strategy.entry_threshold = 100.0;
    cfg.strategy.use_shorts = true;
    cfg.strategy.short_entry_threshold = 50.0;
    // Any score queues the exit on the first decision after entry.
    cfg.strategy.short_exit_threshold = 100.0;

    let result = run(cfg, &[("A", prices.clone())]);
    let trade = &result.trades[0];
    assert_eq!(trade.direction, Direction::Short);
    assert_eq!(trade.signal_bar, 1);
    assert_eq!(trade.entry_bar, 2);
    // Selling short slips down, buying back slips up.
    assert!((trade.entry_price - prices[2] * 0.997).abs() < 1e-9);
    assert_eq!(trade.exit_reason, ExitReason::Signal);
    assert_eq!(trade.exit_signal_bar, Some(2));
    assert_eq!(trade.exit_bar, 3);
    assert!((trade.exit_price - prices[3] * 1.003).abs() < 1e-9);
    assert!(trade.pnl > 0.0, "short on a falling series lost {}", trade.pnl);
    assert!(result.trades.iter().all(|t| t.direction == Direction::Short));
    assert!(result
        .trades
        .iter()
        .all(|t| t.signal_bar < t.entry_bar && t.exit_signal_bar.map_or(true, |b| b < t.exit_bar)));
    assert_equity_identity(&result);
}

#[test]
fn queued_signal_exit_fills_before_trailing_stop() {
    let prices = vec![100.0, 110.0, 120.0, 84.0, 84.0, 84.0];
    let mut cfg = config(&["A"]);
    cfg.strategy.entry_threshold = 50.0;
    cfg.strategy.exit_threshold = 100.0;
    cfg.risk.trailing_stop_pct = Some(5.0);

    let result = run(cfg, &[("A", prices.clone())]);
    let trade = &result.trades[0];
    assert_eq!(trade.entry_bar, 2);
    assert_eq!(trade.exit_bar, 3);
    // The crash would trip the trailing stop, but the queued exit fills first.
    assert_eq!(trade.exit_reason, ExitReason::Signal);
    assert!((trade.exit_price - prices[3] * 0.997).abs() < 1e-9);
    assert_equity_identity(&result);
}

#[test]
fn crash_hits_stop_loss_on_the_same_bar() {
    let mut prices: Vec<f64> = (0..22).map(|i| 100.0 + 0.5 * i as f64 + (i % 2) as f64).collect();
    let crash = prices[21] * 0.7;
    prices.push(crash);
    prices.push(crash);

    let mut cfg = config(&["A"]);
    cfg.strategy.warmup_bars = 20;
    cfg.strategy.entry_threshold = 0.0;
    cfg.strategy.exit_threshold = 0.0;

    let result = run(cfg, &[("A", prices.clone())]);
    let first = &result.trades[0];
    assert_eq!(first.signal_bar, 20);
    assert_eq!(first.entry_bar, 21);
    assert_eq!(first.exit_bar, 22);
    assert_eq!(first.exit_reason, ExitReason::StopLoss);
    // Trigger exits fill at the reference price
    assert_eq!(first.exit_price, crash);
    assert!(first.pnl < 0.0);
    assert_equity_identity(&result);
}

#[test]
fn max_positions_respected() {
    let rise: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let mut cfg = config(&["A", "B", "C", "D"]);
    cfg.strategy.entry_threshold = 0.0;
    cfg.strategy.exit_threshold = 0.0;
    cfg.strategy.max_positions = 2;

    let result = run(
        cfg,
        &[("A", rise.clone()), ("B", rise.clone()), ("C", rise.clone()), ("D", rise.clone())],
    );
    for bar in 0..result.bar_count {
        let open = result
            .trades
            .iter()
            .filter(|t| t.entry_bar <= bar && bar < t.exit_bar)
            .count();
        assert!(open <= 2, "{open} positions open at bar {bar}");
    }
    let tokens: Vec<&str> = result.trades.iter().map(|t| t.token.as_str()).collect();
    assert_eq!(tokens, vec!["A", "B"]);
}

#[test]
fn identical_inputs_serialize_identically() {
    let a: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0).collect();
    let b: Vec<f64> = (0..80).map(|i| 50.0 + (i as f64 * 0.17).cos() * 5.0).collect();
    let mut cfg = config(&["A", "B"]);
    cfg.strategy.entry_threshold = 52.0;
    cfg.strategy.use_shorts = true;
    cfg.strategy.short_entry_threshold = 52.0;

    let first = run(cfg.clone(), &[("A", a.clone()), ("B", b.clone())]);
    let second = run(cfg, &[("A", a.clone()), ("B", b.clone())]);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_equity_identity(&first);
}

#[test]
fn circuit_breaker_halts_entries() {
    let mut prices: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    prices.extend((0..10).map(|i| 40.0 + i as f64));
    let mut cfg = config(&["A"]);
    cfg.strategy.entry_threshold = 0.0;
    cfg.strategy.exit_threshold = 0.0;
    cfg.risk.max_position_pct = 100.0;
    cfg.risk.max_drawdown_pct = 10.0;
    cfg.risk.stop_loss_atr_multiple = 0.0;
    cfg.execution = ExecutionConfig::frictionless();

    let result = run(cfg, &[("A", prices.clone())]);
    assert_eq!(result.circuit_breaker_bar, Some(10));
    // The open position is still managed and closed at the end.
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].exit_reason, ExitReason::EndOfData);
}

#[test]
fn trend_filter_blocks_counter_trend_entries() {
    let falling: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
    let rising: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let mut cfg = config(&["A"]);
    cfg.strategy.entry_threshold = 0.0;
    cfg.strategy.exit_threshold = 0.0;
    cfg.strategy.trend_filter.enabled = true;
    cfg.strategy.trend_filter.token = "REF".into();
    cfg.strategy.trend_filter.ma_period = 5;
    // No decisions until the SMA has its full window.
    cfg.strategy.warmup_bars = 5;

    // Falling reference admits shorts only, and shorts are disabled.
    let result = run(cfg.clone(), &[("A", rising.clone()), ("REF", falling.clone())]);
    assert!(result.trades.is_empty());

    let result = run(cfg, &[("A", rising.clone()), ("REF", rising.clone())]);
    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].signal_bar, 5);
}

#[test]
fn missing_series_is_an_error() {
    let map: BTreeMap<String, Vec<PriceBar>> = BTreeMap::new();
    let err = BacktestEngine::new(config(&["A"]), map).err().unwrap();
    assert!(matches!(err, EngineError::MissingSeries(t) if t == "A"));
}

#[test]
fn empty_series_produces_empty_result() {
    let result = run(config(&["A"]), &[("A", Vec::new())]);
    assert_eq!(result.bar_count, 0);
    assert!(result.equity_curve.is_empty());
    assert!(result.trades.is_empty());
    assert_eq!(result.final_equity, 10_000.0);
}

#[test]
fn gaps_are_forward_filled_and_reported() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let day = |d: i64| start + chrono::Duration::days(d);
    let mut map = BTreeMap::new();
    map.insert(
        "A".to_string(),
        (0..5).map(|d| PriceBar::new(day(d), 100.0)).collect::<Vec<_>>(),
    );
    map.insert(
        "B".to_string(),
        vec![PriceBar::new(day(0), 10.0), PriceBar::new(day(4), 10.0)],
    );
    let result = BacktestEngine::new(config(&["A", "B"]), map)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(result.bar_count, 5);
    assert_eq!(result.data_warnings, vec!["B: 3 missing bars forward-filled".to_string()]);
}
