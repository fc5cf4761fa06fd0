//! Criterion benchmarks for scorelab hot paths.
//!
//! Benchmarks:
//! 1. Full engine run over several tokens
//! 2. Signal engine scoring of one lookback window

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use scorelab_core::domain::PriceBar;
use scorelab_core::signals::SignalEngine;
use scorelab_core::{BacktestConfig, BacktestEngine};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize, phase: f64) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let price = 100.0 + (i as f64 * 0.1 + phase).sin() * 10.0 + i as f64 * 0.02;
            PriceBar::new(start + chrono::Duration::days(i as i64), price)
        })
        .collect()
}

fn make_series(tokens: &[&str], n: usize) -> BTreeMap<String, Vec<PriceBar>> {
    tokens
        .iter()
        .enumerate()
        .map(|(k, t)| (t.to_string(), make_bars(n, k as f64)))
        .collect()
}

fn bench_config(tokens: &[&str]) -> BacktestConfig {
    let mut config = BacktestConfig::new(
        tokens.iter().map(|t| t.to_string()).collect(),
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    );
    config.strategy.entry_threshold = 55.0;
    config.strategy.use_shorts = true;
    config.strategy.short_entry_threshold = 55.0;
    config
}

// ── 1. Engine loop ───────────────────────────────────────────────────

fn bench_engine_run(c: &mut Criterion) {
    let tokens = ["WETH", "ARB", "GMX", "LINK", "UNI"];
    let mut group = c.benchmark_group("engine_run");

    for bars in [250usize, 1000] {
        let config = bench_config(&tokens);
        let series = make_series(&tokens, bars);
        group.bench_with_input(BenchmarkId::from_parameter(bars), &bars, |b, _| {
            b.iter(|| {
                let engine = BacktestEngine::new(config.clone(), series.clone()).unwrap();
                black_box(engine.run().unwrap())
            })
        });
    }
    group.finish();
}

// ── 2. Signal scoring ────────────────────────────────────────────────

fn bench_signal_engine(c: &mut Criterion) {
    let engine = SignalEngine::new();
    let history = make_bars(500, 0.0);

    c.bench_function("signal_engine_lookback_50", |b| {
        b.iter(|| black_box(engine.compute_signal(black_box(&history), 50)))
    });
}

criterion_group!(benches, bench_engine_run, bench_signal_engine);
criterion_main!(benches);
