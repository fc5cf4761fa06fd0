//! Golden values and signal-engine scenarios.
//!
//! Golden values were computed independently on a fixed 20-bar series.

use chrono::{TimeZone, Utc};
use scorelab_core::domain::PriceBar;
use scorelab_core::indicators::{Bollinger, Indicator, Macd, Rsi};
use scorelab_core::signals::{score, SignalEngine, TechnicalReadings};

const GOLDEN_SERIES: [f64; 20] = [
    100.0, 101.5, 100.8, 102.3, 103.1, 102.4, 104.0, 105.2, 104.6, 106.1, 105.3, 107.0, 108.4,
    107.7, 109.2, 110.0, 109.1, 111.3, 112.0, 111.4,
];

fn bars(prices: &[f64]) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PriceBar::new(start + chrono::Duration::days(i as i64), p))
        .collect()
}

fn assert_close(actual: f64, expected: f64, label: &str) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{label}: expected {expected}, got {actual}"
    );
}

// ── Golden values ────────────────────────────────────────────────────

#[test]
fn golden_rsi() {
    let rsi = Rsi::new(14).compute(&GOLDEN_SERIES);
    assert!(rsi[13].is_nan());
    assert_close(rsi[14], 78.39506172839506, "rsi[14]");
    assert_close(rsi[19], 76.11646573965325, "rsi[19]");
}

#[test]
fn golden_macd_histogram() {
    let line = Macd::line(12, 26, 9).compute(&GOLDEN_SERIES);
    let hist = Macd::histogram(12, 26, 9).compute(&GOLDEN_SERIES);
    assert_close(line[19], 2.725223895753018, "macd line");
    assert_close(hist[19], 0.5344779631725061, "macd histogram");
}

#[test]
fn golden_bollinger() {
    let pct_b = Bollinger::percent_b(20, 2.0).compute(&GOLDEN_SERIES);
    let bandwidth = Bollinger::bandwidth(20, 2.0).compute(&GOLDEN_SERIES);
    let middle = Bollinger::middle(20, 2.0).compute(&GOLDEN_SERIES);
    assert!(pct_b[18].is_nan());
    assert_close(pct_b[19], 0.8666877236974775, "%B");
    assert_close(bandwidth[19], 13.703713478030094, "bandwidth");
    assert_close(middle[19], 106.07, "middle band");
}

#[test]
fn golden_series_through_engine() {
    let result = SignalEngine::new().compute_signal(&bars(&GOLDEN_SERIES), 50);
    assert_eq!(result.data_points, 20);
    assert_close(result.indicators["rsi"], 76.11646573965325, "engine rsi");
    assert_close(
        result.indicators["bollinger_pct_b"],
        0.8666877236974775,
        "engine %B",
    );
    assert_close(result.price, 111.4, "price");
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn flat_series_is_neutral() {
    let result = SignalEngine::new().compute_signal(&bars(&[100.0; 5]), 50);
    assert_close(result.indicators["rsi"], 50.0, "rsi");
    assert_close(result.indicators["momentum_pct"], 0.0, "momentum");
    assert_close(result.long_score, 50.0, "long");
    assert_close(result.short_score, 50.0, "short");
}

#[test]
fn empty_history_is_neutral() {
    let result = SignalEngine::new().compute_signal(&[], 50);
    assert_eq!(result.data_points, 0);
    assert_eq!(result.available_indicators, 0);
    assert_close(result.long_score, 50.0, "long");
}

#[test]
fn scores_bounded_and_directional() {
    let up: Vec<f64> = (0..60).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
    let down: Vec<f64> = (0..60).map(|i| 100.0 * 0.99_f64.powi(i)).collect();
    let engine = SignalEngine::new();

    let up_signal = engine.compute_signal(&bars(&up), 50);
    let down_signal = engine.compute_signal(&bars(&down), 50);
    for s in [&up_signal, &down_signal] {
        assert!((0.0..=100.0).contains(&s.long_score));
        assert!((0.0..=100.0).contains(&s.short_score));
    }
    assert!(up_signal.long_score > up_signal.short_score);
    assert!(down_signal.short_score > down_signal.long_score);
}

#[test]
fn neutral_readings_score_fifty() {
    let breakdown = score(&TechnicalReadings::neutral());
    assert_close(breakdown.long_score, 50.0, "long");
    assert_close(breakdown.short_score, 50.0, "short");
}
