//! SignalEngine — raw indicator readings from a lookback window, scored.
//!
//! The engine only gathers readings; every conversion and the weighting live
//! in `signals::convert`. Indicators without enough history contribute their
//! neutral default, and the result reports how many were actually measured
//! so a caller can discount thin data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::PriceBar;
use crate::indicators::{
    Adx, Aroon, Atr, Bollinger, HistVolatility, Indicator, Macd, Momentum, Roc, Rsi, StochRsi,
    Vwap, WilliamsR,
};
use crate::signals::convert::{self, trend_composite, TechnicalReadings};

/// Per-token, per-bar score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub long_score: f64,
    pub short_score: f64,
    /// Raw ATR in price units (0 when unavailable).
    pub atr: f64,
    /// Last price of the window.
    pub price: f64,
    /// Raw readings after neutral-default substitution, keyed by name.
    pub indicators: BTreeMap<String, f64>,
    /// Number of price points the window actually contained.
    pub data_points: usize,
    /// How many of the 13 indicators had enough history to be measured.
    pub available_indicators: usize,
}

impl SignalResult {
    /// Score of the given direction.
    pub fn score_for(&self, direction: crate::domain::Direction) -> f64 {
        match direction {
            crate::domain::Direction::Long => self.long_score,
            crate::domain::Direction::Short => self.short_score,
        }
    }
}

/// Indicator set with the standard periods.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    rsi: Rsi,
    macd_hist: Macd,
    adx: Adx,
    plus_di: Adx,
    minus_di: Adx,
    aroon: Aroon,
    stoch_rsi: StochRsi,
    williams_r: WilliamsR,
    roc: Roc,
    atr: Atr,
    volatility: HistVolatility,
    vwap_deviation: Vwap,
    bollinger_pct_b: Bollinger,
    bollinger_bandwidth: Bollinger,
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalEngine {
    pub fn new() -> Self {
        Self {
            rsi: Rsi::new(14),
            macd_hist: Macd::histogram(12, 26, 9),
            adx: Adx::new(14),
            plus_di: Adx::plus_di(14),
            minus_di: Adx::minus_di(14),
            aroon: Aroon::oscillator(25),
            stoch_rsi: StochRsi::new(14, 14, 3),
            williams_r: WilliamsR::new(14),
            roc: Roc::new(10),
            atr: Atr::new(14),
            volatility: HistVolatility::new(20),
            vwap_deviation: Vwap::deviation(),
            bollinger_pct_b: Bollinger::percent_b(20, 2.0),
            bollinger_bandwidth: Bollinger::bandwidth(20, 2.0),
        }
    }

    /// Score the last `lookback_bars` points of `history`.
    ///
    /// Only bars up to and including the last element are read; callers pass
    /// the history ending at the decision bar.
    pub fn compute_signal(&self, history: &[PriceBar], lookback_bars: usize) -> SignalResult {
        let start = history.len().saturating_sub(lookback_bars.max(1));
        let prices: Vec<f64> = history[start..].iter().map(|b| b.price).collect();
        self.compute_from_prices(&prices)
    }

    /// Score a price window directly.
    pub fn compute_from_prices(&self, prices: &[f64]) -> SignalResult {
        let price = prices.last().copied().unwrap_or(0.0);
        let neutral = TechnicalReadings::neutral();
        let mut available = 0;

        let momentum_pct = read(Momentum::over_window(prices), neutral.momentum_pct, &mut available);
        let rsi = read(self.rsi.last_value(prices), neutral.rsi, &mut available);
        let macd_histogram = read(
            self.macd_hist.last_value(prices),
            neutral.macd_histogram,
            &mut available,
        );

        let (adx, plus_di, minus_di) = match (
            self.adx.last_value(prices),
            self.plus_di.last_value(prices),
            self.minus_di.last_value(prices),
        ) {
            (Some(a), Some(p), Some(m)) => {
                available += 1;
                (a, p, m)
            }
            _ => (neutral.adx, neutral.plus_di, neutral.minus_di),
        };

        let aroon_oscillator = read(
            self.aroon.last_value(prices),
            neutral.aroon_oscillator,
            &mut available,
        );
        let stoch_rsi_k = read(self.stoch_rsi.last_value(prices), neutral.stoch_rsi_k, &mut available);
        let williams_r = read(self.williams_r.last_value(prices), neutral.williams_r, &mut available);
        let roc = read(self.roc.last_value(prices), neutral.roc, &mut available);

        let atr = read(self.atr.last_value(prices), 0.0, &mut available);
        let atr_pct = if price > 0.0 { atr / price * 100.0 } else { neutral.atr_pct };

        let hist_volatility_pct = read(
            self.volatility.last_value(prices),
            neutral.hist_volatility_pct,
            &mut available,
        );
        let vwap_deviation_pct = read(
            self.vwap_deviation.last_value(prices),
            neutral.vwap_deviation_pct,
            &mut available,
        );

        let (bollinger_pct_b, bollinger_bandwidth) = match (
            self.bollinger_pct_b.last_value(prices),
            self.bollinger_bandwidth.last_value(prices),
        ) {
            (Some(b), Some(w)) => {
                available += 1;
                (b, w)
            }
            _ => (neutral.bollinger_pct_b, neutral.bollinger_bandwidth),
        };

        // The trend composite counts as measured once momentum and MACD have two points.
        if prices.len() >= 2 {
            available += 1;
        }

        let readings = TechnicalReadings {
            momentum_pct,
            rsi,
            macd_histogram,
            adx,
            plus_di,
            minus_di,
            aroon_oscillator,
            stoch_rsi_k,
            williams_r,
            roc,
            atr_pct,
            hist_volatility_pct,
            vwap_deviation_pct,
            bollinger_pct_b,
            bollinger_bandwidth,
        };
        let breakdown = convert::score(&readings);

        let mut indicators = BTreeMap::new();
        indicators.insert("momentum_pct".to_string(), momentum_pct);
        indicators.insert("rsi".to_string(), rsi);
        indicators.insert("macd_histogram".to_string(), macd_histogram);
        indicators.insert("adx".to_string(), adx);
        indicators.insert("plus_di".to_string(), plus_di);
        indicators.insert("minus_di".to_string(), minus_di);
        indicators.insert("aroon_oscillator".to_string(), aroon_oscillator);
        indicators.insert("stoch_rsi_k".to_string(), stoch_rsi_k);
        indicators.insert("williams_r".to_string(), williams_r);
        indicators.insert("roc".to_string(), roc);
        indicators.insert("atr".to_string(), atr);
        indicators.insert("atr_pct".to_string(), atr_pct);
        indicators.insert("hist_volatility_pct".to_string(), hist_volatility_pct);
        indicators.insert("vwap_deviation_pct".to_string(), vwap_deviation_pct);
        indicators.insert("bollinger_pct_b".to_string(), bollinger_pct_b);
        indicators.insert("bollinger_bandwidth".to_string(), bollinger_bandwidth);
        indicators.insert(
            "trend_composite".to_string(),
            trend_composite(momentum_pct, macd_histogram, aroon_oscillator, roc),
        );

        SignalResult {
            long_score: breakdown.long_score,
            short_score: breakdown.short_score,
            atr,
            price,
            indicators,
            data_points: prices.len(),
            available_indicators: available,
        }
    }
}

/// Take a measured reading, or fall back to its neutral default.
fn read(value: Option<f64>, default: f64, available: &mut usize) -> f64 {
    match value {
        Some(v) => {
            *available += 1;
            v
        }
        None => default,
    }
}
