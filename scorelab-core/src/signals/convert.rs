//! Indicator-to-signal conversion functions and the weight table.
//!
//! Each conversion maps one raw indicator reading to a long value and a short
//! value in [0, 100]. The two values are computed independently and need not
//! sum to 100. `score` combines all thirteen with the weight table and
//! renormalizes by `TOTAL_TECH_WEIGHT`.
//!
//! Every function here is pure and public so the backtest and any live scorer
//! share exactly the same arithmetic.

use serde::{Deserialize, Serialize};

/// Sum of the technical weights (the technical share of the full weighting).
pub const TOTAL_TECH_WEIGHT: f64 = 0.47;

/// A directional pair of signal values, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPair {
    pub long: f64,
    pub short: f64,
}

impl SignalPair {
    pub fn new(long: f64, short: f64) -> Self {
        Self {
            long: clamp_score(long),
            short: clamp_score(short),
        }
    }

    /// Same value for both directions.
    pub fn symmetric(value: f64) -> Self {
        Self::new(value, value)
    }
}

/// The thirteen scored indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Momentum,
    Rsi,
    Macd,
    Adx,
    Aroon,
    StochRsi,
    WilliamsR,
    Roc,
    AtrPct,
    HistVolatility,
    VwapDeviation,
    Bollinger,
    TrendStrength,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 13] = [
        IndicatorKind::Momentum,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Adx,
        IndicatorKind::Aroon,
        IndicatorKind::StochRsi,
        IndicatorKind::WilliamsR,
        IndicatorKind::Roc,
        IndicatorKind::AtrPct,
        IndicatorKind::HistVolatility,
        IndicatorKind::VwapDeviation,
        IndicatorKind::Bollinger,
        IndicatorKind::TrendStrength,
    ];

    pub fn weight(self) -> f64 {
        match self {
            IndicatorKind::Momentum => 0.05,
            IndicatorKind::Rsi => 0.04,
            IndicatorKind::Macd => 0.04,
            IndicatorKind::Adx => 0.05,
            IndicatorKind::Aroon => 0.03,
            IndicatorKind::StochRsi => 0.04,
            IndicatorKind::WilliamsR => 0.03,
            IndicatorKind::Roc => 0.03,
            IndicatorKind::AtrPct => 0.03,
            IndicatorKind::HistVolatility => 0.02,
            IndicatorKind::VwapDeviation => 0.03,
            IndicatorKind::Bollinger => 0.03,
            IndicatorKind::TrendStrength => 0.05,
        }
    }
}

/// Raw indicator readings for one token at one bar.
///
/// Missing readings must already be replaced by their neutral defaults
/// (see [`TechnicalReadings::neutral`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalReadings {
    pub momentum_pct: f64,
    pub rsi: f64,
    pub macd_histogram: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub aroon_oscillator: f64,
    pub stoch_rsi_k: f64,
    pub williams_r: f64,
    pub roc: f64,
    pub atr_pct: f64,
    pub hist_volatility_pct: f64,
    pub vwap_deviation_pct: f64,
    pub bollinger_pct_b: f64,
    pub bollinger_bandwidth: f64,
}

impl TechnicalReadings {
    /// Readings used when no indicator has enough history.
    pub fn neutral() -> Self {
        Self {
            momentum_pct: 0.0,
            rsi: 50.0,
            macd_histogram: 0.0,
            adx: 0.0,
            plus_di: 0.0,
            minus_di: 0.0,
            aroon_oscillator: 0.0,
            stoch_rsi_k: 50.0,
            williams_r: -50.0,
            roc: 0.0,
            atr_pct: 0.0,
            hist_volatility_pct: 0.0,
            vwap_deviation_pct: 0.0,
            bollinger_pct_b: 0.5,
            bollinger_bandwidth: 10.0,
        }
    }
}

impl Default for TechnicalReadings {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Weighted scores plus the per-indicator values that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub long_score: f64,
    pub short_score: f64,
    pub components: Vec<(IndicatorKind, SignalPair)>,
}

// ─── Conversion functions ───────────────────────────────────────────

pub fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Linear map of `value` from [lo, hi] onto [0, 100], clamped.
fn linear(value: f64, lo: f64, hi: f64) -> f64 {
    clamp_score((value - lo) / (hi - lo) * 100.0)
}

/// Momentum: [-20%, +20%] → [0, 100] for longs, inverted for shorts.
pub fn momentum_signal(momentum_pct: f64) -> SignalPair {
    let long = linear(momentum_pct, -20.0, 20.0);
    SignalPair::new(long, 100.0 - long)
}

/// RSI, contrarian: RSI ≤ 20 → long 90, RSI ≥ 80 → long 10, linear between.
/// Short mirrors: RSI ≥ 80 → 90, RSI ≤ 20 → 10.
pub fn rsi_signal(rsi: f64) -> SignalPair {
    let r = rsi.clamp(20.0, 80.0);
    let long = 90.0 - (r - 20.0) * 80.0 / 60.0;
    SignalPair::new(long, 100.0 - long)
}

/// MACD histogram squashed through tanh.
pub fn macd_signal(histogram: f64) -> SignalPair {
    SignalPair::new(
        (histogram * 10.0).tanh() * 50.0 + 50.0,
        (-histogram * 10.0).tanh() * 50.0 + 50.0,
    )
}

/// ADX with directional indicators.
///
/// Below 20 there is no trend: 50 both ways. Above it the dominant DI side
/// is pushed toward 100 and the other toward 0, scaled by trend strength
/// `min((adx - 20) / 30, 1)`.
pub fn adx_signal(adx: f64, plus_di: f64, minus_di: f64) -> SignalPair {
    if adx < 20.0 || plus_di == minus_di {
        return SignalPair::symmetric(50.0);
    }
    let strength = ((adx - 20.0) / 30.0).min(1.0);
    let favored = 50.0 + 50.0 * strength;
    let opposed = 50.0 - 50.0 * strength;
    if plus_di > minus_di {
        SignalPair::new(favored, opposed)
    } else {
        SignalPair::new(opposed, favored)
    }
}

/// Aroon oscillator in [-100, 100].
pub fn aroon_signal(oscillator: f64) -> SignalPair {
    SignalPair::new((oscillator + 100.0) / 2.0, (-oscillator + 100.0) / 2.0)
}

/// Stochastic RSI %K, contrarian.
pub fn stoch_rsi_signal(k: f64) -> SignalPair {
    SignalPair::new(100.0 - k, k)
}

/// Williams %R in [-100, 0], contrarian.
pub fn williams_r_signal(williams_r: f64) -> SignalPair {
    SignalPair::new(-williams_r, 100.0 + williams_r)
}

/// ROC: [-30, 30] → [0, 100] for longs, inverted for shorts.
pub fn roc_signal(roc: f64) -> SignalPair {
    let long = linear(roc, -30.0, 30.0);
    SignalPair::new(long, 100.0 - long)
}

/// ATR as a percent of price: low volatility favored, same both ways.
pub fn atr_signal(atr_pct: f64) -> SignalPair {
    SignalPair::symmetric(100.0 - atr_pct * 20.0)
}

/// Annualized historical volatility (%): low volatility favored, 150% → 0.
pub fn volatility_signal(vol_pct: f64) -> SignalPair {
    SignalPair::symmetric(100.0 - vol_pct * 100.0 / 150.0)
}

/// VWAP deviation: [-10%, 10%] → [0, 100] for both directions.
///
/// Price above VWAP raises the short value as well as the long value.
pub fn vwap_signal(deviation_pct: f64) -> SignalPair {
    SignalPair::symmetric(linear(deviation_pct, -10.0, 10.0))
}

/// Bollinger %B with a squeeze bonus.
///
/// Long: below the lower band → 80, above the upper band → 20, linear
/// between. Short mirrors. Bandwidth under 5% adds 10 to both.
pub fn bollinger_signal(pct_b: f64, bandwidth: f64) -> SignalPair {
    let b = pct_b.clamp(0.0, 1.0);
    let bonus = if bandwidth < 5.0 { 10.0 } else { 0.0 };
    SignalPair::new(80.0 - 60.0 * b + bonus, 20.0 + 60.0 * b + bonus)
}

/// Trend-strength composite in [-100, 100].
///
/// `0.3·mom + 0.3·macd + 0.2·aroon + 0.2·roc`, each input normalized to
/// [-100, 100] first.
pub fn trend_composite(momentum_pct: f64, macd_histogram: f64, aroon_osc: f64, roc: f64) -> f64 {
    let norm_momentum = (momentum_pct * 5.0).clamp(-100.0, 100.0);
    let norm_macd = (macd_histogram * 10.0).tanh() * 100.0;
    let norm_aroon = aroon_osc.clamp(-100.0, 100.0);
    let norm_roc = (roc / 30.0 * 100.0).clamp(-100.0, 100.0);
    0.3 * norm_momentum + 0.3 * norm_macd + 0.2 * norm_aroon + 0.2 * norm_roc
}

pub fn trend_strength_signal(composite: f64) -> SignalPair {
    SignalPair::new(composite.max(0.0), (-composite).max(0.0))
}

// ─── Weighted combination ───────────────────────────────────────────

/// Convert every reading and return the thirteen directional values.
pub fn convert_all(r: &TechnicalReadings) -> Vec<(IndicatorKind, SignalPair)> {
    let composite = trend_composite(r.momentum_pct, r.macd_histogram, r.aroon_oscillator, r.roc);
    IndicatorKind::ALL
        .iter()
        .map(|&kind| {
            let pair = match kind {
                IndicatorKind::Momentum => momentum_signal(r.momentum_pct),
                IndicatorKind::Rsi => rsi_signal(r.rsi),
                IndicatorKind::Macd => macd_signal(r.macd_histogram),
                IndicatorKind::Adx => adx_signal(r.adx, r.plus_di, r.minus_di),
                IndicatorKind::Aroon => aroon_signal(r.aroon_oscillator),
                IndicatorKind::StochRsi => stoch_rsi_signal(r.stoch_rsi_k),
                IndicatorKind::WilliamsR => williams_r_signal(r.williams_r),
                IndicatorKind::Roc => roc_signal(r.roc),
                IndicatorKind::AtrPct => atr_signal(r.atr_pct),
                IndicatorKind::HistVolatility => volatility_signal(r.hist_volatility_pct),
                IndicatorKind::VwapDeviation => vwap_signal(r.vwap_deviation_pct),
                IndicatorKind::Bollinger => {
                    bollinger_signal(r.bollinger_pct_b, r.bollinger_bandwidth)
                }
                IndicatorKind::TrendStrength => trend_strength_signal(composite),
            };
            (kind, pair)
        })
        .collect()
}

/// Weighted reducer: `Σ wᵢ·vᵢ / TOTAL_TECH_WEIGHT` for each direction.
pub fn combine(components: &[(IndicatorKind, SignalPair)]) -> (f64, f64) {
    let (long, short) = components
        .iter()
        .fold((0.0, 0.0), |(l, s), (kind, pair)| {
            (l + kind.weight() * pair.long, s + kind.weight() * pair.short)
        });
    (
        clamp_score(long / TOTAL_TECH_WEIGHT),
        clamp_score(short / TOTAL_TECH_WEIGHT),
    )
}

/// Score a set of readings.
pub fn score(readings: &TechnicalReadings) -> ScoreBreakdown {
    let components = convert_all(readings);
    let (long_score, short_score) = combine(&components);
    ScoreBreakdown {
        long_score,
        short_score,
        components,
    }
}
