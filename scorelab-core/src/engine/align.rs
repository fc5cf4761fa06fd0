//! Multi-token time alignment.
//!
//! All series are mapped onto the union of their timestamps, starting at the
//! first timestamp where every series has a price. Gaps after that point are
//! forward-filled with the last observed price and counted as data warnings.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::domain::PriceBar;

/// Price series for several tokens on a common timeline.
#[derive(Debug, Clone, Default)]
pub struct AlignedSeries {
    /// Common timestamp axis, strictly increasing.
    pub timestamps: Vec<DateTime<Utc>>,
    /// Bars per token; every inner Vec has the same length as `timestamps`.
    pub bars: BTreeMap<String, Vec<PriceBar>>,
    /// Forward-filled bar count per token.
    pub filled_gaps: BTreeMap<String, usize>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn bars(&self, token: &str) -> Option<&[PriceBar]> {
        self.bars.get(token).map(Vec::as_slice)
    }

    /// Prices of `token` over the whole timeline.
    pub fn prices(&self, token: &str) -> Vec<f64> {
        self.bars
            .get(token)
            .map(|bars| bars.iter().map(|b| b.price).collect())
            .unwrap_or_default()
    }

    /// Every token's price at bar `index`.
    pub fn prices_at(&self, index: usize) -> BTreeMap<String, f64> {
        self.bars
            .iter()
            .filter_map(|(token, bars)| bars.get(index).map(|b| (token.clone(), b.price)))
            .collect()
    }

    /// Human-readable gap warnings, one per token with filled bars.
    pub fn warnings(&self) -> Vec<String> {
        self.filled_gaps
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(token, count)| format!("{token}: {count} missing bars forward-filled"))
            .collect()
    }
}

/// Align `series` onto a common timeline.
///
/// An empty input series, or series that never overlap, give an empty result.
pub fn align_series(series: &BTreeMap<String, Vec<PriceBar>>) -> AlignedSeries {
    if series.is_empty() || series.values().any(Vec::is_empty) {
        return AlignedSeries::default();
    }

    // Latest first timestamp across series: before it, some token has no price.
    let start = series
        .values()
        .filter_map(|bars| bars.first().map(|b| b.timestamp))
        .max();
    let Some(start) = start else {
        return AlignedSeries::default();
    };

    let timestamps: Vec<DateTime<Utc>> = series
        .values()
        .flat_map(|bars| bars.iter().map(|b| b.timestamp))
        .filter(|ts| *ts >= start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut bars = BTreeMap::new();
    let mut filled_gaps = BTreeMap::new();

    for (token, raw) in series {
        let mut aligned = Vec::with_capacity(timestamps.len());
        let mut filled = 0usize;
        let mut cursor = 0usize;
        let mut last_price = f64::NAN;

        for &ts in &timestamps {
            while cursor < raw.len() && raw[cursor].timestamp <= ts {
                last_price = raw[cursor].price;
                cursor += 1;
            }
            // `last_price` is set by now: every series starts at or before `start`.
            let exact = cursor > 0 && raw[cursor - 1].timestamp == ts;
            if !exact {
                filled += 1;
            }
            aligned.push(PriceBar::new(ts, last_price));
        }

        bars.insert(token.clone(), aligned);
        filled_gaps.insert(token.clone(), filled);
    }

    AlignedSeries {
        timestamps,
        bars,
        filled_gaps,
    }
}
