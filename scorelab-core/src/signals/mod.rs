//! Multi-indicator signal scoring.
//!
//! `convert` is the single source of truth for turning raw indicator readings
//! into directional values and weighting them. `engine` gathers the raw
//! readings from a price window and hands them to `convert`.

pub mod convert;
pub mod engine;

pub use convert::{
    score, IndicatorKind, ScoreBreakdown, SignalPair, TechnicalReadings, TOTAL_TECH_WEIGHT,
};
pub use engine::{SignalEngine, SignalResult};
