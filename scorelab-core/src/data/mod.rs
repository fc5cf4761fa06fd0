//! Price data sources.
//!
//! The engine never fetches data itself: callers load every series through a
//! [`PriceProvider`] before the run and hand the preloaded bars to
//! `BacktestEngine::new`.

pub mod csv;
pub mod provider;
pub mod synthetic;

pub use self::csv::CsvPriceProvider;
pub use provider::{load_series, DataError, PriceProvider};
pub use synthetic::SyntheticProvider;
