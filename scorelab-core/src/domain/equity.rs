//! Mark-to-market equity snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portfolio value at the close of one bar.
///
/// Invariant: `equity == cash + positions_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub bar_index: usize,
    pub equity: f64,
    pub cash: f64,
    pub positions_value: f64,
    /// Decline from the running peak, in percent (0 at a new high).
    pub drawdown_pct: f64,
}
