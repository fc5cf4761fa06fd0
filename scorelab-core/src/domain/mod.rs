//! Domain types for scorelab.

pub mod bar;
pub mod equity;
pub mod position;
pub mod trade;

pub use bar::{prices, validate_series, BarError, PriceBar};
pub use equity::EquityPoint;
pub use position::{Direction, Position, PositionId};
pub use trade::{ClosedTrade, ExitReason};

/// Token symbol type alias.
pub type Token = String;
