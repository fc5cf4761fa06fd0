//! Fill and cost model.
//!
//! `slippage` turns an order size into a price impact; `exchange` applies it
//! directionally and adds swap fee plus gas.

pub mod exchange;
pub mod slippage;

pub use exchange::{Fill, SimulatedExchange, Side};
pub use slippage::slippage_fraction;
