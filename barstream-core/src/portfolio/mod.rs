//! Portfolio ledger: sole owner of positions, cash and their histories.

pub mod equity_curve;
pub mod ledger;
pub mod snapshot;

pub use equity_curve::{EquityCurve, EquityRow};
pub use ledger::{LedgerError, Portfolio};
pub use snapshot::{HoldingsSnapshot, PositionsSnapshot};
