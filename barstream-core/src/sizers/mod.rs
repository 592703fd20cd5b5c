//! Position Sizers: turn a signal into at most one order.
//!
//! Sizers are consulted by the portfolio ledger with the current position of
//! the signal's symbol. They decide quantity and side; they never touch cash
//! or positions.

pub mod naive;
pub mod scaled;

pub use naive::NaiveSizer;
pub use scaled::ScaledSizer;

use crate::events::{OrderEvent, OrderSide, SignalDirection, SignalEvent};

/// Position sizing policy.
///
/// # Responsibilities
/// - Map (signal, current position) to an order or to nothing
/// - Enforce entry/exit preconditions (e.g. only enter when flat)
///
/// # Non-Responsibilities
/// - Sizers do NOT decide entry/exit (that's the signal's job)
/// - Sizers do NOT apply fills (that's the ledger's job)
pub trait PositionSizer {
    /// Sizer name for manifest/logging
    fn name(&self) -> &str;

    /// Order for `signal` given the signed position currently held, or `None`
    /// when the policy drops the signal.
    fn order_for(&self, signal: &SignalEvent, current_quantity: i64) -> Option<OrderEvent>;
}

/// Shared flat-entry / full-exit rule used by the bundled sizers.
///
/// LONG/SHORT enter `entry_quantity` only when flat; EXIT closes the whole
/// position only when one is open.
pub(crate) fn flat_entry_full_exit(
    signal: &SignalEvent,
    current_quantity: i64,
    entry_quantity: u64,
) -> Option<OrderEvent> {
    match (signal.direction, current_quantity) {
        (SignalDirection::Long, 0) if entry_quantity > 0 => Some(OrderEvent::market(
            signal.symbol.clone(),
            entry_quantity,
            OrderSide::Buy,
        )),
        (SignalDirection::Short, 0) if entry_quantity > 0 => Some(OrderEvent::market(
            signal.symbol.clone(),
            entry_quantity,
            OrderSide::Sell,
        )),
        (SignalDirection::Exit, qty) if qty > 0 => Some(OrderEvent::market(
            signal.symbol.clone(),
            qty.unsigned_abs(),
            OrderSide::Sell,
        )),
        (SignalDirection::Exit, qty) if qty < 0 => Some(OrderEvent::market(
            signal.symbol.clone(),
            qty.unsigned_abs(),
            OrderSide::Buy,
        )),
        _ => None,
    }
}
