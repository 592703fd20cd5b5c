//! Naive Sizer
//!
//! Fixed-quantity entries, whole-position exits, no risk adjustment.

use super::{flat_entry_full_exit, PositionSizer};
use crate::events::{OrderEvent, SignalEvent};

/// Default entry size in shares.
pub const DEFAULT_QUANTITY: u64 = 100;

/// Fixed-quantity sizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaiveSizer {
    pub quantity: u64,
}

impl Default for NaiveSizer {
    fn default() -> Self {
        Self {
            quantity: DEFAULT_QUANTITY,
        }
    }
}

impl NaiveSizer {
    pub fn new(quantity: u64) -> Self {
        Self { quantity }
    }
}

impl PositionSizer for NaiveSizer {
    fn name(&self) -> &str {
        "naive"
    }

    fn order_for(&self, signal: &SignalEvent, current_quantity: i64) -> Option<OrderEvent> {
        flat_entry_full_exit(signal, current_quantity, self.quantity)
    }
}
