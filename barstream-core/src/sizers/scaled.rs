//! Scaled Sizer
//!
//! Entry size scales with signal strength, e.g. the hedge ratio a pairs
//! strategy attaches to its second leg.

use super::{flat_entry_full_exit, PositionSizer};
use crate::events::{OrderEvent, SignalEvent};

/// Sizer whose entry quantity is `floor(quantity * strength)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledSizer {
    pub quantity: u64,
}

impl ScaledSizer {
    pub fn new(quantity: u64) -> Self {
        Self { quantity }
    }

    fn entry_quantity(&self, strength: f64) -> u64 {
        let scaled = (self.quantity as f64 * strength).floor();
        if scaled.is_finite() && scaled > 0.0 {
            scaled as u64
        } else {
            0
        }
    }
}

impl PositionSizer for ScaledSizer {
    fn name(&self) -> &str {
        "scaled"
    }

    fn order_for(&self, signal: &SignalEvent, current_quantity: i64) -> Option<OrderEvent> {
        flat_entry_full_exit(
            signal,
            current_quantity,
            self.entry_quantity(signal.strength),
        )
    }
}
