//! Fill events: the record of a completed (simulated) trade.

use super::order::OrderSide;
use crate::domain::Symbol;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Per-share commission of the default fee schedule.
pub const COMMISSION_PER_SHARE: f64 = 0.005;

/// Minimum commission charged per fill by the default fee schedule.
pub const MIN_COMMISSION: f64 = 1.0;

/// Default commission: 0.005 per share with a 1.00 minimum per fill.
pub fn default_commission(quantity: u64) -> f64 {
    (quantity as f64 * COMMISSION_PER_SHARE).max(MIN_COMMISSION)
}

/// A completed trade reported by the execution simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    pub timestamp: NaiveDateTime,
    pub symbol: Symbol,
    pub venue: String,
    pub quantity: u64,
    pub direction: OrderSide,
    /// Notional reported by the simulator. The ledger does not trust it.
    pub fill_cost: f64,
    pub commission: f64,
}

impl FillEvent {
    /// Build a fill. A `None` commission falls back to [`default_commission`].
    pub fn new(
        timestamp: NaiveDateTime,
        symbol: impl Into<Symbol>,
        venue: impl Into<String>,
        quantity: u64,
        direction: OrderSide,
        fill_cost: f64,
        commission: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            venue: venue.into(),
            quantity,
            direction,
            fill_cost,
            commission: commission.unwrap_or_else(|| default_commission(quantity)),
        }
    }
}
