//! Per-bar snapshots appended to the ledger histories.

use crate::domain::Symbol;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signed share count per symbol at one time index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionsSnapshot {
    pub timestamp: NaiveDateTime,
    pub positions: BTreeMap<Symbol, i64>,
}

/// Account valuation at one time index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    pub timestamp: NaiveDateTime,
    pub cash: f64,
    /// Cumulative commission paid up to this point.
    pub commission: f64,
    /// `cash + Σ market_values`.
    pub total: f64,
    pub market_values: BTreeMap<Symbol, f64>,
}

impl PositionsSnapshot {
    pub fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }
}

impl HoldingsSnapshot {
    pub fn market_value(&self, symbol: &str) -> f64 {
        self.market_values.get(symbol).copied().unwrap_or(0.0)
    }
}
