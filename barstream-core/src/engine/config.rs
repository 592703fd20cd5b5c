//! Engine configuration consumed at `Backtest` construction.

use crate::domain::Symbol;
use chrono::NaiveDateTime;
use std::time::Duration;

/// Configuration for a single simulation run.
///
/// The engine does not know where these values came from; the runner builds
/// one from TOML, tests build them inline.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Symbol universe. The first symbol is the time-index reference.
    pub symbols: Vec<Symbol>,
    pub initial_capital: f64,
    /// Pause between Advance cycles. Zero runs at full speed.
    pub heartbeat: Duration,
    /// Timestamp of the seed snapshot; every replayed bar must be later.
    pub start: NaiveDateTime,
}

impl EngineConfig {
    pub fn new(symbols: Vec<Symbol>, initial_capital: f64, start: NaiveDateTime) -> Self {
        Self {
            symbols,
            initial_capital,
            heartbeat: Duration::ZERO,
            start,
        }
    }

    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}
