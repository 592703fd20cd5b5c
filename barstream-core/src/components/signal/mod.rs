//! Signal generation: reads bars, emits trade suggestions.
//!
//! Signals are portfolio-agnostic: a generator sees the feed and its own
//! state, never positions or cash. Any per-symbol state a strategy keeps is
//! an explicit field so the transitions can be audited.

pub mod ma_crossover;
pub mod ols_mean_reversion;

pub use ma_crossover::{CrossState, MovingAverageCross};
pub use ols_mean_reversion::{OlsMeanReversion, PairState};

use super::ComponentError;
use crate::data::DataFeed;
use crate::engine::EventQueue;
use crate::events::MarketEvent;

/// Trait for signal generators.
///
/// # Architecture invariant
/// `calculate_signals` may only enqueue `SignalEvent`s. It gets no access to
/// the portfolio, so it cannot size or place orders.
pub trait SignalGenerator {
    /// Human-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// React to a newly released bar set.
    fn calculate_signals(
        &mut self,
        event: &MarketEvent,
        feed: &dyn DataFeed,
        events: &mut EventQueue,
    ) -> Result<(), ComponentError>;
}

/// Mean of a slice. Callers guarantee it is non-empty.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
