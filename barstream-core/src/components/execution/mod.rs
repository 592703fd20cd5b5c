//! Execution simulation: turns orders into fills.

pub mod simulated;

pub use simulated::SimulatedExecution;

use super::ComponentError;
use crate::data::DataFeed;
use crate::engine::EventQueue;
use crate::events::OrderEvent;

/// Trait for execution simulators.
///
/// An accepted order produces exactly one `FillEvent` on the queue. Rejecting
/// an order is a contract violation and aborts the run.
pub trait ExecutionSimulator {
    /// Human-readable name (e.g., "simulated").
    fn name(&self) -> &str;

    fn execute_order(
        &mut self,
        order: &OrderEvent,
        feed: &dyn DataFeed,
        events: &mut EventQueue,
    ) -> Result<(), ComponentError>;
}
