//! Immediate, complete fills at the latest close.

use super::ExecutionSimulator;
use crate::components::ComponentError;
use crate::data::DataFeed;
use crate::domain::BarField;
use crate::engine::EventQueue;
use crate::events::{FillEvent, OrderEvent};

/// Venue stamped on simulated fills.
pub const DEFAULT_VENUE: &str = "ARCA";

/// Naive execution: every order fills in full at the symbol's latest close.
///
/// No latency, slippage or partial fills. Commission is left to the default
/// fee schedule unless an override is configured.
#[derive(Debug, Clone)]
pub struct SimulatedExecution {
    pub venue: String,
    /// Flat commission per fill; `None` uses the default schedule.
    pub commission: Option<f64>,
}

impl Default for SimulatedExecution {
    fn default() -> Self {
        Self {
            venue: DEFAULT_VENUE.to_string(),
            commission: None,
        }
    }
}

impl SimulatedExecution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commission(mut self, commission: f64) -> Self {
        self.commission = Some(commission);
        self
    }
}

impl ExecutionSimulator for SimulatedExecution {
    fn name(&self) -> &str {
        "simulated"
    }

    fn execute_order(
        &mut self,
        order: &OrderEvent,
        feed: &dyn DataFeed,
        events: &mut EventQueue,
    ) -> Result<(), ComponentError> {
        if order.quantity == 0 {
            return Err(ComponentError::ContractViolation(format!(
                "zero-quantity order for {}",
                order.symbol
            )));
        }

        let close = feed.latest_value(&order.symbol, BarField::Close)?;
        let timestamp = feed.latest_bar_time(&order.symbol)?;

        events.enqueue(FillEvent::new(
            timestamp,
            order.symbol.clone(),
            self.venue.clone(),
            order.quantity,
            order.direction,
            close * order.quantity as f64,
            self.commission,
        ));
        Ok(())
    }
}
