//! Errors surfaced by the simulation loop.

use crate::components::ComponentError;
use crate::events::EventKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Loop phase in which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Advance,
    Drain,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Advance => f.write_str("advance"),
            Phase::Drain => f.write_str("drain"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected before the first bar is replayed.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration error: symbol '{symbol}' is not served by the data feed")]
    UnknownSymbol { symbol: String },

    /// A collaborator failed while handling an event. Fatal to the run.
    #[error("{phase} phase failed on {event} event: {source}")]
    Dispatch {
        phase: Phase,
        event: EventKind,
        #[source]
        source: ComponentError,
    },
}

impl EngineError {
    pub fn is_config(&self) -> bool {
        matches!(self, EngineError::Config(_) | EngineError::UnknownSymbol { .. })
    }
}
