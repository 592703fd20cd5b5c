//! Collaborator traits and reference implementations.
//!
//! The simulation loop talks to three collaborators:
//! - Signal generator: reads the feed on each market event, may enqueue signals
//! - Execution simulator: turns orders into fills
//! - Data feed (see [`crate::data`])
//!
//! Collaborators receive the queue and the feed as explicit arguments; none of
//! them holds a reference to the loop or to the portfolio.

pub mod execution;
pub mod signal;

pub use execution::{ExecutionSimulator, SimulatedExecution};
pub use signal::{
    CrossState, MovingAverageCross, OlsMeanReversion, PairState, SignalGenerator,
};

use crate::data::FeedError;
use crate::portfolio::LedgerError;
use thiserror::Error;

/// Failure raised by any collaborator during dispatch.
///
/// Every variant is fatal to the run: the loop never retries or skips.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("contract violation: {0}")]
    ContractViolation(String),
}
