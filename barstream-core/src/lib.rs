//! Barstream Core: event model, simulation loop, portfolio ledger.
//!
//! This crate contains the heart of the backtester:
//! - Typed events (market, signal, order, fill) and the FIFO event queue
//! - The single-threaded simulation loop with Advance/Drain/Pace phases
//! - The portfolio ledger with append-only position and holdings histories
//! - Collaborator traits (data feed, signal generator, execution, sizer)
//!   plus reference implementations
//! - Pure performance helpers (returns, equity curve, drawdowns, Sharpe)

pub mod components;
pub mod data;
pub mod domain;
pub mod engine;
pub mod events;
pub mod performance;
pub mod portfolio;
pub mod sizers;
