//! Simulation engine: event queue, loop configuration and the loop itself.
//!
//! The loop owns the queue, the feed, the strategy, the execution simulator
//! and the portfolio. Per Advance cycle it releases one bar set, then drains
//! the queue in strict FIFO order:
//!
//! 1. MARKET: strategy reads the feed, then the portfolio marks the bar
//! 2. SIGNAL: portfolio sizes and may emit an order
//! 3. ORDER: execution simulator emits a fill
//! 4. FILL: portfolio applies it to positions and cash

pub mod backtest;
pub mod config;
pub mod error;
pub mod queue;

pub use backtest::{Backtest, RunSummary};
pub use config::EngineConfig;
pub use error::{EngineError, Phase};
pub use queue::EventQueue;
