//! DataFeed trait and structured error types.
//!
//! The DataFeed trait abstracts over bar sources (in-memory history, CSV
//! replay, a live adapter) so the simulation loop and the strategies never
//! depend on where bars come from.

use crate::domain::{Bar, BarField, Symbol};
use crate::engine::EventQueue;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Structured error types for feed operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeedError {
    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("no bars released yet for symbol '{symbol}'")]
    NoBarsYet { symbol: String },

    #[error("symbol universe is empty")]
    EmptyUniverse,

    #[error("no bars supplied for symbol '{symbol}'")]
    NoData { symbol: String },
}

/// Source of market bars for a fixed symbol universe.
///
/// Under-supply is never an error: `latest_bars` and `latest_values` return
/// fewer than `n` items when fewer bars have been released.
pub trait DataFeed {
    /// The symbol universe, in configuration order.
    fn symbols(&self) -> &[Symbol];

    /// True while at least one more bar set can be released.
    fn has_more_bars(&self) -> bool;

    /// Release the next bar for every symbol and enqueue one `MarketEvent`.
    fn update_bars(&mut self, events: &mut EventQueue) -> Result<(), FeedError>;

    /// Up to `n` most recent released bars, oldest first.
    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar], FeedError>;

    fn latest_bar(&self, symbol: &str) -> Result<&Bar, FeedError> {
        self.latest_bars(symbol, 1)?
            .last()
            .ok_or_else(|| FeedError::NoBarsYet {
                symbol: symbol.to_string(),
            })
    }

    fn latest_bar_time(&self, symbol: &str) -> Result<NaiveDateTime, FeedError> {
        Ok(self.latest_bar(symbol)?.timestamp)
    }

    fn latest_value(&self, symbol: &str, field: BarField) -> Result<f64, FeedError> {
        Ok(self.latest_bar(symbol)?.value(field))
    }

    /// Up to `n` most recent values of one field, oldest first.
    fn latest_values(
        &self,
        symbol: &str,
        field: BarField,
        n: usize,
    ) -> Result<Vec<f64>, FeedError> {
        Ok(self
            .latest_bars(symbol, n)?
            .iter()
            .map(|bar| bar.value(field))
            .collect())
    }
}
