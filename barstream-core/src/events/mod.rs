//! Event model: the four typed events that travel through the simulation queue.
//!
//! Events are plain values: data plus a discriminant. They carry no behavior
//! beyond construction helpers; every transition they cause lives in the
//! component that consumes them.

pub mod fill;
pub mod order;
pub mod signal;

pub use fill::{default_commission, FillEvent, COMMISSION_PER_SHARE, MIN_COMMISSION};
pub use order::{OrderEvent, OrderSide, OrderType};
pub use signal::{SignalDirection, SignalEvent};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A new bar is available for every symbol in the universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Timestamp of the bar set that was just released.
    pub timestamp: NaiveDateTime,
}

/// Tagged union of everything the queue can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    Market(MarketEvent),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

/// Discriminant of an [`Event`], used for dispatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Market,
    Signal,
    Order,
    Fill,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Market(_) => EventKind::Market,
            Event::Signal(_) => EventKind::Signal,
            Event::Order(_) => EventKind::Order,
            Event::Fill(_) => EventKind::Fill,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Market => "MARKET",
            EventKind::Signal => "SIGNAL",
            EventKind::Order => "ORDER",
            EventKind::Fill => "FILL",
        };
        f.write_str(name)
    }
}

impl From<MarketEvent> for Event {
    fn from(event: MarketEvent) -> Self {
        Event::Market(event)
    }
}

impl From<SignalEvent> for Event {
    fn from(event: SignalEvent) -> Self {
        Event::Signal(event)
    }
}

impl From<OrderEvent> for Event {
    fn from(event: OrderEvent) -> Self {
        Event::Order(event)
    }
}

impl From<FillEvent> for Event {
    fn from(event: FillEvent) -> Self {
        Event::Fill(event)
    }
}
