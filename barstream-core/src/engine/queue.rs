//! Event queue: unbounded FIFO owned by the simulation loop.

use crate::events::Event;
use std::collections::VecDeque;

/// FIFO of pending events.
///
/// Producers and the consumer share one control thread, so there is no
/// blocking: `dequeue` returns `None` once the queue is drained.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the tail.
    pub fn enqueue(&mut self, event: impl Into<Event>) {
        self.inner.push_back(event.into());
    }

    /// Remove and return the head, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<Event> {
        self.inner.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Read-only view of pending events, head first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.inner.iter()
    }
}
