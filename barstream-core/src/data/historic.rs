//! In-memory historic feed replaying aligned bars one timestamp at a time.

use super::align::{align_symbols, AlignedData};
use super::feed::{DataFeed, FeedError};
use crate::domain::{Bar, Symbol};
use crate::engine::EventQueue;
use crate::events::MarketEvent;
use std::collections::HashMap;
use tracing::debug;

/// Replays pre-loaded bars for a fixed universe.
///
/// Bars are aligned up front; `update_bars` then releases one timestamp for
/// every symbol per call.
#[derive(Debug, Clone)]
pub struct HistoricFeed {
    data: AlignedData,
    /// Number of timestamps released so far.
    cursor: usize,
}

impl HistoricFeed {
    pub fn new(
        symbols: Vec<Symbol>,
        symbol_bars: HashMap<Symbol, Vec<Bar>>,
    ) -> Result<Self, FeedError> {
        let data = align_symbols(&symbols, symbol_bars)?;
        debug!(
            symbols = data.symbols.len(),
            bars = data.timestamps.len(),
            "historic feed aligned"
        );
        Ok(Self { data, cursor: 0 })
    }

    /// Total number of bar sets in the aligned timeline.
    pub fn len(&self) -> usize {
        self.data.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.timestamps.is_empty()
    }

    /// Bar sets not yet released.
    pub fn remaining(&self) -> usize {
        self.len() - self.cursor
    }

    /// Forward-filled bar count for a symbol.
    pub fn filled_count(&self, symbol: &str) -> usize {
        self.data.filled.get(symbol).copied().unwrap_or(0)
    }

    fn series(&self, symbol: &str) -> Result<&[Bar], FeedError> {
        self.data
            .bars
            .get(symbol)
            .map(Vec::as_slice)
            .ok_or_else(|| FeedError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }
}

impl DataFeed for HistoricFeed {
    fn symbols(&self) -> &[Symbol] {
        &self.data.symbols
    }

    fn has_more_bars(&self) -> bool {
        self.cursor < self.data.timestamps.len()
    }

    fn update_bars(&mut self, events: &mut EventQueue) -> Result<(), FeedError> {
        let Some(&timestamp) = self.data.timestamps.get(self.cursor) else {
            return Ok(());
        };
        self.cursor += 1;
        events.enqueue(MarketEvent { timestamp });
        Ok(())
    }

    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar], FeedError> {
        let released = &self.series(symbol)?[..self.cursor];
        let from = released.len().saturating_sub(n);
        Ok(&released[from..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BarField;
    use crate::events::Event;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(day: u32, close: f64) -> Bar {
        Bar::new(ts(day), close, close + 1.0, close - 1.0, close, 500.0)
    }

    fn feed() -> HistoricFeed {
        let mut input = HashMap::new();
        input.insert(
            "SPY".to_string(),
            vec![bar(2, 100.0), bar(3, 101.0), bar(4, 102.0)],
        );
        input.insert(
            "QQQ".to_string(),
            vec![bar(2, 200.0), bar(3, 201.0), bar(4, 202.0)],
        );
        HistoricFeed::new(vec!["SPY".into(), "QQQ".into()], input).unwrap()
    }

    #[test]
    fn nothing_released_before_first_update() {
        let feed = feed();
        assert!(feed.has_more_bars());
        assert_eq!(feed.latest_bars("SPY", 5).unwrap().len(), 0);
        assert_eq!(
            feed.latest_bar_time("SPY").unwrap_err(),
            FeedError::NoBarsYet {
                symbol: "SPY".into()
            }
        );
    }

    #[test]
    fn each_update_enqueues_one_market_event() {
        let mut feed = feed();
        let mut queue = EventQueue::new();

        feed.update_bars(&mut queue).unwrap();
        assert_eq!(queue.len(), 1);
        match queue.dequeue() {
            Some(Event::Market(m)) => assert_eq!(m.timestamp, ts(2)),
            other => panic!("expected market event, got {other:?}"),
        }
        assert_eq!(feed.latest_value("QQQ", BarField::Close).unwrap(), 200.0);
        assert_eq!(feed.remaining(), 2);
    }

    #[test]
    fn exhausts_without_trailing_event() {
        let mut feed = feed();
        let mut queue = EventQueue::new();
        while feed.has_more_bars() {
            feed.update_bars(&mut queue).unwrap();
        }
        assert_eq!(queue.len(), 3);

        feed.update_bars(&mut queue).unwrap();
        assert_eq!(queue.len(), 3);
        assert_eq!(feed.latest_bar_time("SPY").unwrap(), ts(4));
    }

    #[test]
    fn latest_values_tolerates_under_supply() {
        let mut feed = feed();
        let mut queue = EventQueue::new();
        feed.update_bars(&mut queue).unwrap();
        feed.update_bars(&mut queue).unwrap();

        let closes = feed.latest_values("SPY", BarField::Close, 10).unwrap();
        assert_eq!(closes, vec![100.0, 101.0]);

        let last_one = feed.latest_values("SPY", BarField::Close, 1).unwrap();
        assert_eq!(last_one, vec![101.0]);

        assert!(feed.latest_values("SPY", BarField::Close, 0).unwrap().is_empty());
    }

    #[test]
    fn unknown_symbol_is_reported() {
        let feed = feed();
        assert_eq!(
            feed.latest_bars("IWM", 1).unwrap_err(),
            FeedError::UnknownSymbol {
                symbol: "IWM".into()
            }
        );
    }

    #[test]
    fn symbols_keep_configuration_order() {
        let feed = feed();
        assert_eq!(feed.symbols(), &["SPY".to_string(), "QQQ".to_string()]);
    }
}
