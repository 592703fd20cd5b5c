//! Moving average crossover: enters long when the short SMA rises above the
//! long SMA and exits when it falls back below.

use super::{mean, SignalGenerator};
use crate::components::ComponentError;
use crate::data::DataFeed;
use crate::domain::{BarField, Symbol};
use crate::engine::EventQueue;
use crate::events::{MarketEvent, SignalDirection, SignalEvent};
use std::collections::HashMap;

/// Per-symbol crossover state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossState {
    #[default]
    Out,
    Long,
}

impl CrossState {
    /// Transition for one bar. Returns the new state and the signal to emit.
    pub fn next(self, short_ma: f64, long_ma: f64) -> (CrossState, Option<SignalDirection>) {
        match self {
            CrossState::Out if short_ma > long_ma => {
                (CrossState::Long, Some(SignalDirection::Long))
            }
            CrossState::Long if short_ma < long_ma => {
                (CrossState::Out, Some(SignalDirection::Exit))
            }
            state => (state, None),
        }
    }
}

/// Simple moving average crossover on closes.
#[derive(Debug, Clone)]
pub struct MovingAverageCross {
    pub strategy_id: u32,
    pub short_window: usize,
    pub long_window: usize,
    states: HashMap<Symbol, CrossState>,
}

impl MovingAverageCross {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            strategy_id: 1,
            short_window,
            long_window,
            states: HashMap::new(),
        }
    }

    pub fn default_params() -> Self {
        Self::new(5, 20)
    }

    pub fn with_strategy_id(mut self, strategy_id: u32) -> Self {
        self.strategy_id = strategy_id;
        self
    }

    /// Current state for a symbol (`Out` if never seen).
    pub fn state(&self, symbol: &str) -> CrossState {
        self.states.get(symbol).copied().unwrap_or_default()
    }
}

impl SignalGenerator for MovingAverageCross {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn calculate_signals(
        &mut self,
        _event: &MarketEvent,
        feed: &dyn DataFeed,
        events: &mut EventQueue,
    ) -> Result<(), ComponentError> {
        if self.short_window == 0 || self.short_window >= self.long_window {
            return Err(ComponentError::ContractViolation(format!(
                "ma_crossover windows {}/{} are invalid",
                self.short_window, self.long_window
            )));
        }

        for symbol in feed.symbols() {
            let closes = feed.latest_values(symbol, BarField::Close, self.long_window)?;
            if closes.len() < self.long_window {
                continue;
            }

            let long_ma = mean(&closes);
            let short_ma = mean(&closes[closes.len() - self.short_window..]);

            let state = self.state(symbol);
            let (next, direction) = state.next(short_ma, long_ma);
            self.states.insert(symbol.clone(), next);

            if let Some(direction) = direction {
                let timestamp = feed.latest_bar_time(symbol)?;
                events.enqueue(SignalEvent::new(
                    self.strategy_id,
                    symbol.clone(),
                    timestamp,
                    direction,
                    1.0,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoricFeed;
    use crate::domain::Bar;
    use crate::events::Event;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn feed_from_closes(closes: &[f64]) -> HistoricFeed {
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(t0() + Duration::days(i as i64), c, c, c, c, 1.0))
            .collect();
        let mut input = HashMap::new();
        input.insert("SPY".to_string(), bars);
        HistoricFeed::new(vec!["SPY".into()], input).unwrap()
    }

    fn replay(strategy: &mut MovingAverageCross, feed: &mut HistoricFeed) -> Vec<SignalEvent> {
        let mut signals = Vec::new();
        let mut queue = EventQueue::new();
        while feed.has_more_bars() {
            feed.update_bars(&mut queue).unwrap();
            while let Some(event) = queue.dequeue() {
                match event {
                    Event::Market(m) => strategy
                        .calculate_signals(&m, &*feed, &mut queue)
                        .unwrap(),
                    Event::Signal(s) => signals.push(s),
                    other => panic!("unexpected {other:?}"),
                }
            }
        }
        signals
    }

    #[test]
    fn transitions() {
        assert_eq!(
            CrossState::Out.next(2.0, 1.0),
            (CrossState::Long, Some(SignalDirection::Long))
        );
        assert_eq!(CrossState::Long.next(2.0, 1.0), (CrossState::Long, None));
        assert_eq!(
            CrossState::Long.next(1.0, 2.0),
            (CrossState::Out, Some(SignalDirection::Exit))
        );
        assert_eq!(CrossState::Out.next(1.0, 2.0), (CrossState::Out, None));
        assert_eq!(CrossState::Out.next(1.0, 1.0), (CrossState::Out, None));
    }

    #[test]
    fn no_signal_until_long_window_filled() {
        let mut strategy = MovingAverageCross::new(2, 4);
        let mut feed = feed_from_closes(&[1.0, 2.0, 3.0]);
        assert!(replay(&mut strategy, &mut feed).is_empty());
        assert_eq!(strategy.state("SPY"), CrossState::Out);
    }

    #[test]
    fn rising_then_falling_prices_enter_then_exit() {
        let mut strategy = MovingAverageCross::new(2, 4);
        let closes = [10.0, 10.0, 10.0, 11.0, 12.0, 13.0, 9.0, 8.0, 7.0];
        let mut feed = feed_from_closes(&closes);

        let signals = replay(&mut strategy, &mut feed);
        let directions: Vec<SignalDirection> = signals.iter().map(|s| s.direction).collect();
        assert_eq!(directions, vec![SignalDirection::Long, SignalDirection::Exit]);

        // The entry fires on the 4th bar, the first with a full window.
        assert_eq!(signals[0].timestamp, t0() + Duration::days(3));
        assert_eq!(signals[0].symbol, "SPY");
        assert_eq!(signals[0].strategy_id, 1);
        assert_eq!(strategy.state("SPY"), CrossState::Out);
    }

    #[test]
    fn invalid_windows_are_a_contract_violation() {
        let mut strategy = MovingAverageCross::new(0, 4);
        let feed = feed_from_closes(&[1.0]);
        let mut queue = EventQueue::new();
        let event = MarketEvent { timestamp: t0() };
        let err = strategy
            .calculate_signals(&event, &feed, &mut queue)
            .unwrap_err();
        assert!(matches!(err, ComponentError::ContractViolation(_)));
    }

    #[test]
    fn equal_windows_are_a_contract_violation() {
        let mut strategy = MovingAverageCross::new(4, 4);
        let feed = feed_from_closes(&[1.0]);
        let mut queue = EventQueue::new();
        let event = MarketEvent { timestamp: t0() };
        let err = strategy
            .calculate_signals(&event, &feed, &mut queue)
            .unwrap_err();
        assert!(matches!(err, ComponentError::ContractViolation(_)));
        assert!(queue.is_empty());
    }
}
