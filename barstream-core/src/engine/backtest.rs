//! Simulation loop: the single driver of a run.
//!
//! Each cycle has three phases:
//! 1. Advance: release the next bar set from the feed (one `MarketEvent`)
//! 2. Drain: dequeue and dispatch until the queue is empty
//! 3. Pace: optional heartbeat sleep
//!
//! The loop halts once the feed is exhausted and the last drain has emptied
//! the queue. No collaborator can call back into the loop.

use super::config::EngineConfig;
use super::error::{EngineError, Phase};
use super::queue::EventQueue;
use crate::components::{ComponentError, ExecutionSimulator, SignalGenerator};
use crate::data::DataFeed;
use crate::events::{Event, EventKind};
use crate::portfolio::{EquityCurve, Portfolio};
use crate::sizers::PositionSizer;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Counters surfaced at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub market_events: usize,
    pub signals: usize,
    pub orders: usize,
    pub fills: usize,
    /// Signals the sizing policy declined.
    pub dropped_signals: usize,
}

/// Event-driven backtest over one feed, one strategy and one portfolio.
pub struct Backtest {
    config: EngineConfig,
    events: EventQueue,
    feed: Box<dyn DataFeed>,
    strategy: Box<dyn SignalGenerator>,
    portfolio: Portfolio,
    execution: Box<dyn ExecutionSimulator>,
    summary: RunSummary,
}

impl Backtest {
    /// Wire up a run. Configuration problems are reported here, before any
    /// bar is replayed.
    pub fn new(
        config: EngineConfig,
        feed: Box<dyn DataFeed>,
        strategy: Box<dyn SignalGenerator>,
        sizer: Box<dyn PositionSizer>,
        execution: Box<dyn ExecutionSimulator>,
    ) -> Result<Self, EngineError> {
        validate(&config, feed.as_ref())?;

        let portfolio = Portfolio::with_sizer(
            config.symbols.clone(),
            config.start,
            config.initial_capital,
            sizer,
        );

        Ok(Self {
            config,
            events: EventQueue::new(),
            feed,
            strategy,
            portfolio,
            execution,
            summary: RunSummary::default(),
        })
    }

    /// Replay every bar. Returns the run counters.
    pub fn run(&mut self) -> Result<RunSummary, EngineError> {
        info!(
            symbols = ?self.config.symbols,
            capital = self.config.initial_capital,
            strategy = self.strategy.name(),
            execution = self.execution.name(),
            sizer = self.portfolio.sizer_name(),
            "backtest started"
        );

        loop {
            // Advance
            if !self.feed.has_more_bars() {
                break;
            }
            self.feed
                .update_bars(&mut self.events)
                .map_err(|e| EngineError::Dispatch {
                    phase: Phase::Advance,
                    event: EventKind::Market,
                    source: ComponentError::Feed(e),
                })?;

            // Drain
            while let Some(event) = self.events.dequeue() {
                let kind = event.kind();
                debug!(event = %kind, pending = self.events.len(), "dispatch");
                self.dispatch(event).map_err(|source| EngineError::Dispatch {
                    phase: Phase::Drain,
                    event: kind,
                    source,
                })?;
            }

            // Pace
            if !self.config.heartbeat.is_zero() {
                std::thread::sleep(self.config.heartbeat);
            }
        }

        self.summary.dropped_signals = self.portfolio.dropped_signals();
        info!(
            bars = self.summary.market_events,
            signals = self.summary.signals,
            orders = self.summary.orders,
            fills = self.summary.fills,
            "backtest finished"
        );
        Ok(self.summary)
    }

    /// Equity curve from the ledger's holdings history.
    pub fn finalize(&self) -> EquityCurve {
        self.portfolio.finalize()
    }

    /// Run to exhaustion, then finalize.
    pub fn simulate_trading(&mut self) -> Result<(RunSummary, EquityCurve), EngineError> {
        let summary = self.run()?;
        Ok((summary, self.finalize()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Events still queued (empty after a completed run).
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn dispatch(&mut self, event: Event) -> Result<(), ComponentError> {
        match event {
            Event::Market(market) => {
                self.summary.market_events += 1;
                self.strategy
                    .calculate_signals(&market, self.feed.as_ref(), &mut self.events)?;
                self.portfolio
                    .update_timeindex(&market, self.feed.as_ref())?;
            }
            Event::Signal(signal) => {
                self.summary.signals += 1;
                self.portfolio.update_signal(&signal, &mut self.events)?;
            }
            Event::Order(order) => {
                self.summary.orders += 1;
                self.execution
                    .execute_order(&order, self.feed.as_ref(), &mut self.events)?;
            }
            Event::Fill(fill) => {
                self.summary.fills += 1;
                self.portfolio.update_fill(&fill, self.feed.as_ref())?;
            }
        }
        Ok(())
    }
}

fn validate(config: &EngineConfig, feed: &dyn DataFeed) -> Result<(), EngineError> {
    if config.symbols.is_empty() {
        return Err(EngineError::Config("symbol universe is empty".into()));
    }

    let mut seen = HashSet::new();
    for symbol in &config.symbols {
        if !seen.insert(symbol.as_str()) {
            return Err(EngineError::Config(format!("duplicate symbol '{symbol}'")));
        }
    }

    if !config.initial_capital.is_finite() || config.initial_capital <= 0.0 {
        return Err(EngineError::Config(format!(
            "initial capital must be positive, got {}",
            config.initial_capital
        )));
    }

    let served: HashSet<&str> = feed.symbols().iter().map(String::as_str).collect();
    if let Some(missing) = config.symbols.iter().find(|s| !served.contains(s.as_str())) {
        return Err(EngineError::UnknownSymbol {
            symbol: missing.clone(),
        });
    }

    // Strategies iterate the feed's universe; every symbol they can signal
    // must be one the ledger books.
    if let Some(extra) = feed.symbols().iter().find(|s| !seen.contains(s.as_str())) {
        return Err(EngineError::Config(format!(
            "feed serves symbol '{extra}' outside the configured universe"
        )));
    }
    Ok(())
}
