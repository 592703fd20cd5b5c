//! Ledger state transitions.
//!
//! The portfolio is the only writer of positions, cash and commission. Its
//! histories are append-only; callers get read-only slices.
//!
//! Valuation convention: `update_timeindex` prices the positions held when
//! the market event is dispatched, i.e. before any fill generated from that
//! bar's signals. Those fills show up in the next snapshot.

use super::equity_curve::EquityCurve;
use super::snapshot::{HoldingsSnapshot, PositionsSnapshot};
use crate::data::{DataFeed, FeedError};
use crate::domain::{BarField, Symbol};
use crate::engine::EventQueue;
use crate::events::{FillEvent, MarketEvent, SignalEvent};
use crate::sizers::{NaiveSizer, PositionSizer};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("symbol '{symbol}' is not in the portfolio universe")]
    UnknownSymbol { symbol: String },

    #[error("bar time {current} does not advance past {previous}")]
    NonMonotonicTimestamp {
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    #[error("invalid fill: {0}")]
    InvalidFill(String),

    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Running, not-yet-snapshotted account state.
#[derive(Debug, Clone)]
struct CurrentHoldings {
    cash: f64,
    commission: f64,
    /// Signed notional booked per symbol by fills.
    booked: BTreeMap<Symbol, f64>,
}

/// Portfolio ledger for one simulation run.
pub struct Portfolio {
    symbols: Vec<Symbol>,
    start: NaiveDateTime,
    initial_capital: f64,
    positions: BTreeMap<Symbol, i64>,
    holdings: CurrentHoldings,
    positions_history: Vec<PositionsSnapshot>,
    holdings_history: Vec<HoldingsSnapshot>,
    sizer: Box<dyn PositionSizer>,
    dropped_signals: usize,
}

impl Portfolio {
    /// New ledger with the naive sizer. Seeds both histories at `start`.
    pub fn new(symbols: Vec<Symbol>, start: NaiveDateTime, initial_capital: f64) -> Self {
        Self::with_sizer(
            symbols,
            start,
            initial_capital,
            Box::new(NaiveSizer::default()),
        )
    }

    pub fn with_sizer(
        symbols: Vec<Symbol>,
        start: NaiveDateTime,
        initial_capital: f64,
        sizer: Box<dyn PositionSizer>,
    ) -> Self {
        let positions: BTreeMap<Symbol, i64> = symbols.iter().map(|s| (s.clone(), 0)).collect();
        let booked: BTreeMap<Symbol, f64> = symbols.iter().map(|s| (s.clone(), 0.0)).collect();

        let seed_positions = PositionsSnapshot {
            timestamp: start,
            positions: positions.clone(),
        };
        let seed_holdings = HoldingsSnapshot {
            timestamp: start,
            cash: initial_capital,
            commission: 0.0,
            total: initial_capital,
            market_values: booked.clone(),
        };

        Self {
            symbols,
            start,
            initial_capital,
            positions,
            holdings: CurrentHoldings {
                cash: initial_capital,
                commission: 0.0,
                booked,
            },
            positions_history: vec![seed_positions],
            holdings_history: vec![seed_holdings],
            sizer,
            dropped_signals: 0,
        }
    }

    // ─── Transitions ────────────────────────────────────────────────

    /// Append one positions and one holdings snapshot for the bar just
    /// released. Call exactly once per `MarketEvent`.
    ///
    /// The time index is the latest bar time of the first (reference) symbol.
    pub fn update_timeindex(
        &mut self,
        _event: &MarketEvent,
        feed: &dyn DataFeed,
    ) -> Result<(), LedgerError> {
        let reference = self
            .symbols
            .first()
            .ok_or(LedgerError::Feed(FeedError::EmptyUniverse))?;
        let timestamp = feed.latest_bar_time(reference)?;

        let previous = self.last_timestamp();
        if timestamp <= previous {
            return Err(LedgerError::NonMonotonicTimestamp {
                previous,
                current: timestamp,
            });
        }

        let mut market_values = BTreeMap::new();
        let mut total = self.holdings.cash;
        for symbol in &self.symbols {
            let quantity = self.positions.get(symbol).copied().unwrap_or(0);
            let close = feed.latest_value(symbol, BarField::Close)?;
            let value = quantity as f64 * close;
            total += value;
            market_values.insert(symbol.clone(), value);
        }

        self.positions_history.push(PositionsSnapshot {
            timestamp,
            positions: self.positions.clone(),
        });
        self.holdings_history.push(HoldingsSnapshot {
            timestamp,
            cash: self.holdings.cash,
            commission: self.holdings.commission,
            total,
            market_values,
        });
        Ok(())
    }

    /// Ask the sizer for an order. Signals the policy rejects are dropped
    /// and logged; they are not errors.
    pub fn update_signal(
        &mut self,
        signal: &SignalEvent,
        events: &mut EventQueue,
    ) -> Result<(), LedgerError> {
        let current = self.known_position(&signal.symbol)?;
        if !signal.has_valid_strength() {
            return Err(LedgerError::InvalidSignal(format!(
                "strength {} for {} is not a finite non-negative number",
                signal.strength, signal.symbol
            )));
        }

        match self.sizer.order_for(signal, current) {
            Some(order) => {
                debug!(%order, "order generated");
                events.enqueue(order);
            }
            None => {
                self.dropped_signals += 1;
                info!(
                    symbol = %signal.symbol,
                    direction = %signal.direction,
                    position = current,
                    sizer = self.sizer.name(),
                    "signal dropped by sizing policy"
                );
            }
        }
        Ok(())
    }

    /// Apply a fill at the symbol's current close. The fill's own
    /// `fill_cost` is ignored.
    pub fn update_fill(&mut self, fill: &FillEvent, feed: &dyn DataFeed) -> Result<(), LedgerError> {
        let current = self.known_position(&fill.symbol)?;
        if !fill.commission.is_finite() || fill.commission < 0.0 {
            return Err(LedgerError::InvalidFill(format!(
                "commission {} for {} is negative or not finite",
                fill.commission, fill.symbol
            )));
        }

        let sign = fill.direction.sign();
        let delta = i64::try_from(fill.quantity)
            .ok()
            .and_then(|q| q.checked_mul(sign))
            .and_then(|d| current.checked_add(d))
            .ok_or_else(|| {
                LedgerError::InvalidFill(format!(
                    "quantity {} overflows position for {}",
                    fill.quantity, fill.symbol
                ))
            })?;

        let close = feed.latest_value(&fill.symbol, BarField::Close)?;
        let cost = sign as f64 * close * fill.quantity as f64;

        self.positions.insert(fill.symbol.clone(), delta);
        *self.holdings.booked.entry(fill.symbol.clone()).or_insert(0.0) += cost;
        self.holdings.commission += fill.commission;
        self.holdings.cash -= cost + fill.commission;

        debug!(
            symbol = %fill.symbol,
            position = delta,
            cash = self.holdings.cash,
            "fill applied"
        );
        Ok(())
    }

    /// Convert the holdings history into an equity curve.
    pub fn finalize(&self) -> EquityCurve {
        EquityCurve::from_holdings(&self.symbols, &self.holdings_history)
    }

    // ─── Read-only views ────────────────────────────────────────────

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn cash(&self) -> f64 {
        self.holdings.cash
    }

    /// Cumulative commission paid.
    pub fn commission(&self) -> f64 {
        self.holdings.commission
    }

    /// Current signed position (0 for unknown symbols).
    pub fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    pub fn positions(&self) -> &BTreeMap<Symbol, i64> {
        &self.positions
    }

    /// Signed notional booked by fills for a symbol since the start.
    pub fn booked_notional(&self, symbol: &str) -> f64 {
        self.holdings.booked.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn positions_history(&self) -> &[PositionsSnapshot] {
        &self.positions_history
    }

    pub fn holdings_history(&self) -> &[HoldingsSnapshot] {
        &self.holdings_history
    }

    /// Signals the sizing policy declined.
    pub fn dropped_signals(&self) -> usize {
        self.dropped_signals
    }

    pub fn sizer_name(&self) -> &str {
        self.sizer.name()
    }

    fn last_timestamp(&self) -> NaiveDateTime {
        self.holdings_history
            .last()
            .map(|h| h.timestamp)
            .unwrap_or(self.start)
    }

    fn known_position(&self, symbol: &str) -> Result<i64, LedgerError> {
        self.positions
            .get(symbol)
            .copied()
            .ok_or_else(|| LedgerError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }
}

impl std::fmt::Debug for Portfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portfolio")
            .field("symbols", &self.symbols)
            .field("cash", &self.holdings.cash)
            .field("commission", &self.holdings.commission)
            .field("positions", &self.positions)
            .field("snapshots", &self.holdings_history.len())
            .field("sizer", &self.sizer.name())
            .finish()
    }
}
