//! Pairs mean reversion on the OLS spread between two symbols.
//!
//! On every bar with a full window, the hedge ratio is the slope of `y` on
//! `x` through the origin. The spread `y - hr * x` is standardised and its
//! last value drives entries and exits for the pair.

use super::{mean, SignalGenerator};
use crate::components::ComponentError;
use crate::data::DataFeed;
use crate::domain::{BarField, Symbol};
use crate::engine::EventQueue;
use crate::events::{MarketEvent, SignalDirection, SignalEvent};

/// Market exposure of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairState {
    /// Long `y`, short `x`.
    pub long_market: bool,
    /// Short `y`, long `x`.
    pub short_market: bool,
}

/// Directions for the `(y, x)` legs, plus whether `x` carries the hedge ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSignal {
    pub y: SignalDirection,
    pub x: SignalDirection,
    pub hedged: bool,
}

impl PairState {
    /// Apply the four threshold rules in order; the last rule that matches
    /// decides the emitted pair.
    pub fn next(mut self, zscore: f64, low: f64, high: f64) -> (PairState, Option<PairSignal>) {
        let mut signal = None;

        if zscore <= -high && !self.long_market {
            self.long_market = true;
            signal = Some(PairSignal {
                y: SignalDirection::Long,
                x: SignalDirection::Short,
                hedged: true,
            });
        }
        if zscore.abs() <= low && self.long_market {
            self.long_market = false;
            signal = Some(PairSignal::exit());
        }
        if zscore >= high && !self.short_market {
            self.short_market = true;
            signal = Some(PairSignal {
                y: SignalDirection::Short,
                x: SignalDirection::Long,
                hedged: true,
            });
        }
        if zscore.abs() <= low && self.short_market {
            self.short_market = false;
            signal = Some(PairSignal::exit());
        }

        (self, signal)
    }
}

impl PairSignal {
    fn exit() -> Self {
        Self {
            y: SignalDirection::Exit,
            x: SignalDirection::Exit,
            hedged: false,
        }
    }
}

/// Slope of `y` on `x` without intercept: `Σxy / Σxx`. `None` when `Σxx == 0`.
pub fn hedge_ratio(y: &[f64], x: &[f64]) -> Option<f64> {
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = y.iter().zip(x).map(|(a, b)| a * b).sum();
    Some(sxy / sxx)
}

/// Z-score of the last spread value using the population deviation.
/// `None` when the spread is flat.
pub fn last_zscore(spread: &[f64]) -> Option<f64> {
    let last = *spread.last()?;
    let mu = mean(spread);
    let var = spread.iter().map(|s| (s - mu).powi(2)).sum::<f64>() / spread.len() as f64;
    let sd = var.sqrt();
    if sd == 0.0 || !sd.is_finite() {
        return None;
    }
    Some((last - mu) / sd)
}

/// Intraday OLS mean-reversion pairs strategy.
#[derive(Debug, Clone)]
pub struct OlsMeanReversion {
    pub strategy_id: u32,
    /// Dependent leg.
    pub y: Symbol,
    /// Hedging leg.
    pub x: Symbol,
    pub ols_window: usize,
    pub zscore_low: f64,
    pub zscore_high: f64,
    state: PairState,
    hedge_ratio: Option<f64>,
}

impl OlsMeanReversion {
    pub fn new(
        y: impl Into<Symbol>,
        x: impl Into<Symbol>,
        ols_window: usize,
        zscore_low: f64,
        zscore_high: f64,
    ) -> Self {
        Self {
            strategy_id: 1,
            y: y.into(),
            x: x.into(),
            ols_window,
            zscore_low,
            zscore_high,
            state: PairState::default(),
            hedge_ratio: None,
        }
    }

    pub fn default_params(y: impl Into<Symbol>, x: impl Into<Symbol>) -> Self {
        Self::new(y, x, 100, 0.5, 3.0)
    }

    pub fn state(&self) -> PairState {
        self.state
    }

    /// Hedge ratio from the most recent full window, if any.
    pub fn hedge_ratio(&self) -> Option<f64> {
        self.hedge_ratio
    }
}

impl SignalGenerator for OlsMeanReversion {
    fn name(&self) -> &str {
        "ols_mean_reversion"
    }

    fn calculate_signals(
        &mut self,
        _event: &MarketEvent,
        feed: &dyn DataFeed,
        events: &mut EventQueue,
    ) -> Result<(), ComponentError> {
        let y = feed.latest_values(&self.y, BarField::Close, self.ols_window)?;
        let x = feed.latest_values(&self.x, BarField::Close, self.ols_window)?;
        if self.ols_window == 0 || y.len() < self.ols_window || x.len() < self.ols_window {
            return Ok(());
        }

        let Some(hr) = hedge_ratio(&y, &x) else {
            return Ok(());
        };
        self.hedge_ratio = Some(hr);

        let spread: Vec<f64> = y.iter().zip(&x).map(|(a, b)| a - hr * b).collect();
        let Some(zscore) = last_zscore(&spread) else {
            return Ok(());
        };

        let (next, signal) = self.state.next(zscore, self.zscore_low, self.zscore_high);
        self.state = next;

        if let Some(pair) = signal {
            let timestamp = feed.latest_bar_time(&self.y)?;
            let x_strength = if pair.hedged { hr.abs() } else { 1.0 };
            events.enqueue(SignalEvent::new(
                self.strategy_id,
                self.y.clone(),
                timestamp,
                pair.y,
                1.0,
            ));
            events.enqueue(SignalEvent::new(
                self.strategy_id,
                self.x.clone(),
                timestamp,
                pair.x,
                x_strength,
            ));
        }
        Ok(())
    }
}
