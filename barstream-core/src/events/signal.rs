//! Signal events: trade suggestions emitted by a strategy.

use crate::domain::Symbol;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the strategy would like the portfolio to do with a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalDirection {
    Long,
    Short,
    Exit,
}

/// A trade suggestion, not an order. The portfolio decides whether and how
/// much to trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub strategy_id: u32,
    pub symbol: Symbol,
    pub timestamp: NaiveDateTime,
    pub direction: SignalDirection,
    /// Non-negative scaling hint for the sizer (pairs strategies pass the hedge ratio).
    pub strength: f64,
}

impl SignalEvent {
    pub fn new(
        strategy_id: u32,
        symbol: impl Into<Symbol>,
        timestamp: NaiveDateTime,
        direction: SignalDirection,
        strength: f64,
    ) -> Self {
        Self {
            strategy_id,
            symbol: symbol.into(),
            timestamp,
            direction,
            strength,
        }
    }

    /// Strength must be a finite, non-negative number.
    pub fn has_valid_strength(&self) -> bool {
        self.strength.is_finite() && self.strength >= 0.0
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalDirection::Long => "LONG",
            SignalDirection::Short => "SHORT",
            SignalDirection::Exit => "EXIT",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn strength_validation() {
        let mut signal = SignalEvent::new(1, "SPY", ts(), SignalDirection::Long, 1.0);
        assert!(signal.has_valid_strength());

        signal.strength = 0.0;
        assert!(signal.has_valid_strength());

        signal.strength = -0.5;
        assert!(!signal.has_valid_strength());

        signal.strength = f64::NAN;
        assert!(!signal.has_valid_strength());
    }

    #[test]
    fn direction_display() {
        assert_eq!(SignalDirection::Exit.to_string(), "EXIT");
    }
}
