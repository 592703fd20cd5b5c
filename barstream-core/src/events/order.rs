//! Order events: execution instructions produced by the portfolio.

use crate::domain::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the order should be worked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
    Limit,
}

/// Trade direction for orders and fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1 for BUY, -1 for SELL.
    pub fn sign(self) -> i64 {
        match self {
            OrderSide::Buy => 1,
            OrderSide::Sell => -1,
        }
    }
}

/// An execution instruction for a whole number of shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub symbol: Symbol,
    pub order_type: OrderType,
    pub quantity: u64,
    pub direction: OrderSide,
}

impl OrderEvent {
    pub fn new(
        symbol: impl Into<Symbol>,
        order_type: OrderType,
        quantity: u64,
        direction: OrderSide,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            order_type,
            quantity,
            direction,
        }
    }

    /// Market order shorthand.
    pub fn market(symbol: impl Into<Symbol>, quantity: u64, direction: OrderSide) -> Self {
        Self::new(symbol, OrderType::Market, quantity, direction)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => f.write_str("MKT"),
            OrderType::Limit => f.write_str("LMT"),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => f.write_str("BUY"),
            OrderSide::Sell => f.write_str("SELL"),
        }
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "order: symbol={}, type={}, quantity={}, direction={}",
            self.symbol, self.order_type, self.quantity, self.direction
        )
    }
}
