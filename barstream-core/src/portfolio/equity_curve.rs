//! Equity curve built from the holdings history at the end of a run.

use super::snapshot::HoldingsSnapshot;
use crate::domain::Symbol;
use crate::performance::{drawdowns, equity_curve, pct_returns, sharpe_ratio};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the output table, keyed by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityRow {
    pub timestamp: NaiveDateTime,
    pub cash: f64,
    pub commission: f64,
    pub total: f64,
    pub market_values: BTreeMap<Symbol, f64>,
    /// NaN on the first row.
    pub returns: f64,
    pub equity_curve: f64,
    pub drawdown: f64,
    pub duration: usize,
}

/// Return, equity and drawdown series derived from the holdings history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurve {
    /// Symbols in configuration order (column order for export).
    pub symbols: Vec<Symbol>,
    pub rows: Vec<EquityRow>,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
}

impl EquityCurve {
    pub fn from_holdings(symbols: &[Symbol], history: &[HoldingsSnapshot]) -> Self {
        let totals: Vec<f64> = history.iter().map(|h| h.total).collect();
        let returns = pct_returns(&totals);
        let curve = equity_curve(&returns);
        let dd = drawdowns(&curve);

        let rows = history
            .iter()
            .enumerate()
            .map(|(i, h)| EquityRow {
                timestamp: h.timestamp,
                cash: h.cash,
                commission: h.commission,
                total: h.total,
                market_values: h.market_values.clone(),
                returns: returns[i],
                equity_curve: curve[i],
                drawdown: dd.drawdown[i],
                duration: dd.duration[i],
            })
            .collect();

        Self {
            symbols: symbols.to_vec(),
            rows,
            max_drawdown: dd.max_drawdown,
            max_drawdown_duration: dd.max_duration,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.returns).collect()
    }

    /// Final equity-curve level minus one (0.0 for an empty curve).
    pub fn total_return(&self) -> f64 {
        self.rows.last().map_or(0.0, |r| r.equity_curve - 1.0)
    }

    pub fn sharpe_ratio(&self, periods_per_year: f64) -> f64 {
        sharpe_ratio(&self.returns(), periods_per_year)
    }

    /// Last `n` rows (fewer if the curve is shorter).
    pub fn tail(&self, n: usize) -> &[EquityRow] {
        let from = self.rows.len().saturating_sub(n);
        &self.rows[from..]
    }
}
