//! Summary statistics: the headline numbers printed and persisted per run.

use barstream_core::portfolio::EquityCurve;
use serde::{Deserialize, Serialize};

/// Headline statistics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// `(equity_curve_last - 1) * 100`.
    pub total_return_pct: f64,
    /// NaN when the return series is flat or empty; persisted as `null`.
    #[serde(with = "nan_as_null")]
    pub sharpe_ratio: f64,
    /// Largest drawdown in equity-curve units, times 100.
    pub max_drawdown_pct: f64,
    /// Longest drawdown, in bars.
    pub drawdown_duration: usize,
    pub final_equity: f64,
    pub total_commission: f64,
}

impl SummaryStats {
    pub fn compute(curve: &EquityCurve, periods_per_year: f64) -> Self {
        let last = curve.rows.last();
        Self {
            total_return_pct: curve.total_return() * 100.0,
            sharpe_ratio: curve.sharpe_ratio(periods_per_year),
            max_drawdown_pct: curve.max_drawdown * 100.0,
            drawdown_duration: curve.max_drawdown_duration,
            final_equity: last.map_or(0.0, |r| r.total),
            total_commission: last.map_or(0.0, |r| r.commission),
        }
    }

    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Return", format!("{:.2}%", self.total_return_pct)),
            ("Sharpe Ratio", format!("{:.2}", self.sharpe_ratio)),
            ("Max Drawdown", format!("{:.2}%", self.max_drawdown_pct)),
            ("Drawdown Duration", self.drawdown_duration.to_string()),
            ("Final Equity", format!("{:.2}", self.final_equity)),
            ("Total Commission", format!("{:.2}", self.total_commission)),
        ]
    }
}

mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
