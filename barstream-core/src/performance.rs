//! Performance helpers: pure functions over explicit series.
//!
//! Every function takes slices in and returns values out. No process-wide
//! state, no dependency on the ledger or the loop.

use serde::{Deserialize, Serialize};

// ─── Return series ──────────────────────────────────────────────────

/// Period-over-period returns: `total[t] / total[t-1] - 1`.
///
/// The first entry is NaN (there is no prior period). Output has the same
/// length as the input.
pub fn pct_returns(totals: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(totals.len());
    if totals.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(totals.windows(2).map(|w| w[1] / w[0] - 1.0));
    out
}

/// Compounded equity curve with base 1.0 at the first period.
///
/// NaN returns (the leading one) contribute a factor of 1.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    let mut level = 1.0;
    returns
        .iter()
        .map(|r| {
            if !r.is_nan() {
                level *= 1.0 + r;
            }
            level
        })
        .collect()
}

// ─── Drawdowns ──────────────────────────────────────────────────────

/// Peak-to-trough drawdown series of an equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawdowns {
    /// `hwm(t) - equity(t)`, absolute in equity-curve units.
    pub drawdown: Vec<f64>,
    /// Bars since the last high-water mark (0 at a new high).
    pub duration: Vec<usize>,
    pub max_drawdown: f64,
    pub max_duration: usize,
}

/// Running high-water-mark drawdowns.
///
/// `hwm(t0) = equity(t0)`, `hwm(t) = max(hwm(t-1), equity(t))`,
/// `drawdown(t) = hwm(t) - equity(t)`, `duration(t) = duration(t-1) + 1`
/// while `drawdown(t) != 0`, else 0.
pub fn drawdowns(equity: &[f64]) -> Drawdowns {
    let mut drawdown = Vec::with_capacity(equity.len());
    let mut duration = Vec::with_capacity(equity.len());
    // hwm(t0) is equity(t0), not 0: a dip on the second row already counts
    // as drawdown.
    let mut hwm = f64::NEG_INFINITY;
    let mut run = 0usize;

    for &value in equity {
        hwm = hwm.max(value);
        let dd = hwm - value;
        run = if dd != 0.0 { run + 1 } else { 0 };
        drawdown.push(dd);
        duration.push(run);
    }

    let max_drawdown = drawdown.iter().copied().fold(0.0, f64::max);
    let max_duration = duration.iter().copied().max().unwrap_or(0);

    Drawdowns {
        drawdown,
        duration,
        max_drawdown,
        max_duration,
    }
}

// ─── Ratios ─────────────────────────────────────────────────────────

/// Annualised Sharpe ratio: `sqrt(periods_per_year) * mean / std`.
///
/// NaN entries are skipped. Uses the population standard deviation.
/// Returns NaN when no returns remain or the deviation is zero.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    let clean: Vec<f64> = returns.iter().copied().filter(|r| !r.is_nan()).collect();
    if clean.is_empty() {
        return f64::NAN;
    }
    let mu = mean_f64(&clean);
    let sd = population_std(&clean, mu);
    if sd == 0.0 {
        return f64::NAN;
    }
    periods_per_year.sqrt() * mu / sd
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64], mean: f64) -> f64 {
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{a} vs {b}");
    }

    #[test]
    fn returns_first_is_nan() {
        let r = pct_returns(&[100_000.0, 101_000.0, 99_000.0]);
        assert_eq!(r.len(), 3);
        assert!(r[0].is_nan());
        assert_close(r[1], 0.01, 1e-12);
        assert_close(r[2], 99_000.0 / 101_000.0 - 1.0, 1e-12);
        assert_close(r[2], -0.019_801_98, 1e-8);
    }

    #[test]
    fn returns_of_empty_is_empty() {
        assert!(pct_returns(&[]).is_empty());
        assert!(equity_curve(&[]).is_empty());
    }

    #[test]
    fn equity_curve_round_trip() {
        let r = pct_returns(&[100_000.0, 101_000.0, 99_000.0]);
        let eq = equity_curve(&r);
        assert_close(eq[0], 1.0, 1e-12);
        assert_close(eq[1], 1.01, 1e-12);
        assert_close(eq[2], 0.99, 1e-12);
    }

    #[test]
    fn drawdown_state_machine() {
        let dd = drawdowns(&[1.0, 1.01, 0.99]);
        assert_eq!(dd.drawdown[0], 0.0);
        assert_eq!(dd.drawdown[1], 0.0);
        assert_close(dd.drawdown[2], 0.02, 1e-12);
        assert_eq!(dd.duration, vec![0, 0, 1]);
        assert_close(dd.max_drawdown, 0.02, 1e-12);
        assert_eq!(dd.max_duration, 1);
    }

    #[test]
    fn drawdown_duration_resets_at_new_high() {
        let dd = drawdowns(&[1.0, 0.9, 0.95, 0.97, 1.0, 1.1, 1.05]);
        assert_eq!(dd.duration, vec![0, 1, 2, 3, 0, 0, 1]);
        assert_eq!(dd.max_duration, 3);
        assert_close(dd.max_drawdown, 0.1, 1e-12);
    }

    #[test]
    fn drawdown_below_base_counts_from_start() {
        let dd = drawdowns(&[1.0, 0.98]);
        assert_close(dd.drawdown[1], 0.02, 1e-12);
        assert_eq!(dd.duration, vec![0, 1]);
    }

    #[test]
    fn sharpe_known_returns() {
        let returns = [f64::NAN, 0.01, -0.01, 0.02];
        // mean = 0.00666.., population var = ((0.00333)^2 + (0.01666)^2 + (0.01333)^2) / 3
        let mu: f64 = 0.02 / 3.0;
        let var = ((0.01 - mu).powi(2) + (-0.01 - mu).powi(2) + (0.02 - mu).powi(2)) / 3.0;
        let expected = 252.0_f64.sqrt() * mu / var.sqrt();
        assert_close(sharpe_ratio(&returns, 252.0), expected, 1e-12);
    }

    #[test]
    fn sharpe_degenerate_is_nan() {
        assert!(sharpe_ratio(&[], 252.0).is_nan());
        assert!(sharpe_ratio(&[f64::NAN], 252.0).is_nan());
        assert!(sharpe_ratio(&[f64::NAN, 0.01, 0.01], 252.0).is_nan());
    }

    #[test]
    fn sharpe_annualisation_scales_with_sqrt_periods() {
        let returns = [0.01, -0.005, 0.02, 0.0];
        let daily = sharpe_ratio(&returns, 1.0);
        assert_close(sharpe_ratio(&returns, 252.0), daily * 252.0_f64.sqrt(), 1e-12);
    }
}
