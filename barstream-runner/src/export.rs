//! Artifact export: equity CSV, JSON run manifest and plain-text tables.
//!
//! Persisted manifests carry a `schema_version`; unknown versions are
//! rejected on load.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use barstream_core::portfolio::{EquityCurve, EquityRow};

use crate::runner::{BacktestResult, RunManifest, SCHEMA_VERSION};
use crate::stats::SummaryStats;

/// Length of the run-id prefix used as the artifact directory name.
pub const RUN_DIR_PREFIX: usize = 12;

// ─── JSON manifest ──────────────────────────────────────────────────

pub fn export_manifest_json(manifest: &RunManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize run manifest to JSON")
}

/// Deserialize a manifest, rejecting unknown schema versions.
pub fn import_manifest_json(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize run manifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the equity curve as CSV.
///
/// Columns: datetime, cash, commission, total, one market-value column per
/// symbol (configuration order), return, equity_curve, drawdown. The first
/// row's return is written as an empty cell.
pub fn export_equity_csv(curve: &EquityCurve) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = vec!["datetime", "cash", "commission", "total"];
    header.extend(curve.symbols.iter().map(String::as_str));
    header.extend(["return", "equity_curve", "drawdown"]);
    wtr.write_record(&header)?;

    for row in &curve.rows {
        wtr.write_record(equity_record(&curve.symbols, row))?;
    }

    let bytes = wtr.into_inner().context("failed to flush equity CSV")?;
    String::from_utf8(bytes).context("equity CSV is not valid UTF-8")
}

fn equity_record(symbols: &[String], row: &EquityRow) -> Vec<String> {
    let mut record = vec![
        row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        row.cash.to_string(),
        row.commission.to_string(),
        row.total.to_string(),
    ];
    record.extend(
        symbols
            .iter()
            .map(|s| row.market_values.get(s).copied().unwrap_or(0.0).to_string()),
    );
    record.push(if row.returns.is_nan() {
        String::new()
    } else {
        row.returns.to_string()
    });
    record.push(row.equity_curve.to_string());
    record.push(row.drawdown.to_string());
    record
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `equity.csv` and `manifest.json` under `<output_dir>/<run id prefix>/`.
///
/// Returns the run directory. Re-running an identical config overwrites the
/// same directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_id = result.run_id();
    let dirname = &run_id[..RUN_DIR_PREFIX.min(run_id.len())];
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_manifest_json(&result.manifest)?;
    std::fs::write(run_dir.join("manifest.json"), json)
        .with_context(|| format!("failed to write manifest in {}", run_dir.display()))?;

    let equity_csv = export_equity_csv(&result.equity)?;
    std::fs::write(run_dir.join("equity.csv"), equity_csv)
        .with_context(|| format!("failed to write equity curve in {}", run_dir.display()))?;

    Ok(run_dir)
}

/// Load the manifest from an artifact directory.
pub fn load_manifest(dir: &Path) -> Result<RunManifest> {
    let path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_manifest_json(&json)
}

// ─── Text tables ────────────────────────────────────────────────────

/// The last `n` rows of the equity curve as a fixed-width table.
pub fn render_tail(curve: &EquityCurve, n: usize) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<19}  {:>14}  {:>10}  {:>14}", "datetime", "cash", "commission", "total");
    for symbol in &curve.symbols {
        let _ = write!(out, "  {symbol:>12}");
    }
    let _ = writeln!(out, "  {:>10}  {:>12}  {:>9}", "return", "equity_curve", "drawdown");

    for row in curve.tail(n) {
        let _ = write!(
            out,
            "{:<19}  {:>14.2}  {:>10.2}  {:>14.2}",
            row.timestamp.format("%Y-%m-%d %H:%M:%S"),
            row.cash,
            row.commission,
            row.total
        );
        for symbol in &curve.symbols {
            let mv = row.market_values.get(symbol).copied().unwrap_or(0.0);
            let _ = write!(out, "  {mv:>12.2}");
        }
        let _ = writeln!(
            out,
            "  {:>10.6}  {:>12.6}  {:>9.6}",
            row.returns, row.equity_curve, row.drawdown
        );
    }
    out
}

pub fn render_stats(stats: &SummaryStats) -> String {
    let rows = stats.rows();
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<width$}  {value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use barstream_core::portfolio::HoldingsSnapshot;
    use chrono::{Duration, NaiveDate};
    use std::collections::BTreeMap;

    fn curve() -> EquityCurve {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let symbols = vec!["SPY".to_string(), "AGG".to_string()];
        let history: Vec<HoldingsSnapshot> = [100_000.0, 101_000.0, 99_000.0]
            .iter()
            .enumerate()
            .map(|(i, &total)| HoldingsSnapshot {
                timestamp: t0 + Duration::days(i as i64),
                cash: total - 500.0 * i as f64,
                commission: 0.0,
                total,
                market_values: BTreeMap::from([
                    ("AGG".to_string(), 0.0),
                    ("SPY".to_string(), 500.0 * i as f64),
                ]),
            })
            .collect();
        EquityCurve::from_holdings(&symbols, &history)
    }

    #[test]
    fn equity_csv_header_follows_symbol_order() {
        let csv = export_equity_csv(&curve()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "datetime,cash,commission,total,SPY,AGG,return,equity_curve,drawdown"
        );
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn first_return_is_blank() {
        let csv = export_equity_csv(&curve()).unwrap();
        let first = csv.lines().nth(1).unwrap();
        let cells: Vec<&str> = first.split(',').collect();
        assert_eq!(cells[0], "2024-01-01 00:00:00");
        assert_eq!(cells[6], "");
        assert_eq!(cells[7], "1");
    }

    #[test]
    fn incomplete_manifest_is_rejected() {
        let json = r#"{"schema_version": 99}"#;
        assert!(import_manifest_json(json).is_err());
    }

    #[test]
    fn tail_renders_requested_rows() {
        let table = render_tail(&curve(), 2);
        assert_eq!(table.lines().count(), 3);
        assert!(table.lines().next().unwrap().contains("SPY"));
        assert!(table.contains("2024-01-03 00:00:00"));
        assert!(!table.contains("2024-01-01 00:00:00"));
    }

    #[test]
    fn stats_table_lists_headline_rows() {
        let stats = SummaryStats::compute(&curve(), 252.0);
        let table = render_stats(&stats);
        assert!(table.starts_with("Total Return"));
        assert!(table.contains("Drawdown Duration"));
    }
}
