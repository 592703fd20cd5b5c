//! Backtest runner: wires configuration, CSV data, the engine and stats.
//!
//! Two entry points:
//! - `run_backtest()`: loads CSV data from `data.csv_dir`, then runs. Used by CLI.
//! - `run_backtest_with_feed()`: takes a pre-built feed. Used by tests and
//!   callers that source bars elsewhere.

use barstream_core::components::SimulatedExecution;
use barstream_core::data::{DataFeed, FeedError, HistoricFeed};
use barstream_core::engine::{Backtest, EngineError, RunSummary};
use barstream_core::portfolio::EquityCurve;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{load_bars, LoadError};
use crate::stats::SummaryStats;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("backtest failed: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything persisted alongside the equity curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: BacktestConfig,
    pub strategy: String,
    pub sizer: String,
    pub summary: RunSummary,
    pub stats: SummaryStats,
    pub dataset_hash: String,
    /// Aligned bar sets replayed.
    pub bar_count: usize,
    /// Forward-filled bars per symbol. Empty when the feed is not a `HistoricFeed`.
    pub filled_bars: BTreeMap<String, usize>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub manifest: RunManifest,
    pub equity: EquityCurve,
}

impl BacktestResult {
    pub fn run_id(&self) -> &str {
        &self.manifest.run_id
    }

    pub fn stats(&self) -> &SummaryStats {
        &self.manifest.stats
    }

    pub fn summary(&self) -> RunSummary {
        self.manifest.summary
    }
}

/// Run a backtest from a `BacktestConfig`, loading bars from CSV.
pub fn run_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let engine_config = config.engine_config()?;

    let loaded = load_bars(
        &config.data.csv_dir,
        &engine_config.symbols,
        engine_config.start,
    )?;
    let feed = HistoricFeed::new(engine_config.symbols.clone(), loaded.bars)?;

    let bar_count = feed.len();
    let filled_bars = config
        .backtest
        .symbols
        .iter()
        .map(|s| (s.clone(), feed.filled_count(s)))
        .collect();

    let mut result = run_backtest_with_feed(config, Box::new(feed), loaded.dataset_hash)?;
    result.manifest.bar_count = bar_count;
    result.manifest.filled_bars = filled_bars;
    Ok(result)
}

/// Run a backtest over an already-built feed.
///
/// `bar_count` is taken from the replay counters; `filled_bars` is left empty.
pub fn run_backtest_with_feed(
    config: &BacktestConfig,
    feed: Box<dyn DataFeed>,
    dataset_hash: String,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let engine_config = config.engine_config()?;
    let run_id = config.run_id();

    let strategy = config.build_strategy();
    let sizer = config.build_sizer();
    let strategy_name = strategy.name().to_string();
    let sizer_name = sizer.name().to_string();

    let mut backtest = Backtest::new(
        engine_config,
        feed,
        strategy,
        sizer,
        Box::new(SimulatedExecution::new()),
    )?;
    let (summary, equity) = backtest.simulate_trading()?;
    let stats = SummaryStats::compute(&equity, config.backtest.periods_per_year);

    info!(
        run_id = %&run_id[..12.min(run_id.len())],
        total_return_pct = stats.total_return_pct,
        max_drawdown_pct = stats.max_drawdown_pct,
        "run complete"
    );

    Ok(BacktestResult {
        manifest: RunManifest {
            schema_version: SCHEMA_VERSION,
            run_id,
            config: config.clone(),
            strategy: strategy_name,
            sizer: sizer_name,
            summary,
            stats,
            dataset_hash,
            bar_count: summary.market_events,
            filled_bars: BTreeMap::new(),
        },
        equity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use barstream_core::domain::Bar;
    use chrono::{Duration, NaiveDate};
    use std::collections::HashMap;

    fn config(symbols: &[&str]) -> BacktestConfig {
        let list = symbols
            .iter()
            .map(|s| format!("\"{s}\""))
            .collect::<Vec<_>>()
            .join(", ");
        BacktestConfig::from_toml(&format!(
            r#"
[backtest]
symbols = [{list}]
start = "2024-01-01"

[data]
csv_dir = "unused"

[strategy]
type = "ma_crossover"
short_window = 2
long_window = 3
"#
        ))
        .unwrap()
    }

    fn feed(closes: &[f64]) -> HistoricFeed {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(t0 + Duration::days(i as i64), c, c, c, c, 1_000.0))
            .collect();
        HistoricFeed::new(
            vec!["SPY".to_string()],
            HashMap::from([("SPY".to_string(), bars)]),
        )
        .unwrap()
    }

    #[test]
    fn run_with_feed_produces_manifest() {
        let cfg = config(&["SPY"]);
        let closes = [10.0, 10.0, 10.0, 12.0, 14.0, 13.0, 9.0, 8.0];
        let result = run_backtest_with_feed(&cfg, Box::new(feed(&closes)), "h".into()).unwrap();

        assert_eq!(result.manifest.schema_version, SCHEMA_VERSION);
        assert_eq!(result.manifest.run_id, cfg.run_id());
        assert_eq!(result.manifest.bar_count, closes.len());
        assert_eq!(result.summary().market_events, closes.len());
        assert_eq!(result.equity.len(), closes.len() + 1);
        assert!(result.summary().fills >= 1);
    }

    #[test]
    fn invalid_config_is_rejected_before_replay() {
        let mut cfg = config(&["SPY"]);
        cfg.backtest.initial_capital = 0.0;
        let err = run_backtest_with_feed(&cfg, Box::new(feed(&[1.0, 2.0])), String::new())
            .unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[test]
    fn feed_universe_mismatch_is_engine_error() {
        let cfg = config(&["QQQ"]);
        let err = run_backtest_with_feed(&cfg, Box::new(feed(&[1.0, 2.0])), String::new())
            .unwrap_err();
        assert!(matches!(err, RunError::Engine(_)));
    }
}
