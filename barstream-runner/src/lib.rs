//! Barstream Runner: run configuration, CSV loading, wiring and artifacts.
//!
//! This crate builds on `barstream-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - CSV bar loading with dataset hashing
//! - Single-run entry point wiring feed, strategy, sizer and execution
//! - Summary statistics and artifact export (equity CSV, JSON manifest)

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod stats;

pub use config::{parse_timestamp, BacktestConfig, ConfigError, RunId};
pub use data_loader::{load_bars, LoadError, LoadedData};
pub use export::{
    export_equity_csv, export_manifest_json, import_manifest_json, load_manifest, render_stats,
    render_tail, save_artifacts,
};
pub use runner::{
    run_backtest, run_backtest_with_feed, BacktestResult, RunError, RunManifest, SCHEMA_VERSION,
};
pub use stats::SummaryStats;
