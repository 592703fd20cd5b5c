//! Barstream CLI: run and validate event-driven backtests.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config file and save artifacts
//! - `validate`: parse and validate a config without replaying any bars

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use barstream_runner::{
    render_stats, render_tail, run_backtest, save_artifacts, BacktestConfig, BacktestResult,
};

/// Rows of the equity curve printed after a run.
const TAIL_ROWS: usize = 10;

#[derive(Parser)]
#[command(name = "barstream", about = "Barstream CLI: event-driven bar backtester")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Override `backtest.heartbeat_ms`.
        #[arg(long)]
        heartbeat_ms: Option<u64>,

        /// Override `output.dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Parse and validate a TOML config file.
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            heartbeat_ms,
            output_dir,
        } => run_backtest_cmd(&config, heartbeat_ms, output_dir),
        Commands::Validate { config } => run_validate(&config),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn load_config(path: &Path) -> Result<BacktestConfig> {
    let config = BacktestConfig::from_file(path)?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

fn run_backtest_cmd(
    config_path: &Path,
    heartbeat_ms: Option<u64>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(ms) = heartbeat_ms {
        config.backtest.heartbeat_ms = ms;
    }
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }

    let result = run_backtest(&config)?;
    print_summary(&result);

    let run_dir = save_artifacts(&result, &config.output.dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn run_validate(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let id = config.run_id();
    println!("Config OK: {}", config_path.display());
    println!("Run id:         {}", &id[..12.min(id.len())]);
    println!("Symbols:        {}", config.backtest.symbols.join(", "));
    println!("Strategy:       {}", config.strategy_name());
    println!("Start:          {}", config.backtest.start);
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let manifest = &result.manifest;
    let summary = manifest.summary;

    println!();
    println!("=== Backtest Result ===");
    println!("Run id:         {}", &manifest.run_id[..12.min(manifest.run_id.len())]);
    println!("Symbols:        {}", manifest.config.backtest.symbols.join(", "));
    println!("Strategy:       {} ({})", manifest.strategy, manifest.sizer);
    println!("Bars:           {}", manifest.bar_count);
    for (symbol, filled) in manifest.filled_bars.iter().filter(|(_, n)| **n > 0) {
        warn!(%symbol, filled, "forward-filled bars in replay");
    }
    println!();
    println!("--- Equity curve (last {TAIL_ROWS}) ---");
    print!("{}", render_tail(&result.equity, TAIL_ROWS));
    println!();
    println!("--- Performance ---");
    print!("{}", render_stats(result.stats()));
    println!();
    println!("--- Events ---");
    println!("Signals:        {}", summary.signals);
    println!("Orders:         {}", summary.orders);
    println!("Fills:          {}", summary.fills);
    println!("Dropped:        {}", summary.dropped_signals);
}
