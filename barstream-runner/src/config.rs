//! TOML run configuration.
//!
//! ```toml
//! [backtest]
//! symbols = ["SPY", "QQQ"]
//! initial_capital = 100000.0
//! heartbeat_ms = 0
//! start = "2022-09-30 04:00:00"
//! periods_per_year = 252.0
//!
//! [data]
//! csv_dir = "data"
//!
//! [strategy]
//! type = "ols_mean_reversion"
//! ols_window = 100
//!
//! [sizing]
//! type = "naive"
//! quantity = 100
//!
//! [output]
//! dir = "results"
//! ```

use barstream_core::components::{MovingAverageCross, OlsMeanReversion, SignalGenerator};
use barstream_core::engine::EngineConfig;
use barstream_core::sizers::{NaiveSizer, PositionSizer, ScaledSizer};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid timestamp '{0}': expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    BadTimestamp(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Full run configuration as read from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub data: DataSection,
    pub strategy: StrategySection,
    #[serde(default)]
    pub sizing: SizingSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    /// Ordered universe; the first symbol is the time-index reference.
    pub symbols: Vec<String>,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    #[serde(default)]
    pub heartbeat_ms: u64,
    /// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
    pub start: String,
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSection {
    pub csv_dir: PathBuf,
}

/// Strategy selection (serializable enum).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategySection {
    MaCrossover {
        #[serde(default = "default_short_window")]
        short_window: usize,
        #[serde(default = "default_long_window")]
        long_window: usize,
    },
    OlsMeanReversion {
        #[serde(default = "default_ols_window")]
        ols_window: usize,
        #[serde(default = "default_zscore_low")]
        zscore_low: f64,
        #[serde(default = "default_zscore_high")]
        zscore_high: f64,
    },
}

/// Position sizer selection (serializable enum).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SizingSection {
    Naive {
        #[serde(default = "default_quantity")]
        quantity: u64,
    },
    Scaled {
        #[serde(default = "default_quantity")]
        quantity: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for SizingSection {
    fn default() -> Self {
        SizingSection::Naive {
            quantity: default_quantity(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_initial_capital() -> f64 {
    100_000.0
}
fn default_periods_per_year() -> f64 {
    252.0
}
fn default_short_window() -> usize {
    5
}
fn default_long_window() -> usize {
    20
}
fn default_ols_window() -> usize {
    100
}
fn default_zscore_low() -> f64 {
    0.5
}
fn default_zscore_high() -> f64 {
    3.0
}
fn default_quantity() -> u64 {
    100
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

impl BacktestConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reject configurations the engine or the strategies cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bt = &self.backtest;
        if bt.symbols.is_empty() {
            return Err(ConfigError::Invalid("backtest.symbols is empty".into()));
        }
        let mut seen = HashSet::new();
        for symbol in &bt.symbols {
            if symbol.trim().is_empty() {
                return Err(ConfigError::Invalid("blank symbol in backtest.symbols".into()));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate symbol '{symbol}'")));
            }
        }
        if !bt.initial_capital.is_finite() || bt.initial_capital <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_capital must be positive, got {}",
                bt.initial_capital
            )));
        }
        if !bt.periods_per_year.is_finite() || bt.periods_per_year <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "periods_per_year must be positive, got {}",
                bt.periods_per_year
            )));
        }
        parse_timestamp(&bt.start)?;

        match &self.strategy {
            StrategySection::MaCrossover {
                short_window,
                long_window,
            } => {
                if *short_window == 0 || short_window >= long_window {
                    return Err(ConfigError::Invalid(format!(
                        "ma_crossover needs 0 < short_window < long_window, got {short_window}/{long_window}"
                    )));
                }
            }
            StrategySection::OlsMeanReversion {
                ols_window,
                zscore_low,
                zscore_high,
            } => {
                if bt.symbols.len() != 2 {
                    return Err(ConfigError::Invalid(format!(
                        "ols_mean_reversion trades a pair, got {} symbols",
                        bt.symbols.len()
                    )));
                }
                if *ols_window < 2 {
                    return Err(ConfigError::Invalid(format!(
                        "ols_window must be at least 2, got {ols_window}"
                    )));
                }
                if !(zscore_low.is_finite() && zscore_high.is_finite())
                    || *zscore_low < 0.0
                    || zscore_low >= zscore_high
                {
                    return Err(ConfigError::Invalid(format!(
                        "ols_mean_reversion needs 0 <= zscore_low < zscore_high, got {zscore_low}/{zscore_high}"
                    )));
                }
            }
        }

        let quantity = match self.sizing {
            SizingSection::Naive { quantity } | SizingSection::Scaled { quantity } => quantity,
        };
        if quantity == 0 {
            return Err(ConfigError::Invalid("sizing.quantity must be positive".into()));
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        // Serialising plain data to JSON cannot fail; fall back to Debug if it ever does.
        let json = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }

    /// Core engine configuration.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let start = parse_timestamp(&self.backtest.start)?;
        Ok(EngineConfig::new(
            self.backtest.symbols.clone(),
            self.backtest.initial_capital,
            start,
        )
        .with_heartbeat(Duration::from_millis(self.backtest.heartbeat_ms)))
    }

    pub fn build_strategy(&self) -> Box<dyn SignalGenerator> {
        match &self.strategy {
            StrategySection::MaCrossover {
                short_window,
                long_window,
            } => Box::new(MovingAverageCross::new(*short_window, *long_window)),
            StrategySection::OlsMeanReversion {
                ols_window,
                zscore_low,
                zscore_high,
            } => {
                let y = self.backtest.symbols.first().cloned().unwrap_or_default();
                let x = self.backtest.symbols.get(1).cloned().unwrap_or_default();
                Box::new(OlsMeanReversion::new(
                    y,
                    x,
                    *ols_window,
                    *zscore_low,
                    *zscore_high,
                ))
            }
        }
    }

    pub fn build_sizer(&self) -> Box<dyn PositionSizer> {
        match self.sizing {
            SizingSection::Naive { quantity } => Box::new(NaiveSizer::new(quantity)),
            SizingSection::Scaled { quantity } => Box::new(ScaledSizer::new(quantity)),
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        match self.strategy {
            StrategySection::MaCrossover { .. } => "ma_crossover",
            StrategySection::OlsMeanReversion { .. } => "ols_mean_reversion",
        }
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, ConfigError> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ConfigError::BadTimestamp(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [backtest]
        symbols = ["SPY"]
        start = "2024-01-01"

        [data]
        csv_dir = "data"

        [strategy]
        type = "ma_crossover"
    "#;

    const PAIRS: &str = r#"
        [backtest]
        symbols = ["SPY", "QQQ"]
        initial_capital = 50000.0
        heartbeat_ms = 5
        start = "2022-09-30 04:00:00"
        periods_per_year = 98280.0

        [data]
        csv_dir = "/tmp/bars"

        [strategy]
        type = "ols_mean_reversion"
        ols_window = 50

        [sizing]
        type = "scaled"
        quantity = 200

        [output]
        dir = "out"
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = BacktestConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(cfg.backtest.initial_capital, 100_000.0);
        assert_eq!(cfg.backtest.heartbeat_ms, 0);
        assert_eq!(cfg.backtest.periods_per_year, 252.0);
        assert_eq!(
            cfg.strategy,
            StrategySection::MaCrossover {
                short_window: 5,
                long_window: 20
            }
        );
        assert_eq!(cfg.sizing, SizingSection::Naive { quantity: 100 });
        assert_eq!(cfg.output.dir, PathBuf::from("results"));
        cfg.validate().unwrap();
    }

    #[test]
    fn pairs_config_parses() {
        let cfg = BacktestConfig::from_toml(PAIRS).unwrap();
        cfg.validate().unwrap();
        assert_eq!(
            cfg.strategy,
            StrategySection::OlsMeanReversion {
                ols_window: 50,
                zscore_low: 0.5,
                zscore_high: 3.0
            }
        );
        let engine = cfg.engine_config().unwrap();
        assert_eq!(engine.symbols, vec!["SPY".to_string(), "QQQ".to_string()]);
        assert_eq!(engine.heartbeat, Duration::from_millis(5));
        assert_eq!(engine.start, parse_timestamp("2022-09-30 04:00:00").unwrap());
        assert_eq!(cfg.build_strategy().name(), "ols_mean_reversion");
        assert_eq!(cfg.build_sizer().name(), "scaled");
    }

    #[test]
    fn unknown_strategy_type_fails_to_parse() {
        let bad = MINIMAL.replace("ma_crossover", "neural_net");
        assert!(matches!(
            BacktestConfig::from_toml(&bad),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = BacktestConfig::from_toml(MINIMAL).unwrap();
        cfg.backtest.initial_capital = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = BacktestConfig::from_toml(MINIMAL).unwrap();
        cfg.backtest.symbols = vec![];
        assert!(cfg.validate().is_err());

        let mut cfg = BacktestConfig::from_toml(MINIMAL).unwrap();
        cfg.backtest.symbols = vec!["SPY".into(), "SPY".into()];
        assert!(cfg.validate().is_err());

        let mut cfg = BacktestConfig::from_toml(MINIMAL).unwrap();
        cfg.strategy = StrategySection::MaCrossover {
            short_window: 20,
            long_window: 20,
        };
        assert!(cfg.validate().is_err());

        let mut cfg = BacktestConfig::from_toml(MINIMAL).unwrap();
        cfg.backtest.start = "yesterday".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::BadTimestamp(_))));
    }

    #[test]
    fn pairs_strategy_needs_two_symbols() {
        let mut cfg = BacktestConfig::from_toml(PAIRS).unwrap();
        cfg.backtest.symbols.push("IWM".into());
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn run_id_deterministic_and_sensitive() {
        let a = BacktestConfig::from_toml(MINIMAL).unwrap();
        let b = BacktestConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(a.run_id(), b.run_id());
        assert_eq!(a.run_id().len(), 64);

        let mut c = a.clone();
        c.backtest.initial_capital = 1.0;
        assert_ne!(a.run_id(), c.run_id());
    }

    #[test]
    fn timestamp_formats() {
        let midnight = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(midnight.to_string(), "2024-03-01 00:00:00");
        let intraday = parse_timestamp("2024-03-01 09:31:00").unwrap();
        assert_eq!(intraday.to_string(), "2024-03-01 09:31:00");
        assert_eq!(parse_timestamp("2024-03-01T09:31:00").unwrap(), intraday);
        assert!(parse_timestamp("03/01/2024").is_err());
    }
}
