//! Bar loading for the runner.
//!
//! Reads `<csv_dir>/<SYMBOL>.csv` for every configured symbol. The header
//! must contain `datetime,open,high,low,close,volume`; extra columns are
//! ignored. Rows are sorted ascending and rows at or before the run start
//! are dropped so the seed snapshot precedes every replayed bar.

use barstream_core::domain::{Bar, Symbol};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::parse_timestamp;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no CSV data for '{symbol}' (expected {})", .path.display())]
    MissingData { symbol: String, path: PathBuf },

    #[error("failed to read CSV for '{symbol}': {source}")]
    Csv {
        symbol: String,
        #[source]
        source: csv::Error,
    },

    #[error("bad timestamp '{value}' in {symbol}.csv row {row}")]
    BadTimestamp {
        symbol: String,
        row: usize,
        value: String,
    },

    #[error("no bars after {start} for '{symbol}'")]
    NoBarsAfterStart { symbol: String, start: NaiveDateTime },
}

/// Result of loading bars, with provenance.
#[derive(Debug)]
pub struct LoadedData {
    /// Sorted bars per symbol, all strictly after the run start.
    pub bars: HashMap<Symbol, Vec<Bar>>,
    /// Dataset hash for fingerprinting (BLAKE3 over all bar data).
    pub dataset_hash: String,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load bars for `symbols` from `csv_dir`, keeping rows after `start`.
pub fn load_bars(
    csv_dir: &Path,
    symbols: &[Symbol],
    start: NaiveDateTime,
) -> Result<LoadedData, LoadError> {
    let mut bars = HashMap::with_capacity(symbols.len());

    for symbol in symbols {
        let path = csv_dir.join(format!("{symbol}.csv"));
        if !path.is_file() {
            return Err(LoadError::MissingData {
                symbol: symbol.clone(),
                path,
            });
        }

        let mut series = read_csv(symbol, &path)?;
        let total = series.len();
        series.retain(|bar| bar.timestamp > start);
        if series.is_empty() {
            return Err(LoadError::NoBarsAfterStart {
                symbol: symbol.clone(),
                start,
            });
        }

        let insane = series.iter().filter(|bar| !bar.is_sane()).count();
        if insane > 0 {
            warn!(symbol = %symbol, bars = insane, "bars failed OHLC sanity check");
        }
        info!(
            symbol = %symbol,
            rows = total,
            kept = series.len(),
            "loaded bars"
        );
        bars.insert(symbol.clone(), series);
    }

    let dataset_hash = compute_dataset_hash(symbols, &bars);
    Ok(LoadedData { bars, dataset_hash })
}

fn read_csv(symbol: &str, path: &Path) -> Result<Vec<Bar>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        symbol: symbol.to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let mut out = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(csv_err)?;
        let timestamp =
            parse_timestamp(&row.datetime).map_err(|_| LoadError::BadTimestamp {
                symbol: symbol.to_string(),
                row: i + 1,
                value: row.datetime.clone(),
            })?;
        out.push(Bar::new(
            timestamp, row.open, row.high, row.low, row.close, row.volume,
        ));
    }
    out.sort_by_key(|bar| bar.timestamp);
    Ok(out)
}

/// Compute a deterministic BLAKE3 hash over all bar data.
///
/// The hash covers timestamps and OHLCV values in configured symbol order.
fn compute_dataset_hash(symbols: &[Symbol], bars: &HashMap<Symbol, Vec<Bar>>) -> String {
    let mut hasher = blake3::Hasher::new();
    for symbol in symbols {
        hasher.update(symbol.as_bytes());
        if let Some(series) = bars.get(symbol) {
            for bar in series {
                hasher.update(bar.timestamp.to_string().as_bytes());
                hasher.update(&bar.open.to_le_bytes());
                hasher.update(&bar.high.to_le_bytes());
                hasher.update(&bar.low.to_le_bytes());
                hasher.update(&bar.close.to_le_bytes());
                hasher.update(&bar.volume.to_le_bytes());
            }
        }
    }
    hasher.finalize().to_hex().to_string()
}
