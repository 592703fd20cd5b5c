//! Multi-symbol time alignment.
//!
//! Given bars for multiple symbols, align them to a common timeline.
//! A symbol missing a timestamp carries its previous bar forward.

use super::feed::FeedError;
use crate::domain::{Bar, Symbol};
use chrono::NaiveDateTime;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Bar data for multiple symbols on a common timeline.
#[derive(Debug, Clone)]
pub struct AlignedData {
    /// The common time axis (sorted ascending, strictly increasing).
    pub timestamps: Vec<NaiveDateTime>,
    /// Bars per symbol. Each inner Vec has the same length as `timestamps`.
    pub bars: HashMap<Symbol, Vec<Bar>>,
    /// Symbols included, in the caller's order.
    pub symbols: Vec<Symbol>,
    /// Number of forward-filled bars per symbol.
    pub filled: HashMap<Symbol, usize>,
}

/// Align `symbols` to the union of their timestamps.
///
/// The timeline starts at the first timestamp where every symbol has a real
/// bar, so no symbol is ever filled backwards. Duplicate timestamps within a
/// symbol keep the last bar supplied.
pub fn align_symbols(
    symbols: &[Symbol],
    mut symbol_bars: HashMap<Symbol, Vec<Bar>>,
) -> Result<AlignedData, FeedError> {
    if symbols.is_empty() {
        return Err(FeedError::EmptyUniverse);
    }

    let mut series: Vec<(Symbol, Vec<Bar>)> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let mut bars = symbol_bars
            .remove(symbol)
            .filter(|bars| !bars.is_empty())
            .ok_or_else(|| FeedError::NoData {
                symbol: symbol.clone(),
            })?;
        bars.sort_by_key(|bar| bar.timestamp);
        // Keep the last bar per timestamp.
        bars.reverse();
        bars.dedup_by_key(|bar| bar.timestamp);
        bars.reverse();
        series.push((symbol.clone(), bars));
    }

    let start = series
        .iter()
        .map(|(_, bars)| bars[0].timestamp)
        .max()
        .ok_or(FeedError::EmptyUniverse)?;

    let timestamps: Vec<NaiveDateTime> = series
        .iter()
        .flat_map(|(_, bars)| bars.iter().map(|bar| bar.timestamp))
        .filter(|ts| *ts >= start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut aligned = HashMap::with_capacity(series.len());
    let mut filled = HashMap::with_capacity(series.len());

    for (symbol, bars) in series {
        let (aligned_bars, fill_count) = forward_fill(&bars, &timestamps);
        if fill_count > 0 {
            warn!(
                symbol = %symbol,
                filled = fill_count,
                total = timestamps.len(),
                "forward-filled missing bars"
            );
        }
        filled.insert(symbol.clone(), fill_count);
        aligned.insert(symbol, aligned_bars);
    }

    Ok(AlignedData {
        timestamps,
        bars: aligned,
        symbols: symbols.to_vec(),
        filled,
    })
}

/// Walk `bars` (sorted, deduplicated) against `timeline`, carrying the last
/// seen bar over gaps. The first timeline entry must have a real bar at or
/// before it.
fn forward_fill(bars: &[Bar], timeline: &[NaiveDateTime]) -> (Vec<Bar>, usize) {
    let mut out = Vec::with_capacity(timeline.len());
    let mut filled = 0;
    let mut next = 0;
    let mut last: Option<&Bar> = None;

    for &ts in timeline {
        while next < bars.len() && bars[next].timestamp <= ts {
            last = Some(&bars[next]);
            next += 1;
        }
        match last {
            Some(bar) if bar.timestamp == ts => out.push(bar.clone()),
            Some(bar) => {
                out.push(bar.carried_to(ts));
                filled += 1;
            }
            None => {}
        }
    }

    (out, filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(day: u32, close: f64) -> Bar {
        Bar::new(ts(day), close - 1.0, close + 1.0, close - 2.0, close, 1000.0)
    }

    fn syms(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn align_forward_fills_gaps() {
        let mut input = HashMap::new();
        input.insert(
            "SPY".to_string(),
            vec![bar(2, 100.0), bar(3, 101.0), bar(4, 102.0)],
        );
        // QQQ missing 2024-01-03
        input.insert("QQQ".to_string(), vec![bar(2, 200.0), bar(4, 202.0)]);

        let aligned = align_symbols(&syms(&["SPY", "QQQ"]), input).unwrap();

        assert_eq!(aligned.timestamps, vec![ts(2), ts(3), ts(4)]);
        assert_eq!(aligned.bars["SPY"].len(), 3);
        assert_eq!(aligned.bars["QQQ"].len(), 3);

        let carried = &aligned.bars["QQQ"][1];
        assert_eq!(carried.timestamp, ts(3));
        assert_eq!(carried.close, 200.0);
        assert_eq!(aligned.filled["QQQ"], 1);
        assert_eq!(aligned.filled["SPY"], 0);
    }

    #[test]
    fn timeline_starts_when_every_symbol_has_data() {
        let mut input = HashMap::new();
        input.insert(
            "SPY".to_string(),
            vec![bar(2, 100.0), bar(3, 101.0), bar(4, 102.0)],
        );
        input.insert("QQQ".to_string(), vec![bar(3, 201.0), bar(4, 202.0)]);

        let aligned = align_symbols(&syms(&["SPY", "QQQ"]), input).unwrap();
        assert_eq!(aligned.timestamps, vec![ts(3), ts(4)]);
        assert_eq!(aligned.bars["SPY"][0].close, 101.0);
        assert_eq!(aligned.filled["QQQ"], 0);
    }

    #[test]
    fn unsorted_input_and_duplicates_are_normalised() {
        let mut input = HashMap::new();
        input.insert(
            "SPY".to_string(),
            vec![bar(4, 102.0), bar(2, 100.0), bar(2, 100.5)],
        );

        let aligned = align_symbols(&syms(&["SPY"]), input).unwrap();
        assert_eq!(aligned.timestamps, vec![ts(2), ts(4)]);
        assert_eq!(aligned.bars["SPY"][0].close, 100.5);
    }

    #[test]
    fn missing_symbol_is_an_error() {
        let mut input = HashMap::new();
        input.insert("SPY".to_string(), vec![bar(2, 100.0)]);

        let err = align_symbols(&syms(&["SPY", "QQQ"]), input).unwrap_err();
        assert_eq!(
            err,
            FeedError::NoData {
                symbol: "QQQ".into()
            }
        );
    }

    #[test]
    fn empty_universe_is_an_error() {
        let err = align_symbols(&[], HashMap::new()).unwrap_err();
        assert_eq!(err, FeedError::EmptyUniverse);
    }
}
