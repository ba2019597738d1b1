//! CSV candle ingestion.
//!
//! Expects a header row of `timestamp,open,high,low,close,volume` with
//! millisecond timestamps, one candle per row, oldest first or not; rows
//! are sorted by timestamp after parsing.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{DataError, MarketDataProvider};
use crate::domain::{Candle, Timeframe};
use rust_decimal::Decimal;

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl From<CsvRow> for Candle {
    fn from(row: CsvRow) -> Self {
        Candle {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Reads candles from a single CSV file. The symbol and timeframe passed
/// to `fetch` are trusted to match the file's contents.
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MarketDataProvider for CsvProvider {
    fn fetch(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| {
            if e.is_io_error() {
                DataError::Io {
                    path: self.path.display().to_string(),
                    source: std::io::Error::other(e),
                }
            } else {
                DataError::Malformed(e.to_string())
            }
        })?;

        let mut candles = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| DataError::Malformed(e.to_string()))?;
            let candle = Candle::from(row);
            if !candle.is_sane() {
                return Err(DataError::Malformed(format!(
                    "insane candle at timestamp {}",
                    candle.timestamp
                )));
            }
            candles.push(candle);
        }

        if candles.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        candles.sort_by_key(|c| c.timestamp);
        if candles.len() > limit {
            candles.drain(..candles.len() - limit);
        }
        Ok(candles)
    }
}
