//! Market data sources.
//!
//! `MarketDataProvider` is the seam between the engine and wherever
//! candles come from. Two implementations ship: CSV files and a seeded
//! synthetic random walk for demos and offline tests.

pub mod csv;
pub mod synthetic;

pub use self::csv::CsvProvider;
pub use synthetic::SyntheticProvider;

use thiserror::Error;

use crate::domain::{Candle, Timeframe};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed candle data: {0}")]
    Malformed(String),
    #[error("no data for symbol {symbol}")]
    NoData { symbol: String },
}

/// A source of historical candles, oldest first.
pub trait MarketDataProvider {
    /// Fetch up to `limit` candles for `symbol` at `timeframe`, in
    /// ascending timestamp order.
    fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError>;
}
