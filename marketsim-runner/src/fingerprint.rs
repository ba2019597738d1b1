//! Run fingerprints — blake3 hashes that pin a run to its exact inputs.
//!
//! Two runs with equal fingerprints consumed identical candle data under
//! an identical configuration, so their results must match. Used to
//! assert deterministic replay and to label result files.

use serde::{Deserialize, Serialize};

use marketsim_core::domain::Candle;

use crate::config::BacktestConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFingerprint {
    /// Hash of the serialized run configuration.
    pub config: String,
    /// Hash of the candle series the run consumed.
    pub data: String,
}

impl RunFingerprint {
    pub fn new(config: &BacktestConfig, candles: &[Candle]) -> Self {
        Self {
            config: hash_config(config),
            data: hash_candles(candles),
        }
    }
}

fn hash_config(config: &BacktestConfig) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(config.backtest.symbol.as_bytes());
    hasher.update(config.backtest.timeframe.to_string().as_bytes());
    hasher.update(&config.backtest.candles.to_le_bytes());
    hasher.update(config.backtest.initial_balance.to_string().as_bytes());
    hasher.update(
        config
            .backtest
            .position_size_percent
            .to_string()
            .as_bytes(),
    );
    if let Some(pct) = config.backtest.stop_loss_percent {
        hasher.update(b"stop");
        hasher.update(pct.to_string().as_bytes());
    }
    if let Some(pct) = config.backtest.trailing_stop_percent {
        hasher.update(b"trail");
        hasher.update(pct.to_string().as_bytes());
    }
    hasher.update(config.strategy.kind.as_bytes());
    // BTreeMap ordering keeps param hashing independent of insertion order.
    let params: std::collections::BTreeMap<_, _> = config.strategy.params.iter().collect();
    for (name, value) in params {
        hasher.update(name.as_bytes());
        hasher.update(value.to_string().as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

fn hash_candles(candles: &[Candle]) -> String {
    let mut hasher = blake3::Hasher::new();
    for candle in candles {
        hasher.update(&candle.timestamp.to_le_bytes());
        for field in [candle.open, candle.high, candle.low, candle.close, candle.volume] {
            hasher.update(field.to_string().as_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
