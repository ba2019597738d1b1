//! Single-run orchestration: config + data in, result + metrics out.

use serde::Serialize;
use thiserror::Error;

use marketsim_core::data::{DataError, MarketDataProvider};
use marketsim_core::engine::{BacktestEngine, ProgressObserver, RunResult};

use crate::config::{BacktestConfig, ConfigError};
use crate::fingerprint::RunFingerprint;
use crate::metrics::PerformanceMetrics;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// A finished backtest: the raw engine output, the aggregated metrics,
/// and the fingerprint tying both to their inputs.
#[derive(Debug, Serialize)]
pub struct BacktestResult {
    pub strategy: String,
    pub run: RunResult,
    pub metrics: PerformanceMetrics,
    pub fingerprint: RunFingerprint,
}

/// Run one backtest as described by the config, fetching candles from the
/// given provider.
pub fn run_backtest(
    config: &BacktestConfig,
    provider: &dyn MarketDataProvider,
    observer: Option<Box<dyn ProgressObserver>>,
) -> Result<BacktestResult, RunError> {
    let candles = provider.fetch(
        &config.backtest.symbol,
        config.backtest.timeframe,
        config.backtest.candles,
    )?;

    let mut strategy = config.build_strategy()?;
    let mut engine = BacktestEngine::new(config.engine_config());
    if let Some(observer) = observer {
        engine = engine.with_observer(observer);
    }

    let fingerprint = RunFingerprint::new(config, &candles);
    let run = engine.run(&config.backtest.symbol, &candles, strategy.as_mut());
    let metrics = PerformanceMetrics::compute(&run, config.backtest.timeframe);

    Ok(BacktestResult {
        strategy: run.strategy_name.clone(),
        run,
        metrics,
        fingerprint,
    })
}
