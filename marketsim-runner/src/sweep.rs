//! Parallel comparison and parameter sweeps.
//!
//! The engine itself is single-threaded; parallelism lives here, across
//! independent runs. Each run builds its own strategy and engine, so runs
//! share nothing but the read-only candle slice.

use rayon::prelude::*;
use serde::Serialize;

use marketsim_core::domain::{Candle, Timeframe};
use marketsim_core::engine::{BacktestEngine, EngineConfig};
use marketsim_core::strategy::{
    MeanReversion, Momentum, Strategy, TrendFollowing, TrendFollowingConfig,
};

use crate::metrics::PerformanceMetrics;

#[derive(Debug, Serialize)]
pub struct StrategyComparison {
    pub strategy: String,
    pub metrics: PerformanceMetrics,
}

fn baseline_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(TrendFollowing::default()),
        Box::new(MeanReversion::default()),
        Box::new(Momentum::default()),
    ]
}

/// Run every baseline strategy over the same candles with the same engine
/// parameters, in parallel. Results are sorted best return first.
pub fn compare_strategies(
    symbol: &str,
    candles: &[Candle],
    timeframe: Timeframe,
    engine_config: &EngineConfig,
) -> Vec<StrategyComparison> {
    let mut results: Vec<StrategyComparison> = baseline_strategies()
        .into_par_iter()
        .map(|mut strategy| {
            let engine = BacktestEngine::new(engine_config.clone());
            let run = engine.run(symbol, candles, strategy.as_mut());
            StrategyComparison {
                strategy: run.strategy_name.clone(),
                metrics: PerformanceMetrics::compute(&run, timeframe),
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.metrics
            .total_return_pct
            .partial_cmp(&a.metrics.total_return_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}

#[derive(Debug, Serialize)]
pub struct SweepPoint {
    pub short_ma_period: usize,
    pub long_ma_period: usize,
    pub metrics: PerformanceMetrics,
}

/// Grid-sweep the trend strategy's MA periods. Pairs where the short
/// period does not undercut the long one are skipped.
pub fn sweep_trend_params(
    symbol: &str,
    candles: &[Candle],
    timeframe: Timeframe,
    engine_config: &EngineConfig,
    short_periods: &[usize],
    long_periods: &[usize],
) -> Vec<SweepPoint> {
    let grid: Vec<(usize, usize)> = short_periods
        .iter()
        .flat_map(|&s| long_periods.iter().map(move |&l| (s, l)))
        .filter(|&(s, l)| s < l)
        .collect();

    let mut points: Vec<SweepPoint> = grid
        .into_par_iter()
        .map(|(short, long)| {
            let mut strategy = TrendFollowing::new(TrendFollowingConfig {
                short_ma_period: short,
                long_ma_period: long,
                ..TrendFollowingConfig::default()
            });
            let engine = BacktestEngine::new(engine_config.clone());
            let run = engine.run(symbol, candles, &mut strategy);
            SweepPoint {
                short_ma_period: short,
                long_ma_period: long,
                metrics: PerformanceMetrics::compute(&run, timeframe),
            }
        })
        .collect();

    points.sort_by(|a, b| {
        b.metrics
            .total_return_pct
            .partial_cmp(&a.metrics.total_return_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    points
}
