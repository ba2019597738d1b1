//! marketsim-runner: orchestration around the simulation engine.
//!
//! Loads TOML run configurations, builds strategies through the thin
//! factory, executes backtests, aggregates performance metrics, and runs
//! multi-strategy comparisons in parallel.

pub mod config;
pub mod fingerprint;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError};
pub use fingerprint::RunFingerprint;
pub use metrics::PerformanceMetrics;
pub use runner::{run_backtest, BacktestResult, RunError};
pub use sweep::{compare_strategies, StrategyComparison};
