//! marketsim-core: a deterministic strategy-simulation engine.
//!
//! The pipeline: a candle series feeds the indicator engine, whose
//! snapshots drive a pluggable strategy policy; the backtest engine turns
//! decisions into paper-ledger trades under the risk manager's stops and
//! records an equity point per step. All money math is `rust_decimal`;
//! floats exist only in downstream reporting.
//!
//! The engine is strictly single-threaded per run. Every component keeps
//! its state per instance, so independent runs parallelize safely.

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod ledger;
pub mod risk;
pub mod strategy;

pub use domain::{Candle, EquityPoint, ExitReason, Position, PositionSide, Timeframe, Trade, TradeKind};
pub use engine::{BacktestEngine, EngineConfig, RunResult};
pub use indicators::{IndicatorConfig, IndicatorSnapshot};
pub use ledger::{LedgerError, PaperLedger};
pub use strategy::{MeanReversion, Momentum, Strategy, TrendFollowing};
