//! Backtest engine — the per-candle simulation loop.
//!
//! Single-threaded and deterministic: the same candles, config, and
//! strategy produce an identical result. Parallelism belongs one level up,
//! across independent runs.

pub mod backtest;

pub use backtest::{BacktestEngine, PROGRESS_INTERVAL};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{EquityPoint, Trade};

/// Engine parameters. Percentages are fractions (0.03 = 3%); normalizing
/// user-facing whole-number percentages happens at the config boundary,
/// not here.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub initial_balance: Decimal,
    /// Fraction of the cash balance committed per entry.
    pub risk_fraction: Decimal,
    pub stop_loss_pct: Option<Decimal>,
    pub trailing_stop_pct: Option<Decimal>,
}

impl EngineConfig {
    pub fn new(initial_balance: Decimal, risk_fraction: Decimal) -> Self {
        assert!(
            initial_balance > Decimal::ZERO,
            "initial_balance must be positive"
        );
        assert!(
            risk_fraction > Decimal::ZERO && risk_fraction <= Decimal::ONE,
            "risk_fraction must be in (0, 1]"
        );
        Self {
            initial_balance,
            risk_fraction,
            stop_loss_pct: None,
            trailing_stop_pct: None,
        }
    }

    pub fn with_stop_loss(mut self, pct: Decimal) -> Self {
        self.stop_loss_pct = Some(pct);
        self
    }

    pub fn with_trailing_stop(mut self, pct: Decimal) -> Self {
        self.trailing_stop_pct = Some(pct);
        self
    }
}

/// Why an entry signal produced no trade. A log entry, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },
    ZeroSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedSignal {
    pub timestamp: i64,
    pub symbol: String,
    pub reason: RejectReason,
}

/// Everything a run produced, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub symbol: String,
    pub strategy_name: String,
    pub initial_balance: Decimal,
    pub final_balance: Decimal,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub rejected_signals: Vec<RejectedSignal>,
    pub candle_count: usize,
    /// Observer callbacks that panicked and were swallowed.
    #[serde(skip)]
    pub observer_panics: usize,
}

/// Progress callback, fired every [`PROGRESS_INTERVAL`] candles and once on
/// completion. A panicking observer never aborts the run.
pub trait ProgressObserver: Send {
    fn on_progress(&self, processed: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize) + Send,
{
    fn on_progress(&self, processed: usize, total: usize) {
        self(processed, total)
    }
}
