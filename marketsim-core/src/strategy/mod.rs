//! Strategy policies — pluggable entry/exit decision logic.
//!
//! A strategy is pure decision logic over an indicator snapshot plus its own
//! per-symbol memory of the previous snapshot (needed for crossover
//! detection). It never touches the ledger and never panics: any undefined
//! indicator makes the affected condition false.

pub mod mean_reversion;
pub mod momentum;
pub mod trend;

pub use mean_reversion::{MeanReversion, MeanReversionConfig};
pub use momentum::{Momentum, MomentumConfig};
pub use trend::{TrendFollowing, TrendFollowingConfig};

use crate::domain::{Candle, ExitReason, Position};
use crate::indicators::{IndicatorConfig, IndicatorSnapshot};
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places a position size is truncated to. Keeps every
/// amount-times-price product exact, so realized P&L reconciles with the
/// cash balance digit for digit.
pub const SIZE_DECIMALS: u32 = 8;

/// Everything a strategy may look at for one step: the symbol, the candle
/// window up to and including the current candle, and the indicator
/// snapshot computed over that window.
#[derive(Debug)]
pub struct StrategyView<'a> {
    pub symbol: &'a str,
    pub candles: &'a [Candle],
    pub snapshot: &'a IndicatorSnapshot,
}

impl StrategyView<'_> {
    /// Close of the current candle, if the window is non-empty.
    pub fn close(&self) -> Option<Decimal> {
        self.candles.last().map(|c| c.close)
    }
}

/// A trading policy. One instance per run; all crossover memory lives in
/// the instance, keyed by symbol.
///
/// The engine drives the contract: `should_close` then `should_open` are
/// consulted against the current snapshot, and `observe` is called exactly
/// once per step afterwards to rotate the previous-snapshot memory.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    /// Indicator periods this strategy needs the engine to compute.
    fn indicators(&self) -> IndicatorConfig;

    /// Entry decision. Total: undefined indicators mean `false`.
    fn should_open(&self, view: &StrategyView) -> bool;

    /// Exit decision for an open position. Returns the strategy-level
    /// reason; stop-loss reasons are the engine's business.
    fn should_close(&self, view: &StrategyView, position: &Position) -> Option<ExitReason>;

    /// Record the step's snapshot as the symbol's previous snapshot.
    fn observe(&mut self, symbol: &str, snapshot: &IndicatorSnapshot);

    /// Position size in units of the asset: `balance * risk_fraction / price`,
    /// truncated to [`SIZE_DECIMALS`] places. The division is not exact for
    /// most prices; an unquantized amount would round differently in the
    /// buy and sell legs and leak sub-cent error into the books. Zero when
    /// the price is non-positive.
    fn size_position(&self, balance: Decimal, price: Decimal, risk_fraction: Decimal) -> Decimal {
        if price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (balance * risk_fraction / price)
            .round_dp_with_strategy(SIZE_DECIMALS, RoundingStrategy::ToZero)
    }
}

/// Upward crossover: previously `a <= b`, now `a > b`. False whenever any
/// of the four values is undefined.
pub(crate) fn crossed_above(
    prev_a: Option<Decimal>,
    prev_b: Option<Decimal>,
    cur_a: Option<Decimal>,
    cur_b: Option<Decimal>,
) -> bool {
    match (prev_a, prev_b, cur_a, cur_b) {
        (Some(pa), Some(pb), Some(ca), Some(cb)) => pa <= pb && ca > cb,
        _ => false,
    }
}

/// Downward crossover: previously `a >= b`, now `a < b`.
pub(crate) fn crossed_below(
    prev_a: Option<Decimal>,
    prev_b: Option<Decimal>,
    cur_a: Option<Decimal>,
    cur_b: Option<Decimal>,
) -> bool {
    match (prev_a, prev_b, cur_a, cur_b) {
        (Some(pa), Some(pb), Some(ca), Some(cb)) => pa >= pb && ca < cb,
        _ => false,
    }
}
