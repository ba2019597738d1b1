//! End-to-end engine scenarios over manufactured candle series.

use std::cell::Cell;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use marketsim_core::domain::{Candle, ExitReason, Position, TradeKind};
use marketsim_core::engine::{BacktestEngine, EngineConfig, RejectReason, PROGRESS_INTERVAL};
use marketsim_core::indicators::{IndicatorConfig, IndicatorSnapshot};
use marketsim_core::strategy::{Strategy, StrategyView, TrendFollowing, TrendFollowingConfig};

const HOUR_MS: i64 = 3_600_000;

fn make_candles(closes: &[Decimal]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: i as i64 * HOUR_MS,
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1000),
        })
        .collect()
}

fn trend_strategy() -> TrendFollowing {
    TrendFollowing::new(TrendFollowingConfig {
        short_ma_period: 5,
        long_ma_period: 20,
        rsi_period: 14,
        rsi_overbought: dec!(70),
    })
}

/// Test scaffold: opens a fixed number of times, never closes on its own.
struct OpenOnce {
    remaining: Cell<usize>,
}

impl OpenOnce {
    fn new() -> Self {
        Self {
            remaining: Cell::new(1),
        }
    }
}

impl Strategy for OpenOnce {
    fn name(&self) -> &str {
        "open_once"
    }
    fn indicators(&self) -> IndicatorConfig {
        IndicatorConfig::default()
    }
    fn should_open(&self, _view: &StrategyView) -> bool {
        let left = self.remaining.get();
        if left == 0 {
            return false;
        }
        self.remaining.set(left - 1);
        true
    }
    fn should_close(&self, _view: &StrategyView, _position: &Position) -> Option<ExitReason> {
        None
    }
    fn observe(&mut self, _symbol: &str, _snapshot: &IndicatorSnapshot) {}
}

// Scenario: a perfectly flat market generates no crossovers and no trades.
#[test]
fn flat_series_produces_no_trades() {
    let candles = make_candles(&vec![dec!(100); 250]);
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(0.5)));
    let mut strategy = trend_strategy();

    let result = engine.run("BTC/USD", &candles, &mut strategy);

    assert!(result.trades.is_empty());
    assert_eq!(result.final_balance, dec!(10000));
    assert_eq!(result.equity_curve.len(), 250);
    assert!(result.equity_curve.iter().all(|p| p.equity == dec!(10000)));
    assert!(result.rejected_signals.is_empty());
}

// Scenario: a V-then-peak series. The decline and recovery produce a
// golden cross on candle 67 (close 149); the later rollover produces a
// death cross on candle 127 (close 193). Exactly one round trip.
#[test]
fn v_shaped_series_trades_the_cross() {
    let closes: Vec<Decimal> = (0..180)
        .map(|i: i64| {
            let c = if i <= 59 {
                200 - i
            } else if i <= 119 {
                82 + i
            } else {
                320 - i
            };
            Decimal::from(c)
        })
        .collect();
    let candles = make_candles(&closes);

    let engine = BacktestEngine::new(EngineConfig::new(dec!(14900), dec!(1)));
    let mut strategy = trend_strategy();
    let result = engine.run("BTC/USD", &candles, &mut strategy);

    assert_eq!(result.trades.len(), 2, "trades: {:?}", result.trades);

    let buy = &result.trades[0];
    assert_eq!(buy.kind, TradeKind::Buy);
    assert_eq!(buy.price, dec!(149));
    assert_eq!(buy.timestamp, 67 * HOUR_MS);
    assert_eq!(buy.amount, dec!(100));
    // The entry snapshot is recorded with the trade.
    assert!(buy.indicators.short_ma.unwrap() > buy.indicators.long_ma.unwrap());

    let sell = &result.trades[1];
    assert_eq!(sell.kind, TradeKind::Sell);
    assert_eq!(sell.price, dec!(193));
    assert_eq!(sell.timestamp, 127 * HOUR_MS);
    assert_eq!(sell.reason, Some(ExitReason::DeathCross));
    assert_eq!(sell.profit, Some(dec!(4400)));

    assert_eq!(result.final_balance, dec!(19300));
}

// Scenario: a 3% fixed stop and a gap straight through it. The position
// exits at the traded close, so the realized loss is the full gap.
#[test]
fn fixed_stop_realizes_gap_loss() {
    let candles = make_candles(&[dec!(100), dec!(96), dec!(96)]);
    let config = EngineConfig::new(dec!(10000), dec!(1)).with_stop_loss(dec!(0.03));
    let engine = BacktestEngine::new(config);
    let mut strategy = OpenOnce::new();

    let result = engine.run("BTC/USD", &candles, &mut strategy);

    assert_eq!(result.trades.len(), 2);
    let sell = &result.trades[1];
    assert_eq!(sell.reason, Some(ExitReason::StopLoss));
    assert_eq!(sell.price, dec!(96));
    assert_eq!(sell.profit_pct, Some(dec!(-4)));
    assert_eq!(result.final_balance, dec!(9600));
}

// Scenario: position sizing. 10,000 balance at 1% risk and price 50
// buys exactly 2 units.
#[test]
fn sizing_commits_the_risk_fraction() {
    let candles = make_candles(&[dec!(50), dec!(50)]);
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(0.01)));
    let mut strategy = OpenOnce::new();

    let result = engine.run("BTC/USD", &candles, &mut strategy);

    let buy = &result.trades[0];
    assert_eq!(buy.amount, dec!(2));
    assert_eq!(result.equity_curve[0].balance, dec!(9900));
}

// When both stops would fire on the same candle, the trailing stop wins.
#[test]
fn trailing_stop_precedes_fixed_stop() {
    let candles = make_candles(&[dec!(100), dec!(120), dec!(85)]);
    let config = EngineConfig::new(dec!(10000), dec!(1))
        .with_stop_loss(dec!(0.10))
        .with_trailing_stop(dec!(0.05));
    let engine = BacktestEngine::new(config);
    let mut strategy = OpenOnce::new();

    let result = engine.run("BTC/USD", &candles, &mut strategy);

    let sell = result.trades.last().unwrap();
    assert_eq!(sell.reason, Some(ExitReason::TrailingStop));
    assert_eq!(sell.price, dec!(85));
}

#[test]
fn trailing_stop_locks_in_gains() {
    // Rise to 120 ratchets the 5% stop to 114; the pullback to 113
    // triggers it with the position still profitable.
    let candles = make_candles(&[dec!(100), dec!(110), dec!(120), dec!(113)]);
    let config = EngineConfig::new(dec!(10000), dec!(1)).with_trailing_stop(dec!(0.05));
    let engine = BacktestEngine::new(config);
    let mut strategy = OpenOnce::new();

    let result = engine.run("BTC/USD", &candles, &mut strategy);

    let sell = result.trades.last().unwrap();
    assert_eq!(sell.reason, Some(ExitReason::TrailingStop));
    assert_eq!(sell.price, dec!(113));
    assert_eq!(sell.profit, Some(dec!(1300)));
}

// A position still open after the last candle is closed at that close.
#[test]
fn open_position_is_closed_at_end() {
    let candles = make_candles(&[dec!(100), dec!(101), dec!(102)]);
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(1)));
    let mut strategy = OpenOnce::new();

    let result = engine.run("BTC/USD", &candles, &mut strategy);

    let sell = result.trades.last().unwrap();
    assert_eq!(sell.kind, TradeKind::Sell);
    assert_eq!(sell.reason, Some(ExitReason::EndOfBacktest));
    assert_eq!(sell.price, dec!(102));
    assert_eq!(result.final_balance, dec!(10200));
    // Final equity reflects the forced close.
    assert_eq!(result.equity_curve.last().unwrap().equity, dec!(10200));
}

// Sizing at prices that divide without a finite decimal expansion must
// not leak rounding error into the books: the final balance reconciles
// with the realized profits exactly.
#[test]
fn conservation_holds_with_awkward_prices() {
    let candles = make_candles(&[
        dec!(149),
        dec!(970.33),
        dec!(731.91),
        dec!(10),
        dec!(877.77),
    ]);
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(0.37)));
    let mut strategy = OpenOnce::new();

    let result = engine.run("BTC/USD", &candles, &mut strategy);

    assert!(!result.trades.is_empty());
    let realized: Decimal = result.trades.iter().filter_map(|t| t.profit).sum();
    assert_eq!(result.final_balance, dec!(10000) + realized);
}

// Series shorter than any indicator lookback degrade to a no-trade run.
#[test]
fn short_series_runs_without_trades() {
    let candles = make_candles(&[dec!(100), dec!(101), dec!(99)]);
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(0.5)));
    let mut strategy = trend_strategy();

    let result = engine.run("BTC/USD", &candles, &mut strategy);
    assert!(result.trades.is_empty());
    assert_eq!(result.equity_curve.len(), 3);
}

#[test]
fn empty_series_yields_empty_result() {
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(0.5)));
    let mut strategy = trend_strategy();

    let result = engine.run("BTC/USD", &[], &mut strategy);
    assert!(result.trades.is_empty());
    assert!(result.equity_curve.is_empty());
    assert_eq!(result.candle_count, 0);
    assert_eq!(result.final_balance, dec!(10000));
}

// Unaffordable signals are logged and skipped, never fatal.
#[test]
fn unaffordable_signal_is_rejected_not_fatal() {
    struct Whale;
    impl Strategy for Whale {
        fn name(&self) -> &str {
            "whale"
        }
        fn indicators(&self) -> IndicatorConfig {
            IndicatorConfig::default()
        }
        fn should_open(&self, _view: &StrategyView) -> bool {
            true
        }
        fn should_close(&self, _v: &StrategyView, _p: &Position) -> Option<ExitReason> {
            None
        }
        fn observe(&mut self, _symbol: &str, _snapshot: &IndicatorSnapshot) {}
        fn size_position(&self, _balance: Decimal, _price: Decimal, _f: Decimal) -> Decimal {
            dec!(1_000_000)
        }
    }

    let candles = make_candles(&[dec!(100), dec!(100)]);
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(1)));
    let mut strategy = Whale;

    let result = engine.run("BTC/USD", &candles, &mut strategy);
    assert!(result.trades.is_empty());
    assert_eq!(result.rejected_signals.len(), 2);
    assert!(matches!(
        result.rejected_signals[0].reason,
        RejectReason::InsufficientFunds { .. }
    ));
    assert_eq!(result.final_balance, dec!(10000));
}

#[test]
fn zero_size_signal_is_rejected() {
    struct Dust;
    impl Strategy for Dust {
        fn name(&self) -> &str {
            "dust"
        }
        fn indicators(&self) -> IndicatorConfig {
            IndicatorConfig::default()
        }
        fn should_open(&self, _view: &StrategyView) -> bool {
            true
        }
        fn should_close(&self, _v: &StrategyView, _p: &Position) -> Option<ExitReason> {
            None
        }
        fn observe(&mut self, _symbol: &str, _snapshot: &IndicatorSnapshot) {}
        fn size_position(&self, _balance: Decimal, _price: Decimal, _f: Decimal) -> Decimal {
            Decimal::ZERO
        }
    }

    let candles = make_candles(&[dec!(100)]);
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(1)));
    let result = engine.run("BTC/USD", &candles, &mut Dust);
    assert_eq!(result.rejected_signals.len(), 1);
    assert_eq!(result.rejected_signals[0].reason, RejectReason::ZeroSize);
}

#[test]
fn progress_fires_on_interval_and_completion() {
    let calls: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);

    let candles = make_candles(&vec![dec!(100); PROGRESS_INTERVAL + 10]);
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(0.5))).with_observer(
        Box::new(move |processed: usize, total: usize| {
            sink.lock().unwrap().push((processed, total));
        }),
    );

    let result = engine.run("BTC/USD", &candles, &mut trend_strategy());
    assert_eq!(result.observer_panics, 0);

    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            (PROGRESS_INTERVAL, PROGRESS_INTERVAL + 10),
            (PROGRESS_INTERVAL + 10, PROGRESS_INTERVAL + 10),
        ]
    );
}

#[test]
fn panicking_observer_never_aborts_the_run() {
    let candles = make_candles(&vec![dec!(100); PROGRESS_INTERVAL]);
    let engine = BacktestEngine::new(EngineConfig::new(dec!(10000), dec!(0.5)))
        .with_observer(Box::new(|_: usize, _: usize| panic!("observer bug")));

    let result = engine.run("BTC/USD", &candles, &mut trend_strategy());
    assert_eq!(result.equity_curve.len(), PROGRESS_INTERVAL);
    // Interval callback plus the completion callback, both swallowed.
    assert_eq!(result.observer_panics, 2);
}

// Identical inputs replay to an identical serialized result.
#[test]
fn runs_are_deterministic() {
    use marketsim_core::data::{MarketDataProvider, SyntheticProvider};
    use marketsim_core::domain::Timeframe;

    let candles = SyntheticProvider::new(42)
        .fetch("BTC/USD", Timeframe::H1, 400)
        .unwrap();

    let run = || {
        let engine = BacktestEngine::new(
            EngineConfig::new(dec!(10000), dec!(0.5))
                .with_stop_loss(dec!(0.05))
                .with_trailing_stop(dec!(0.08)),
        );
        let mut strategy = trend_strategy();
        let result = engine.run("BTC/USD", &candles, &mut strategy);
        serde_json::to_string(&result).unwrap()
    };

    assert_eq!(run(), run());
}
