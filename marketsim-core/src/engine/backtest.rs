//! The backtest loop: window, snapshot, exits, entries, equity, observe.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rust_decimal::Decimal;

use super::{EngineConfig, ProgressObserver, RejectReason, RejectedSignal, RunResult};
use crate::domain::{Candle, EquityPoint, ExitReason};
use crate::indicators::compute_snapshot;
use crate::ledger::{LedgerError, PaperLedger};
use crate::risk::{FixedStop, TrailingStop};
use crate::strategy::{Strategy, StrategyView};

/// Candles between progress callbacks.
pub const PROGRESS_INTERVAL: usize = 500;

pub struct BacktestEngine {
    config: EngineConfig,
    observer: Option<Box<dyn ProgressObserver>>,
}

impl BacktestEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run the strategy over the candle series.
    ///
    /// Per candle `i`, in order: compute the snapshot over `candles[..=i]`,
    /// check exits on an open position (trailing stop, then fixed stop,
    /// then the strategy), check entry otherwise, record an equity point,
    /// then let the strategy observe the snapshot. Any position still open
    /// after the last candle is closed at its close with reason
    /// `end_of_backtest`. Too-short series simply produce zero trades.
    pub fn run(&self, symbol: &str, candles: &[Candle], strategy: &mut dyn Strategy) -> RunResult {
        let indicator_config = strategy.indicators();
        let mut ledger = PaperLedger::new(self.config.initial_balance);
        let mut equity_curve = Vec::with_capacity(candles.len());
        let mut rejected_signals = Vec::new();
        let mut fixed_stop: Option<FixedStop> = None;
        let mut trailing_stop: Option<TrailingStop> = None;
        let mut observer_panics = 0usize;

        for (i, candle) in candles.iter().enumerate() {
            let window = &candles[..=i];
            let snapshot = compute_snapshot(window, &indicator_config);
            let price = candle.close;
            let view = StrategyView {
                symbol,
                candles: window,
                snapshot: &snapshot,
            };

            if let Some(position) = ledger.position(symbol).cloned() {
                if let Some(ts) = trailing_stop.as_mut() {
                    ts.update(price);
                }

                // Exit precedence: trailing stop, fixed stop, strategy.
                let exit = if trailing_stop.is_some_and(|ts| ts.should_trigger(price)) {
                    Some(ExitReason::TrailingStop)
                } else if fixed_stop.is_some_and(|fs| fs.should_trigger(price)) {
                    Some(ExitReason::StopLoss)
                } else {
                    strategy.should_close(&view, &position)
                };

                if let Some(reason) = exit {
                    // Position exists, amount is positive: sell cannot fail.
                    let _ = ledger.sell(
                        symbol,
                        position.amount,
                        price,
                        candle.timestamp,
                        reason,
                        &snapshot,
                    );
                    fixed_stop = None;
                    trailing_stop = None;
                }
            } else if strategy.should_open(&view) {
                let size =
                    strategy.size_position(ledger.balance(), price, self.config.risk_fraction);
                if size <= Decimal::ZERO {
                    rejected_signals.push(RejectedSignal {
                        timestamp: candle.timestamp,
                        symbol: symbol.to_string(),
                        reason: RejectReason::ZeroSize,
                    });
                } else {
                    match ledger.buy(symbol, size, price, candle.timestamp, &snapshot) {
                        Ok(()) => {
                            if let Some(position) = ledger.position(symbol) {
                                fixed_stop = self
                                    .config
                                    .stop_loss_pct
                                    .map(|pct| FixedStop::for_position(position, pct));
                                trailing_stop = self
                                    .config
                                    .trailing_stop_pct
                                    .map(|pct| TrailingStop::open(position, pct));
                            }
                        }
                        Err(LedgerError::InsufficientFunds {
                            required,
                            available,
                        }) => {
                            rejected_signals.push(RejectedSignal {
                                timestamp: candle.timestamp,
                                symbol: symbol.to_string(),
                                reason: RejectReason::InsufficientFunds {
                                    required,
                                    available,
                                },
                            });
                        }
                        Err(_) => {}
                    }
                }
            }

            let prices = HashMap::from([(symbol.to_string(), price)]);
            equity_curve.push(EquityPoint {
                timestamp: candle.timestamp,
                equity: ledger.total_value(&prices),
                balance: ledger.balance(),
            });

            strategy.observe(symbol, &snapshot);

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                observer_panics += self.notify(i + 1, candles.len());
            }
        }

        // Force-close whatever is still open at the last close.
        if let (Some(position), Some(last)) = (ledger.position(symbol).cloned(), candles.last()) {
            let window = candles;
            let snapshot = compute_snapshot(window, &indicator_config);
            let _ = ledger.sell(
                symbol,
                position.amount,
                last.close,
                last.timestamp,
                ExitReason::EndOfBacktest,
                &snapshot,
            );
            if let Some(point) = equity_curve.last_mut() {
                point.equity = ledger.balance();
                point.balance = ledger.balance();
            }
        }

        observer_panics += self.notify(candles.len(), candles.len());

        RunResult {
            symbol: symbol.to_string(),
            strategy_name: strategy.name().to_string(),
            initial_balance: self.config.initial_balance,
            final_balance: ledger.balance(),
            trades: ledger.into_trades(),
            equity_curve,
            rejected_signals,
            candle_count: candles.len(),
            observer_panics,
        }
    }

    /// Returns 1 if the observer panicked, 0 otherwise.
    fn notify(&self, processed: usize, total: usize) -> usize {
        let Some(observer) = self.observer.as_deref() else {
            return 0;
        };
        match catch_unwind(AssertUnwindSafe(|| observer.on_progress(processed, total))) {
            Ok(()) => 0,
            Err(_) => 1,
        }
    }
}
