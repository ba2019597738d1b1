//! Indicator snapshots — the per-step view strategies decide on.

use super::{bollinger, macd, rsi, sma, volume_sma};
use crate::domain::Candle;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All indicator values for the last candle of a window.
///
/// `None` means undefined — insufficient history for that indicator's
/// lookback. Snapshots are immutable once produced; strategies keep the
/// previous one per symbol to detect crossovers, and a copy is embedded
/// in every trade record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub short_ma: Option<Decimal>,
    pub long_ma: Option<Decimal>,
    pub rsi: Option<Decimal>,
    pub macd_line: Option<Decimal>,
    pub macd_signal: Option<Decimal>,
    pub bb_upper: Option<Decimal>,
    pub bb_middle: Option<Decimal>,
    pub bb_lower: Option<Decimal>,
    pub volume_ma: Option<Decimal>,
}

/// Periods used to build a snapshot.
///
/// Each strategy reports the config it needs via `Strategy::indicators()`;
/// the engine recomputes the snapshot from the window at every step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub short_ma_period: usize,
    pub long_ma_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_k: Decimal,
    pub volume_ma_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            short_ma_period: 50,
            long_ma_period: 200,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_k: dec!(2),
            volume_ma_period: 20,
        }
    }
}

impl IndicatorConfig {
    /// Largest lookback any configured indicator requires. A window at
    /// least this long yields a fully defined snapshot.
    pub fn largest_lookback(&self) -> usize {
        [
            self.short_ma_period,
            self.long_ma_period,
            self.rsi_period + 1,
            self.macd_slow + self.macd_signal,
            self.bb_period,
            self.volume_ma_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Compute the snapshot for the last candle of `candles`.
///
/// Pure: derived from the window and config alone.
pub fn compute_snapshot(candles: &[Candle], config: &IndicatorConfig) -> IndicatorSnapshot {
    let bands = bollinger(candles, config.bb_period, config.bb_k);
    let macd_value = macd(candles, config.macd_fast, config.macd_slow, config.macd_signal);

    IndicatorSnapshot {
        short_ma: sma(candles, config.short_ma_period),
        long_ma: sma(candles, config.long_ma_period),
        rsi: rsi(candles, config.rsi_period),
        macd_line: macd_value.map(|m| m.line),
        macd_signal: macd_value.map(|m| m.signal),
        bb_upper: bands.map(|b| b.upper),
        bb_middle: bands.map(|b| b.middle),
        bb_lower: bands.map(|b| b.lower),
        volume_ma: volume_sma(candles, config.volume_ma_period),
    }
}
