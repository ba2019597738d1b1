//! Moving averages: simple (SMA) and exponential (EMA).
//!
//! EMA is recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1],
//! alpha = 2 / (period + 1), seeded with the SMA of the first `period`
//! values of the window.

use crate::domain::Candle;
use rust_decimal::Decimal;

/// Arithmetic mean of the last `period` closes.
///
/// Undefined (`None`) if the window holds fewer than `period` candles.
pub fn sma(candles: &[Candle], period: usize) -> Option<Decimal> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let sum: Decimal = candles[candles.len() - period..]
        .iter()
        .map(|c| c.close)
        .sum();
    Some(sum / Decimal::from(period))
}

/// Arithmetic mean of the last `period` volumes.
pub fn volume_sma(candles: &[Candle], period: usize) -> Option<Decimal> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let sum: Decimal = candles[candles.len() - period..]
        .iter()
        .map(|c| c.volume)
        .sum();
    Some(sum / Decimal::from(period))
}

/// Exponential moving average of closes, evaluated at the last candle.
pub fn ema(candles: &[Candle], period: usize) -> Option<Decimal> {
    let closes: Vec<Decimal> = candles.iter().map(|c| c.close).collect();
    ema_series(&closes, period).last().copied().flatten()
}

/// EMA of an arbitrary value series, one output per input.
///
/// The first `period - 1` outputs are `None` (warmup); index `period - 1`
/// holds the SMA seed. Used by the MACD signal line, which needs the EMA
/// of the MACD-line series rather than of closes.
pub fn ema_series(values: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let n = values.len();
    let mut result = vec![None; n];
    if period == 0 || n < period {
        return result;
    }

    let period_dec = Decimal::from(period);
    let alpha = Decimal::TWO / (period_dec + Decimal::ONE);

    let seed: Decimal = values[..period].iter().copied().sum::<Decimal>() / period_dec;
    result[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..n {
        let next = alpha * values[i] + (Decimal::ONE - alpha) * prev;
        result[i] = Some(next);
        prev = next;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles};
    use rust_decimal_macros::dec;

    #[test]
    fn sma_basic() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(sma(&candles, 2), Some(dec!(35)));
        assert_eq!(sma(&candles, 4), Some(dec!(25)));
    }

    #[test]
    fn sma_undefined_when_window_short() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        assert_eq!(sma(&candles, 4), None);
        assert_eq!(sma(&candles, 0), None);
        assert_eq!(sma(&[], 1), None);
    }

    #[test]
    fn volume_sma_basic() {
        let candles =
            crate::indicators::make_candles_with_volume(&[10.0, 20.0], &[100.0, 300.0]);
        assert_eq!(volume_sma(&candles, 2), Some(dec!(200)));
    }

    #[test]
    fn ema_period_1_equals_close() {
        let candles = make_candles(&[100.0, 200.0, 300.0]);
        assert_eq!(ema(&candles, 1), Some(dec!(300)));
    }

    #[test]
    fn ema_3_known_values() {
        // Closes: 10, 11, 12, 13, 14
        // alpha = 2/(3+1) = 0.5
        // Seed at index 2: SMA(10,11,12) = 11.0
        // EMA[3] = 0.5*13 + 0.5*11.0 = 12.0
        // EMA[4] = 0.5*14 + 0.5*12.0 = 13.0
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_approx(ema(&candles, 3).unwrap(), dec!(13));
    }

    #[test]
    fn ema_undefined_when_window_short() {
        let candles = make_candles(&[10.0, 11.0]);
        assert_eq!(ema(&candles, 3), None);
    }

    #[test]
    fn ema_series_warmup_is_none() {
        let values = vec![dec!(10), dec!(11), dec!(12), dec!(13)];
        let series = ema_series(&values, 3);
        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert_eq!(series[2], Some(dec!(11)));
        assert_eq!(series[3], Some(dec!(12)));
    }
}
