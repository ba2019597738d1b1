//! Indicator engine — pure functions over a candle window.
//!
//! Every function takes an ordered window of candles and returns
//! `Option<Decimal>` (or a small struct of them) for the *last* candle in
//! the window. `None` means undefined: the window is shorter than the
//! indicator's lookback. No hidden state, no side effects — a snapshot is
//! re-derivable from the window alone, which is what makes replay
//! deterministic and the functions unit-testable in isolation.

pub mod bollinger;
pub mod ma;
pub mod macd;
pub mod rsi;
pub mod snapshot;

pub use bollinger::{bollinger, BollingerBands};
pub use ma::{ema, ema_series, sma, volume_sma};
pub use macd::{macd, Macd};
pub use rsi::rsi;
pub use snapshot::{compute_snapshot, IndicatorConfig, IndicatorSnapshot};

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLV: open = prev close (or close for the first
/// candle), high/low bracket open and close, volume = 1000, hourly spacing.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    make_candles_with_volume(closes, &vec![1000.0; closes.len()])
}

/// Like `make_candles`, but with explicit per-candle volume.
#[cfg(test)]
pub fn make_candles_with_volume(closes: &[f64], volumes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    assert_eq!(closes.len(), volumes.len());
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let close = Decimal::from_f64(close).unwrap();
            let open = if i == 0 {
                close
            } else {
                Decimal::from_f64(closes[i - 1]).unwrap()
            };
            Candle {
                timestamp: 1_700_000_000_000 + i as i64 * 3_600_000,
                open,
                high: open.max(close) + dec!(1),
                low: (open.min(close) - dec!(1)).max(dec!(0.01)),
                close,
                volume: Decimal::from_f64(volume).unwrap(),
            }
        })
        .collect()
}

/// Assert two decimals are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: rust_decimal::Decimal, expected: rust_decimal::Decimal) {
    let epsilon = rust_decimal_macros::dec!(0.000001);
    let diff = (actual - expected).abs();
    assert!(
        diff < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={diff}"
    );
}
