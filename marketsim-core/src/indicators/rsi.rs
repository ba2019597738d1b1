//! Relative Strength Index (RSI).
//!
//! Average gain and average loss over the last `period` close-to-close
//! differences; RS = avg_gain / avg_loss; RSI = 100 - 100 / (1 + RS).
//! Edge case: avg_loss == 0 defines RSI = 100 (no division by zero).
//! Undefined before `period + 1` closes exist.

use crate::domain::Candle;
use rust_decimal::Decimal;

pub fn rsi(candles: &[Candle], period: usize) -> Option<Decimal> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let window = &candles[candles.len() - (period + 1)..];
    let mut gains = Decimal::ZERO;
    let mut losses = Decimal::ZERO;
    for pair in window.windows(2) {
        let change = pair[1].close - pair[0].close;
        if change > Decimal::ZERO {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let period_dec = Decimal::from(period);
    let avg_gain = gains / period_dec;
    let avg_loss = losses / period_dec;

    if avg_loss == Decimal::ZERO {
        return Some(Decimal::ONE_HUNDRED);
    }

    let rs = avg_gain / avg_loss;
    Some(Decimal::ONE_HUNDRED - Decimal::ONE_HUNDRED / (Decimal::ONE + rs))
}
