//! Moving Average Convergence/Divergence (MACD).
//!
//! MACD line = EMA(fast) - EMA(slow) of closes.
//! Signal line = EMA(signal) of the MACD-line series.
//! Both undefined until enough history exists: the MACD line needs `slow`
//! closes, the signal line needs `signal` defined MACD values on top.

use super::ma::ema_series;
use crate::domain::Candle;
use rust_decimal::Decimal;

/// MACD line and signal line for the last candle of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub line: Decimal,
    pub signal: Decimal,
}

pub fn macd(candles: &[Candle], fast: usize, slow: usize, signal: usize) -> Option<Macd> {
    if fast == 0 || signal == 0 || slow <= fast {
        return None;
    }

    let closes: Vec<Decimal> = candles.iter().map(|c| c.close).collect();
    let fast_ema = ema_series(&closes, fast);
    let slow_ema = ema_series(&closes, slow);

    // MACD line series, defined where both EMAs are.
    let macd_line: Vec<Decimal> = fast_ema
        .iter()
        .zip(&slow_ema)
        .filter_map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(*f - *s),
            _ => None,
        })
        .collect();

    let line = *macd_line.last()?;
    let signal_line = ema_series(&macd_line, signal).last().copied().flatten()?;

    Some(Macd {
        line,
        signal: signal_line,
    })
}
