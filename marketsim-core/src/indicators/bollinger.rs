//! Bollinger bands.
//!
//! Middle = SMA(period); upper/lower = middle ± k * sigma, where sigma is
//! the population standard deviation of the last `period` closes.

use super::ma::sma;
use crate::domain::Candle;
use rust_decimal::{Decimal, MathematicalOps};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: Decimal,
    pub middle: Decimal,
    pub lower: Decimal,
}

pub fn bollinger(candles: &[Candle], period: usize, k: Decimal) -> Option<BollingerBands> {
    let middle = sma(candles, period)?;

    let window = &candles[candles.len() - period..];
    let variance: Decimal = window
        .iter()
        .map(|c| {
            let d = c.close - middle;
            d * d
        })
        .sum::<Decimal>()
        / Decimal::from(period);
    let sigma = variance.sqrt()?;

    Some(BollingerBands {
        upper: middle + k * sigma,
        middle,
        lower: middle - k * sigma,
    })
}
