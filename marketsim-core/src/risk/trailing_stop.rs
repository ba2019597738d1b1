//! Trailing stop — a stop that ratchets with the favorable price extreme.
//!
//! For a long: peak = max price seen since entry, stop = peak * (1 - pct).
//! The stop only ever tightens; adverse moves leave it in place.

use crate::domain::{Position, PositionSide};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingStop {
    pub side: PositionSide,
    pub trail_pct: Decimal,
    pub peak_price: Decimal,
    pub stop_price: Decimal,
}

impl TrailingStop {
    /// Arm a trailing stop at entry. The peak starts at the entry price.
    pub fn open(position: &Position, trail_pct: Decimal) -> Self {
        assert!(trail_pct > Decimal::ZERO, "trail pct must be positive");
        let mut stop = Self {
            side: position.side,
            trail_pct,
            peak_price: position.entry_price,
            stop_price: Decimal::ZERO,
        };
        stop.stop_price = stop.stop_for_peak();
        stop
    }

    fn stop_for_peak(&self) -> Decimal {
        match self.side {
            PositionSide::Long => self.peak_price * (Decimal::ONE - self.trail_pct),
            PositionSide::Short => self.peak_price * (Decimal::ONE + self.trail_pct),
        }
    }

    /// Ratchet the peak toward the favorable extreme and recompute the stop.
    /// Monotone: the stop never loosens.
    pub fn update(&mut self, price: Decimal) {
        let improved = match self.side {
            PositionSide::Long => price > self.peak_price,
            PositionSide::Short => price < self.peak_price,
        };
        if improved {
            self.peak_price = price;
            self.stop_price = self.stop_for_peak();
        }
    }

    pub fn should_trigger(&self, price: Decimal) -> bool {
        match self.side {
            PositionSide::Long => price <= self.stop_price,
            PositionSide::Short => price >= self.stop_price,
        }
    }
}
