//! Fixed stop-loss — a stop price frozen at entry.

use crate::domain::{Position, PositionSide};
use rust_decimal::Decimal;

/// Stop at `entry * (1 - pct)` for longs, `entry * (1 + pct)` for shorts.
/// Never updated after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStop {
    pub side: PositionSide,
    pub stop_price: Decimal,
}

impl FixedStop {
    /// `pct` is a fraction: 0.03 means a 3% stop.
    pub fn for_position(position: &Position, pct: Decimal) -> Self {
        assert!(pct > Decimal::ZERO, "stop pct must be positive");
        let stop_price = match position.side {
            PositionSide::Long => position.entry_price * (Decimal::ONE - pct),
            PositionSide::Short => position.entry_price * (Decimal::ONE + pct),
        };
        Self {
            side: position.side,
            stop_price,
        }
    }

    pub fn should_trigger(&self, price: Decimal) -> bool {
        match self.side {
            PositionSide::Long => price <= self.stop_price,
            PositionSide::Short => price >= self.stop_price,
        }
    }
}
