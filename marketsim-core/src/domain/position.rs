//! Open position tracking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

/// A single open position.
///
/// The ledger holds at most one per symbol: opened by a buy, destroyed when
/// fully closed. `entry_price` is the volume-weighted average when a buy
/// averages into an existing position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: PositionSide,
    pub amount: Decimal,
    pub entry_price: Decimal,
    pub entry_time: i64,
}

impl Position {
    pub fn new_long(symbol: impl Into<String>, amount: Decimal, entry_price: Decimal, entry_time: i64) -> Self {
        Self {
            symbol: symbol.into(),
            side: PositionSide::Long,
            amount,
            entry_price,
            entry_time,
        }
    }

    /// Mark-to-market value at the given price.
    pub fn market_value(&self, price: Decimal) -> Decimal {
        self.amount * price
    }

    /// Profit or loss if closed at the given price.
    pub fn unrealized_pnl(&self, price: Decimal) -> Decimal {
        match self.side {
            PositionSide::Long => self.amount * (price - self.entry_price),
            PositionSide::Short => self.amount * (self.entry_price - price),
        }
    }
}
