//! Equity curve points.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One point of the equity curve, appended per simulated step.
///
/// `equity` is cash plus the mark-to-market value of any open position at
/// that step's close; `balance` is cash only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub equity: Decimal,
    pub balance: Decimal,
}
