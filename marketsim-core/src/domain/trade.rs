//! Executed trade records and exit reasons.

use crate::indicators::IndicatorSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an executed ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

/// Why a position was closed.
///
/// Recorded on closing trades only, following the engine's precedence:
/// trailing stop, then fixed stop, then a strategy-specific reason, then
/// the generic strategy close, then the forced end-of-data close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TrailingStop,
    StopLoss,
    DeathCross,
    RsiOverbought,
    Strategy,
    EndOfBacktest,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::TrailingStop => "trailing_stop",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::DeathCross => "death_cross",
            ExitReason::RsiOverbought => "rsi_overbought",
            ExitReason::Strategy => "strategy",
            ExitReason::EndOfBacktest => "end_of_backtest",
        };
        f.write_str(s)
    }
}

/// Immutable record appended on every executed ledger operation.
///
/// `reason`, `profit`, and `profit_pct` are populated on sells only.
/// The indicator snapshot is copied in at execution time so downstream
/// reporting can explain the trade without replaying the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub kind: TradeKind,
    pub symbol: String,
    pub price: Decimal,
    pub timestamp: i64,
    pub amount: Decimal,
    pub reason: Option<ExitReason>,
    pub indicators: IndicatorSnapshot,
    pub profit: Option<Decimal>,
    pub profit_pct: Option<Decimal>,
}

impl Trade {
    /// True for a closing trade with positive profit.
    pub fn is_winner(&self) -> bool {
        self.profit.is_some_and(|p| p > Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn exit_reason_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ExitReason::TrailingStop).unwrap(),
            "\"trailing_stop\""
        );
        assert_eq!(
            serde_json::to_string(&ExitReason::EndOfBacktest).unwrap(),
            "\"end_of_backtest\""
        );
    }

    #[test]
    fn exit_reason_display_matches_serde() {
        for reason in [
            ExitReason::TrailingStop,
            ExitReason::StopLoss,
            ExitReason::DeathCross,
            ExitReason::RsiOverbought,
            ExitReason::Strategy,
            ExitReason::EndOfBacktest,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{reason}\""));
        }
    }

    #[test]
    fn winner_requires_positive_profit() {
        let mut trade = Trade {
            kind: TradeKind::Sell,
            symbol: "BTC/USDT".into(),
            price: dec!(110),
            timestamp: 0,
            amount: dec!(1),
            reason: Some(ExitReason::Strategy),
            indicators: IndicatorSnapshot::default(),
            profit: Some(dec!(10)),
            profit_pct: Some(dec!(10)),
        };
        assert!(trade.is_winner());

        trade.profit = Some(dec!(-5));
        assert!(!trade.is_winner());

        trade.profit = None; // opening trade
        assert!(!trade.is_winner());
    }
}
