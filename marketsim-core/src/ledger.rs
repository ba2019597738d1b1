//! Paper ledger — simulated cash, positions, and the append-only trade log.
//!
//! All mutations go through `buy` and `sell`; value is conserved across
//! them (cash + position cost basis never changes except by realized P&L).
//! Errors are ordinary values, never panics.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{ExitReason, Position, Trade, TradeKind};
use crate::indicators::IndicatorSnapshot;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },
    #[error("no open position for {symbol}")]
    NoPosition { symbol: String },
    #[error("amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },
}

/// Simulated account: cash balance, at most one open long per symbol, and
/// the full trade history in execution order.
#[derive(Debug, Clone)]
pub struct PaperLedger {
    initial_balance: Decimal,
    balance: Decimal,
    positions: HashMap<String, Position>,
    trades: Vec<Trade>,
}

impl PaperLedger {
    pub fn new(initial_balance: Decimal) -> Self {
        assert!(
            initial_balance > Decimal::ZERO,
            "initial balance must be positive"
        );
        Self {
            initial_balance,
            balance: initial_balance,
            positions: HashMap::new(),
            trades: Vec::new(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    /// Buy `amount` at `price`. Opens a new long or averages into the
    /// existing one (amount-weighted entry price).
    pub fn buy(
        &mut self,
        symbol: &str,
        amount: Decimal,
        price: Decimal,
        timestamp: i64,
        snapshot: &IndicatorSnapshot,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount { amount });
        }
        let cost = amount * price;
        if cost > self.balance {
            return Err(LedgerError::InsufficientFunds {
                required: cost,
                available: self.balance,
            });
        }

        self.balance -= cost;
        match self.positions.get_mut(symbol) {
            Some(position) => {
                let total = position.amount + amount;
                position.entry_price =
                    (position.entry_price * position.amount + price * amount) / total;
                position.amount = total;
            }
            None => {
                self.positions
                    .insert(symbol.to_string(), Position::new_long(symbol, amount, price, timestamp));
            }
        }

        self.trades.push(Trade {
            kind: TradeKind::Buy,
            symbol: symbol.to_string(),
            price,
            timestamp,
            amount,
            reason: None,
            indicators: snapshot.clone(),
            profit: None,
            profit_pct: None,
        });
        Ok(())
    }

    /// Sell up to the open amount at `price`, realizing P&L against the
    /// position's entry price. Selling more than is held sells everything.
    pub fn sell(
        &mut self,
        symbol: &str,
        amount: Decimal,
        price: Decimal,
        timestamp: i64,
        reason: ExitReason,
        snapshot: &IndicatorSnapshot,
    ) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount { amount });
        }
        let position = self
            .positions
            .get_mut(symbol)
            .ok_or_else(|| LedgerError::NoPosition {
                symbol: symbol.to_string(),
            })?;

        let sold = amount.min(position.amount);
        let entry = position.entry_price;
        // Computed from the two cash legs so realized P&L matches the
        // balance delta to the last digit.
        let profit = sold * price - sold * entry;
        let profit_pct = if entry > Decimal::ZERO {
            (price - entry) / entry * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        self.balance += sold * price;
        position.amount -= sold;
        if position.amount == Decimal::ZERO {
            self.positions.remove(symbol);
        }

        self.trades.push(Trade {
            kind: TradeKind::Sell,
            symbol: symbol.to_string(),
            price,
            timestamp,
            amount: sold,
            reason: Some(reason),
            indicators: snapshot.clone(),
            profit: Some(profit),
            profit_pct: Some(profit_pct),
        });
        Ok(())
    }

    /// Cash plus mark-to-market value of open positions. A symbol missing
    /// from `prices` is valued at its entry price.
    pub fn total_value(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        let positions: Decimal = self
            .positions
            .iter()
            .map(|(symbol, position)| {
                let price = prices.get(symbol).copied().unwrap_or(position.entry_price);
                position.market_value(price)
            })
            .sum();
        self.balance + positions
    }

    /// Sum of realized profits over closing trades.
    pub fn realized_pnl(&self) -> Decimal {
        self.trades.iter().filter_map(|t| t.profit).sum()
    }

    /// Mark-to-market P&L of the open positions.
    pub fn unrealized_pnl(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        self.positions
            .iter()
            .map(|(symbol, position)| {
                let price = prices.get(symbol).copied().unwrap_or(position.entry_price);
                position.unrealized_pnl(price)
            })
            .sum()
    }
}
