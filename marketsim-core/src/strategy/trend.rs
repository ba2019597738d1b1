//! Trend-following policy — golden cross entry, death cross exit.
//!
//! Opens when the short MA crosses above the long MA while RSI is below the
//! overbought threshold (filters entries into already-stretched moves).
//! Closes on the opposite cross. Stops are the engine's concern.

use std::collections::HashMap;

use super::{crossed_above, crossed_below, Strategy, StrategyView};
use crate::domain::{ExitReason, Position};
use crate::indicators::{IndicatorConfig, IndicatorSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendFollowingConfig {
    pub short_ma_period: usize,
    pub long_ma_period: usize,
    pub rsi_period: usize,
    /// Entry filter: no open while RSI is at or above this level.
    pub rsi_overbought: Decimal,
}

impl Default for TrendFollowingConfig {
    fn default() -> Self {
        Self {
            short_ma_period: 50,
            long_ma_period: 200,
            rsi_period: 14,
            rsi_overbought: dec!(70),
        }
    }
}

pub struct TrendFollowing {
    config: TrendFollowingConfig,
    prev: HashMap<String, IndicatorSnapshot>,
}

impl TrendFollowing {
    pub fn new(config: TrendFollowingConfig) -> Self {
        assert!(config.short_ma_period >= 1, "short_ma_period must be >= 1");
        assert!(
            config.long_ma_period > config.short_ma_period,
            "long_ma_period must be > short_ma_period"
        );
        assert!(config.rsi_period >= 1, "rsi_period must be >= 1");
        Self {
            config,
            prev: HashMap::new(),
        }
    }
}

impl Default for TrendFollowing {
    fn default() -> Self {
        Self::new(TrendFollowingConfig::default())
    }
}

impl Strategy for TrendFollowing {
    fn name(&self) -> &str {
        "trend_following"
    }

    fn indicators(&self) -> IndicatorConfig {
        IndicatorConfig {
            short_ma_period: self.config.short_ma_period,
            long_ma_period: self.config.long_ma_period,
            rsi_period: self.config.rsi_period,
            ..IndicatorConfig::default()
        }
    }

    fn should_open(&self, view: &StrategyView) -> bool {
        // First snapshot for this symbol: no crossover baseline yet.
        let Some(prev) = self.prev.get(view.symbol) else {
            return false;
        };

        let golden = crossed_above(
            prev.short_ma,
            prev.long_ma,
            view.snapshot.short_ma,
            view.snapshot.long_ma,
        );
        if !golden {
            return false;
        }

        match view.snapshot.rsi {
            Some(rsi) => rsi < self.config.rsi_overbought,
            None => false,
        }
    }

    fn should_close(&self, view: &StrategyView, _position: &Position) -> Option<ExitReason> {
        let prev = self.prev.get(view.symbol)?;
        crossed_below(
            prev.short_ma,
            prev.long_ma,
            view.snapshot.short_ma,
            view.snapshot.long_ma,
        )
        .then_some(ExitReason::DeathCross)
    }

    fn observe(&mut self, symbol: &str, snapshot: &IndicatorSnapshot) {
        self.prev.insert(symbol.to_string(), snapshot.clone());
    }
}
