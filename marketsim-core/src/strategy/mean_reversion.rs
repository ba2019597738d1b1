//! Mean-reversion policy — buy oversold dips in a range, sell the snap-back.
//!
//! Entry needs all three: RSI below the oversold threshold, close at or
//! below the lower Bollinger band, and price within `range_threshold` of the
//! long MA (a trend guard: do not catch falling knives in a real downtrend).
//! Exits on RSI overbought or on the close reverting to the middle band.

use std::collections::HashMap;

use super::{Strategy, StrategyView};
use crate::domain::{ExitReason, Position};
use crate::indicators::{IndicatorConfig, IndicatorSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionConfig {
    pub rsi_period: usize,
    pub rsi_oversold: Decimal,
    pub rsi_overbought: Decimal,
    pub bb_period: usize,
    pub bb_k: Decimal,
    pub long_ma_period: usize,
    /// Max |close - long_ma| / long_ma for the market to count as range-bound.
    pub range_threshold: Decimal,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_oversold: dec!(30),
            rsi_overbought: dec!(70),
            bb_period: 20,
            bb_k: dec!(2),
            long_ma_period: 200,
            range_threshold: dec!(0.05),
        }
    }
}

pub struct MeanReversion {
    config: MeanReversionConfig,
    prev: HashMap<String, IndicatorSnapshot>,
}

impl MeanReversion {
    pub fn new(config: MeanReversionConfig) -> Self {
        assert!(config.rsi_period >= 1, "rsi_period must be >= 1");
        assert!(config.bb_period >= 2, "bb_period must be >= 2");
        assert!(
            config.rsi_oversold < config.rsi_overbought,
            "rsi_oversold must be < rsi_overbought"
        );
        assert!(
            config.range_threshold > Decimal::ZERO,
            "range_threshold must be positive"
        );
        Self {
            config,
            prev: HashMap::new(),
        }
    }

    fn range_bound(&self, close: Decimal, long_ma: Decimal) -> bool {
        if long_ma <= Decimal::ZERO {
            return false;
        }
        let deviation = (close - long_ma).abs() / long_ma;
        deviation <= self.config.range_threshold
    }
}

impl Default for MeanReversion {
    fn default() -> Self {
        Self::new(MeanReversionConfig::default())
    }
}

impl Strategy for MeanReversion {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn indicators(&self) -> IndicatorConfig {
        IndicatorConfig {
            rsi_period: self.config.rsi_period,
            bb_period: self.config.bb_period,
            bb_k: self.config.bb_k,
            long_ma_period: self.config.long_ma_period,
            ..IndicatorConfig::default()
        }
    }

    fn should_open(&self, view: &StrategyView) -> bool {
        let (Some(close), Some(rsi), Some(bb_lower), Some(long_ma)) = (
            view.close(),
            view.snapshot.rsi,
            view.snapshot.bb_lower,
            view.snapshot.long_ma,
        ) else {
            return false;
        };

        rsi < self.config.rsi_oversold
            && close <= bb_lower
            && self.range_bound(close, long_ma)
    }

    fn should_close(&self, view: &StrategyView, _position: &Position) -> Option<ExitReason> {
        let close = view.close()?;

        if let Some(rsi) = view.snapshot.rsi {
            if rsi > self.config.rsi_overbought {
                return Some(ExitReason::RsiOverbought);
            }
        }
        if let Some(bb_middle) = view.snapshot.bb_middle {
            if close >= bb_middle {
                return Some(ExitReason::Strategy);
            }
        }
        None
    }

    fn observe(&mut self, symbol: &str, snapshot: &IndicatorSnapshot) {
        self.prev.insert(symbol.to_string(), snapshot.clone());
    }
}
