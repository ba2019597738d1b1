//! Momentum policy — confirmation voting over three momentum signals.
//!
//! Bullish signals: RSI rising against the previous snapshot, MACD line
//! above its signal line, volume above its moving average. Opens when at
//! least two of the three hold; closes when at least two of the bearish
//! mirrors hold. An undefined input makes its vote false on both sides.

use std::collections::HashMap;

use super::{Strategy, StrategyView};
use crate::domain::{ExitReason, Position};
use crate::indicators::{IndicatorConfig, IndicatorSnapshot};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub volume_ma_period: usize,
    /// Votes required out of three, for entry and for exit alike.
    pub required_votes: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volume_ma_period: 20,
            required_votes: 2,
        }
    }
}

pub struct Momentum {
    config: MomentumConfig,
    prev: HashMap<String, IndicatorSnapshot>,
}

impl Momentum {
    pub fn new(config: MomentumConfig) -> Self {
        assert!(config.macd_fast >= 1, "macd_fast must be >= 1");
        assert!(
            config.macd_slow > config.macd_fast,
            "macd_slow must be > macd_fast"
        );
        assert!(
            (1..=3).contains(&config.required_votes),
            "required_votes must be between 1 and 3"
        );
        Self {
            config,
            prev: HashMap::new(),
        }
    }

    fn bullish_votes(&self, view: &StrategyView) -> usize {
        let snap = view.snapshot;
        let prev = self.prev.get(view.symbol);

        let rsi_rising = matches!(
            (prev.and_then(|p| p.rsi), snap.rsi),
            (Some(prev_rsi), Some(cur_rsi)) if cur_rsi > prev_rsi
        );
        let macd_bullish = matches!(
            (snap.macd_line, snap.macd_signal),
            (Some(line), Some(signal)) if line > signal
        );
        let volume_high = matches!(
            (volume(view), snap.volume_ma),
            (Some(v), Some(avg)) if v > avg
        );

        usize::from(rsi_rising) + usize::from(macd_bullish) + usize::from(volume_high)
    }

    fn bearish_votes(&self, view: &StrategyView) -> usize {
        let snap = view.snapshot;
        let prev = self.prev.get(view.symbol);

        let rsi_falling = matches!(
            (prev.and_then(|p| p.rsi), snap.rsi),
            (Some(prev_rsi), Some(cur_rsi)) if cur_rsi < prev_rsi
        );
        let macd_bearish = matches!(
            (snap.macd_line, snap.macd_signal),
            (Some(line), Some(signal)) if line < signal
        );
        let volume_low = matches!(
            (volume(view), snap.volume_ma),
            (Some(v), Some(avg)) if v < avg
        );

        usize::from(rsi_falling) + usize::from(macd_bearish) + usize::from(volume_low)
    }
}

fn volume(view: &StrategyView) -> Option<Decimal> {
    view.candles.last().map(|c| c.volume)
}

impl Default for Momentum {
    fn default() -> Self {
        Self::new(MomentumConfig::default())
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn indicators(&self) -> IndicatorConfig {
        IndicatorConfig {
            rsi_period: self.config.rsi_period,
            macd_fast: self.config.macd_fast,
            macd_slow: self.config.macd_slow,
            macd_signal: self.config.macd_signal,
            volume_ma_period: self.config.volume_ma_period,
            ..IndicatorConfig::default()
        }
    }

    fn should_open(&self, view: &StrategyView) -> bool {
        self.bullish_votes(view) >= self.config.required_votes
    }

    fn should_close(&self, view: &StrategyView, _position: &Position) -> Option<ExitReason> {
        (self.bearish_votes(view) >= self.config.required_votes).then_some(ExitReason::Strategy)
    }

    fn observe(&mut self, symbol: &str, snapshot: &IndicatorSnapshot) {
        self.prev.insert(symbol.to_string(), snapshot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;
    use rust_decimal_macros::dec;

    fn candle(volume: Decimal) -> Candle {
        Candle {
            timestamp: 0,
            open: dec!(100),
            high: dec!(100),
            low: dec!(100),
            close: dec!(100),
            volume,
        }
    }

    fn snapshot(rsi: f64, macd_line: f64, macd_signal: f64, volume_ma: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi: Some(Decimal::try_from(rsi).unwrap()),
            macd_line: Some(Decimal::try_from(macd_line).unwrap()),
            macd_signal: Some(Decimal::try_from(macd_signal).unwrap()),
            volume_ma: Some(Decimal::try_from(volume_ma).unwrap()),
            ..IndicatorSnapshot::default()
        }
    }

    fn view<'a>(snapshot: &'a IndicatorSnapshot, candles: &'a [Candle]) -> StrategyView<'a> {
        StrategyView {
            symbol: "BTC/USD",
            candles,
            snapshot,
        }
    }

    fn position() -> Position {
        Position::new_long("BTC/USD", dec!(1), dec!(100), 0)
    }

    #[test]
    fn opens_on_three_of_three() {
        let mut strategy = Momentum::default();
        strategy.observe("BTC/USD", &snapshot(50.0, 0.0, 0.0, 1000.0));

        let candles = [candle(dec!(1500))];
        let snap = snapshot(55.0, 1.0, 0.5, 1000.0);
        assert!(strategy.should_open(&view(&snap, &candles)));
    }

    #[test]
    fn opens_on_two_of_three() {
        let mut strategy = Momentum::default();
        strategy.observe("BTC/USD", &snapshot(50.0, 0.0, 0.0, 1000.0));

        // RSI falling, but MACD bullish and volume high.
        let candles = [candle(dec!(1500))];
        let snap = snapshot(45.0, 1.0, 0.5, 1000.0);
        assert!(strategy.should_open(&view(&snap, &candles)));
    }

    #[test]
    fn one_vote_is_not_enough() {
        let mut strategy = Momentum::default();
        strategy.observe("BTC/USD", &snapshot(50.0, 0.0, 0.0, 1000.0));

        // Only volume is high.
        let candles = [candle(dec!(1500))];
        let snap = snapshot(45.0, 0.5, 1.0, 1000.0);
        assert!(!strategy.should_open(&view(&snap, &candles)));
    }

    #[test]
    fn undefined_inputs_vote_false() {
        let strategy = Momentum::default();
        // No previous snapshot (RSI vote false) and no MACD values:
        // volume alone cannot reach two votes.
        let candles = [candle(dec!(1500))];
        let snap = IndicatorSnapshot {
            volume_ma: Some(dec!(1000)),
            ..IndicatorSnapshot::default()
        };
        assert!(!strategy.should_open(&view(&snap, &candles)));
    }

    #[test]
    fn closes_on_two_bearish_votes() {
        let mut strategy = Momentum::default();
        strategy.observe("BTC/USD", &snapshot(60.0, 1.0, 0.5, 1000.0));

        // RSI falling and MACD bearish; volume still above average.
        let candles = [candle(dec!(1500))];
        let snap = snapshot(50.0, 0.3, 0.8, 1000.0);
        assert_eq!(
            strategy.should_close(&view(&snap, &candles), &position()),
            Some(ExitReason::Strategy)
        );
    }

    #[test]
    fn holds_on_single_bearish_vote() {
        let mut strategy = Momentum::default();
        strategy.observe("BTC/USD", &snapshot(60.0, 1.0, 0.5, 1000.0));

        // Only RSI falls.
        let candles = [candle(dec!(1500))];
        let snap = snapshot(55.0, 1.0, 0.5, 1000.0);
        assert_eq!(strategy.should_close(&view(&snap, &candles), &position()), None);
    }

    #[test]
    fn flat_inputs_vote_neither_way() {
        let mut strategy = Momentum::default();
        strategy.observe("BTC/USD", &snapshot(50.0, 1.0, 1.0, 1000.0));

        // Everything exactly equal: strict comparisons give zero votes.
        let candles = [candle(dec!(1000))];
        let snap = snapshot(50.0, 1.0, 1.0, 1000.0);
        assert!(!strategy.should_open(&view(&snap, &candles)));
        assert_eq!(strategy.should_close(&view(&snap, &candles), &position()), None);
    }

    #[test]
    #[should_panic(expected = "required_votes must be between 1 and 3")]
    fn rejects_invalid_vote_threshold() {
        Momentum::new(MomentumConfig {
            required_votes: 4,
            ..MomentumConfig::default()
        });
    }
}
