//! TOML run configuration and the strategy factory.
//!
//! Percent fields are forgiving: `3.0` and `0.03` both mean 3%. The
//! conversion to a fraction happens here, once, at the boundary; the
//! engine only ever sees fractions.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use marketsim_core::domain::Timeframe;
use marketsim_core::engine::EngineConfig;
use marketsim_core::strategy::{
    MeanReversion, MeanReversionConfig, Momentum, MomentumConfig, Strategy, TrendFollowing,
    TrendFollowingConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown strategy type '{0}' (expected trend_following, mean_reversion, or momentum)")]
    UnknownStrategy(String),
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestSection {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub candles: usize,
    pub initial_balance: Decimal,
    /// Fraction of cash per entry; whole-number percents are accepted.
    pub position_size_percent: Decimal,
    pub stop_loss_percent: Option<Decimal>,
    pub trailing_stop_percent: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategySection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategySection,
}

/// Interpret a user-supplied percentage: values above 1 are whole
/// percents (3.0 → 0.03), values at or below 1 are already fractions.
pub fn normalize_fraction(value: Decimal) -> Decimal {
    if value > Decimal::ONE {
        value / Decimal::ONE_HUNDRED
    } else {
        value
    }
}

impl BacktestConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.initial_balance <= Decimal::ZERO {
            return Err(ConfigError::Invalid(
                "initial_balance must be positive".into(),
            ));
        }
        if self.backtest.position_size_percent <= Decimal::ZERO
            || self.backtest.position_size_percent > Decimal::ONE_HUNDRED
        {
            return Err(ConfigError::Invalid(
                "position_size_percent must be in (0, 100]".into(),
            ));
        }
        if self.backtest.candles == 0 {
            return Err(ConfigError::Invalid("candles must be positive".into()));
        }
        for (name, pct) in [
            ("stop_loss_percent", self.backtest.stop_loss_percent),
            ("trailing_stop_percent", self.backtest.trailing_stop_percent),
        ] {
            if let Some(pct) = pct {
                if pct <= Decimal::ZERO {
                    return Err(ConfigError::Invalid(format!("{name} must be positive")));
                }
            }
        }
        Ok(())
    }

    /// Engine parameters with all percents normalized to fractions.
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::new(
            self.backtest.initial_balance,
            normalize_fraction(self.backtest.position_size_percent),
        );
        if let Some(pct) = self.backtest.stop_loss_percent {
            config = config.with_stop_loss(normalize_fraction(pct));
        }
        if let Some(pct) = self.backtest.trailing_stop_percent {
            config = config.with_trailing_stop(normalize_fraction(pct));
        }
        config
    }

    pub fn build_strategy(&self) -> Result<Box<dyn Strategy>, ConfigError> {
        build_strategy(&self.strategy)
    }
}

/// The thin factory: maps the three config-level strategy names onto
/// their typed constructors. Cross-parameter preconditions are checked
/// here so bad user input surfaces as `ConfigError`, never as a panic
/// out of a constructor assert.
pub fn build_strategy(section: &StrategySection) -> Result<Box<dyn Strategy>, ConfigError> {
    let p = Params(&section.params);
    match section.kind.as_str() {
        "trend_following" => {
            let defaults = TrendFollowingConfig::default();
            let config = TrendFollowingConfig {
                short_ma_period: p.usize("short_ma_period", defaults.short_ma_period)?,
                long_ma_period: p.usize("long_ma_period", defaults.long_ma_period)?,
                rsi_period: p.usize("rsi_period", defaults.rsi_period)?,
                rsi_overbought: p.decimal("rsi_overbought", defaults.rsi_overbought)?,
            };
            ensure_param(
                config.long_ma_period > config.short_ma_period,
                "long_ma_period",
                format!("must be greater than short_ma_period ({})", config.short_ma_period),
            )?;
            Ok(Box::new(TrendFollowing::new(config)))
        }
        "mean_reversion" => {
            let defaults = MeanReversionConfig::default();
            let config = MeanReversionConfig {
                rsi_period: p.usize("rsi_period", defaults.rsi_period)?,
                rsi_oversold: p.decimal("rsi_oversold", defaults.rsi_oversold)?,
                rsi_overbought: p.decimal("rsi_overbought", defaults.rsi_overbought)?,
                bb_period: p.usize("bb_period", defaults.bb_period)?,
                bb_k: p.decimal("bb_k", defaults.bb_k)?,
                long_ma_period: p.usize("long_ma_period", defaults.long_ma_period)?,
                range_threshold: p.decimal("range_threshold", defaults.range_threshold)?,
            };
            ensure_param(
                config.rsi_oversold < config.rsi_overbought,
                "rsi_oversold",
                format!("must be below rsi_overbought ({})", config.rsi_overbought),
            )?;
            ensure_param(
                config.bb_period >= 2,
                "bb_period",
                "must be at least 2".to_string(),
            )?;
            ensure_param(
                config.range_threshold > Decimal::ZERO,
                "range_threshold",
                "must be positive".to_string(),
            )?;
            Ok(Box::new(MeanReversion::new(config)))
        }
        "momentum" => {
            let defaults = MomentumConfig::default();
            let config = MomentumConfig {
                rsi_period: p.usize("rsi_period", defaults.rsi_period)?,
                macd_fast: p.usize("macd_fast", defaults.macd_fast)?,
                macd_slow: p.usize("macd_slow", defaults.macd_slow)?,
                macd_signal: p.usize("macd_signal", defaults.macd_signal)?,
                volume_ma_period: p.usize("volume_ma_period", defaults.volume_ma_period)?,
                required_votes: p.usize("required_votes", defaults.required_votes)?,
            };
            ensure_param(
                config.macd_slow > config.macd_fast,
                "macd_slow",
                format!("must be greater than macd_fast ({})", config.macd_fast),
            )?;
            ensure_param(
                (1..=3).contains(&config.required_votes),
                "required_votes",
                "must be between 1 and 3".to_string(),
            )?;
            Ok(Box::new(Momentum::new(config)))
        }
        other => Err(ConfigError::UnknownStrategy(other.to_string())),
    }
}

fn ensure_param(condition: bool, name: &str, reason: String) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::InvalidParam {
            name: name.to_string(),
            reason,
        })
    }
}

struct Params<'a>(&'a HashMap<String, toml::Value>);

impl Params<'_> {
    fn usize(&self, name: &str, default: usize) -> Result<usize, ConfigError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(toml::Value::Integer(n)) if *n > 0 => Ok(*n as usize),
            Some(other) => Err(ConfigError::InvalidParam {
                name: name.to_string(),
                reason: format!("expected a positive integer, got {other}"),
            }),
        }
    }

    fn decimal(&self, name: &str, default: Decimal) -> Result<Decimal, ConfigError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(toml::Value::Integer(n)) => Ok(Decimal::from(*n)),
            Some(toml::Value::Float(f)) => {
                Decimal::try_from(*f).map_err(|e| ConfigError::InvalidParam {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
            }
            Some(other) => Err(ConfigError::InvalidParam {
                name: name.to_string(),
                reason: format!("expected a number, got {other}"),
            }),
        }
    }
}
