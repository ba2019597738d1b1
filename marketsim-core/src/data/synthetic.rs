//! Seeded synthetic candles — a geometric random walk for demos and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use super::{DataError, MarketDataProvider};
use crate::domain::{Candle, Timeframe};

/// Generates a reproducible random-walk candle series. The same seed,
/// symbol, timeframe, and limit always yield byte-identical candles.
pub struct SyntheticProvider {
    seed: u64,
    start_price: Decimal,
    /// Max per-candle move as a fraction of price.
    volatility: f64,
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            start_price: Decimal::ONE_HUNDRED,
            volatility: 0.02,
        }
    }

    pub fn with_start_price(mut self, price: Decimal) -> Self {
        assert!(price > Decimal::ZERO, "start price must be positive");
        self.start_price = price;
        self
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DataError> {
        if limit == 0 {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        // Independent seeds per symbol so multi-symbol runs differ.
        let mut hasher_seed = self.seed;
        for b in symbol.bytes() {
            hasher_seed = hasher_seed.wrapping_mul(31).wrapping_add(b as u64);
        }
        let mut rng = StdRng::seed_from_u64(hasher_seed);

        let start_ts = 1_700_000_000_000i64;
        let step = timeframe.millis();
        let mut close = self.start_price;
        let mut candles = Vec::with_capacity(limit);

        for i in 0..limit {
            let open = close;
            let drift: f64 = rng.gen_range(-self.volatility..self.volatility);
            // Price moves are quantized to 4 decimal places so the series
            // survives serialization round-trips exactly.
            let factor = Decimal::try_from(1.0 + drift)
                .unwrap_or(Decimal::ONE)
                .round_dp(6);
            close = (open * factor).round_dp(4).max(Decimal::new(1, 4));

            let spread: f64 = rng.gen_range(0.0..self.volatility / 2.0);
            let wick = (open.max(close)
                * Decimal::try_from(spread).unwrap_or(Decimal::ZERO).round_dp(6))
            .round_dp(4);
            let volume = Decimal::from(rng.gen_range(100u32..10_000));

            candles.push(Candle {
                timestamp: start_ts + i as i64 * step,
                open,
                high: open.max(close) + wick,
                low: (open.min(close) - wick).max(Decimal::new(1, 4)),
                close,
                volume,
            });
        }
        Ok(candles)
    }
}
