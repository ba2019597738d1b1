//! Domain types: candles, timeframes, positions, trades, equity points.

pub mod candle;
pub mod equity;
pub mod position;
pub mod timeframe;
pub mod trade;

pub use candle::Candle;
pub use equity::EquityPoint;
pub use position::{Position, PositionSide};
pub use timeframe::Timeframe;
pub use trade::{ExitReason, Trade, TradeKind};
