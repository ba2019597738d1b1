//! Risk management — per-position stop-loss state.
//!
//! Two stop kinds live here: a fixed stop frozen at entry and a trailing
//! stop that ratchets with the favorable price extreme. The engine owns
//! their lifecycle (create on open, drop on close) and evaluates trailing
//! before fixed when both are armed.

pub mod fixed_stop;
pub mod trailing_stop;

pub use fixed_stop::FixedStop;
pub use trailing_stop::TrailingStop;
