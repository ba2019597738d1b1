//! Performance metrics — pure statistics over a finished run.
//!
//! This is the output boundary: engine results arrive as `Decimal` and
//! leave as `f64` report figures. Nothing here feeds back into simulation.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use marketsim_core::domain::Timeframe;
use marketsim_core::engine::RunResult;

/// Aggregate statistics for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub total_return_pct: f64,
    pub total_pnl: f64,
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub sharpe: f64,
    pub max_drawdown_pct: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from a run. The timeframe annualizes Sharpe.
    pub fn compute(result: &RunResult, timeframe: Timeframe) -> Self {
        let initial = decimal_f64(result.initial_balance);
        let final_balance = decimal_f64(result.final_balance);
        let equity: Vec<f64> = result
            .equity_curve
            .iter()
            .map(|p| decimal_f64(p.equity))
            .collect();

        let closing: Vec<f64> = result
            .trades
            .iter()
            .filter_map(|t| t.profit)
            .map(decimal_f64)
            .collect();
        let winning = closing.iter().filter(|&&p| p > 0.0).count();
        let losing = closing.iter().filter(|&&p| p < 0.0).count();

        Self {
            initial_balance: initial,
            final_balance,
            total_return_pct: total_return_pct(initial, final_balance),
            total_pnl: final_balance - initial,
            trade_count: result.trades.len(),
            winning_trades: winning,
            losing_trades: losing,
            win_rate: win_rate(winning, closing.len()),
            sharpe: sharpe_ratio(&equity, timeframe),
            max_drawdown_pct: max_drawdown_pct(&equity),
        }
    }
}

fn decimal_f64(d: rust_decimal::Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// (final - initial) / initial, as a percentage. Zero for degenerate input.
pub fn total_return_pct(initial: f64, final_balance: f64) -> f64 {
    if initial <= 0.0 {
        return 0.0;
    }
    (final_balance - initial) / initial * 100.0
}

/// Winning closes over all closes. Zero when no position was ever closed.
pub fn win_rate(winning: usize, closed: usize) -> f64 {
    if closed == 0 {
        return 0.0;
    }
    winning as f64 / closed as f64
}

/// Annualized Sharpe ratio over per-step equity returns.
///
/// Sharpe = mean(returns) / std(returns) * sqrt(periods per year), with a
/// zero risk-free rate. Zero when variance is zero or the curve is shorter
/// than two points.
pub fn sharpe_ratio(equity: &[f64], timeframe: Timeframe) -> f64 {
    let returns: Vec<f64> = equity
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    let std = variance.sqrt();
    if std < 1e-15 {
        return 0.0;
    }
    mean / std * timeframe.periods_per_year().sqrt()
}

/// Largest peak-to-trough equity decline, as a percentage of the peak.
pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0f64;
    for &point in equity {
        if point > peak {
            peak = point;
        }
        if peak > 0.0 {
            let dd = (peak - point) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
