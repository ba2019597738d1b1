//! marketsim CLI — run and compare strategy backtests.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config, over CSV or
//!   synthetic candles, and print a summary (optionally save JSON)
//! - `compare` — run every baseline strategy over the same data and
//!   print a ranked table

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use marketsim_core::data::{CsvProvider, MarketDataProvider, SyntheticProvider};
use marketsim_core::domain::Timeframe;
use marketsim_core::engine::EngineConfig;
use marketsim_runner::config::normalize_fraction;
use marketsim_runner::{compare_strategies, run_backtest, BacktestConfig, BacktestResult};

#[derive(Parser)]
#[command(name = "marketsim", about = "marketsim — strategy backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// CSV candle file (timestamp,open,high,low,close,volume).
        #[arg(long)]
        data: Option<PathBuf>,

        /// Use seeded synthetic candles instead of a CSV file.
        #[arg(long)]
        seed: Option<u64>,

        /// Write the full result as JSON to this path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run all baseline strategies over the same data and rank them.
    Compare {
        /// Symbol label for the run.
        #[arg(long, default_value = "BTC/USD")]
        symbol: String,

        /// Candle timeframe: 1m, 5m, 15m, 30m, 1h, 4h, 1d.
        #[arg(long, default_value = "1h")]
        timeframe: Timeframe,

        /// Number of candles to simulate.
        #[arg(long, default_value_t = 1000)]
        candles: usize,

        /// Starting balance.
        #[arg(long, default_value = "10000")]
        balance: Decimal,

        /// Percent of cash per entry (whole percents accepted).
        #[arg(long, default_value = "25")]
        size_percent: Decimal,

        /// CSV candle file; synthetic data when omitted.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Seed for synthetic candles.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            seed,
            output,
        } => cmd_run(config, data, seed, output),
        Commands::Compare {
            symbol,
            timeframe,
            candles,
            balance,
            size_percent,
            data,
            seed,
        } => cmd_compare(symbol, timeframe, candles, balance, size_percent, data, seed),
    }
}

fn cmd_run(
    config_path: PathBuf,
    data: Option<PathBuf>,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    if data.is_some() && seed.is_some() {
        bail!("--data and --seed are mutually exclusive");
    }

    let config = BacktestConfig::from_path(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let provider: Box<dyn MarketDataProvider> = match (&data, seed) {
        (Some(path), _) => Box::new(CsvProvider::new(path)),
        (None, seed) => Box::new(SyntheticProvider::new(seed.unwrap_or(42))),
    };

    let observer = Box::new(|processed: usize, total: usize| {
        eprintln!("processed {processed}/{total} candles");
    });

    let result = run_backtest(&config, provider.as_ref(), Some(observer))?;
    print_summary(&result);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Result saved to: {}", path.display());
    }

    Ok(())
}

fn cmd_compare(
    symbol: String,
    timeframe: Timeframe,
    candles: usize,
    balance: Decimal,
    size_percent: Decimal,
    data: Option<PathBuf>,
    seed: u64,
) -> Result<()> {
    if balance <= dec!(0) {
        bail!("--balance must be positive");
    }

    let provider: Box<dyn MarketDataProvider> = match &data {
        Some(path) => Box::new(CsvProvider::new(path)),
        None => Box::new(SyntheticProvider::new(seed)),
    };
    let series = provider.fetch(&symbol, timeframe, candles)?;

    let engine_config = EngineConfig::new(balance, normalize_fraction(size_percent));
    let results = compare_strategies(&symbol, &series, timeframe, &engine_config);

    println!();
    println!("=== Strategy Comparison ({symbol}, {} candles) ===", series.len());
    println!(
        "{:<18} {:>10} {:>8} {:>9} {:>8} {:>10}",
        "Strategy", "Return %", "Trades", "Win Rate", "Sharpe", "Max DD %"
    );
    println!("{}", "-".repeat(68));
    for entry in &results {
        println!(
            "{:<18} {:>10.2} {:>8} {:>8.1}% {:>8.3} {:>10.2}",
            entry.strategy,
            entry.metrics.total_return_pct,
            entry.metrics.trade_count,
            entry.metrics.win_rate * 100.0,
            entry.metrics.sharpe,
            entry.metrics.max_drawdown_pct,
        );
    }
    println!();

    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    println!();
    println!("=== Backtest Result ===");
    println!("Strategy:       {}", result.strategy);
    println!("Symbol:         {}", result.run.symbol);
    println!("Candles:        {}", result.run.candle_count);
    if let (Some(first), Some(last)) = (
        result.run.equity_curve.first(),
        result.run.equity_curve.last(),
    ) {
        let fmt = |ms: i64| {
            chrono::DateTime::from_timestamp_millis(ms)
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| ms.to_string())
        };
        println!("Period:         {} to {}", fmt(first.timestamp), fmt(last.timestamp));
    }
    println!("Rejected:       {} signal(s)", result.run.rejected_signals.len());
    println!();
    println!("--- Performance ---");
    println!("Initial:        {:.2}", m.initial_balance);
    println!("Final:          {:.2}", m.final_balance);
    println!("Total Return:   {:.2}%", m.total_return_pct);
    println!("Total P&L:      {:.2}", m.total_pnl);
    println!(
        "Trades:         {} ({} wins / {} losses)",
        m.trade_count, m.winning_trades, m.losing_trades
    );
    println!("Win Rate:       {:.1}%", m.win_rate * 100.0);
    println!("Sharpe:         {:.3}", m.sharpe);
    println!("Max Drawdown:   {:.2}%", m.max_drawdown_pct);
    println!();
    println!("Fingerprint:    config {}", &result.fingerprint.config[..16]);
    println!("                data   {}", &result.fingerprint.data[..16]);
    println!();
}
