//! Replays two baseline policies over a synthetic price table and prints a
//! small comparison report.
//!
//! ```sh
//! RUST_LOG=info cargo run --example backtest
//! ```

use std::time::Instant;

use anyhow::Result;
use refolio::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let table = synthetic_table();
    let initial_cash = 100_000.0;
    let cfg = EnvConfig::default().with_initial_cash(initial_cash);

    println!("Assets: {}", table.asset_count());
    println!("Steps:  {}", table.step_count());
    println!();

    for policy in [
        Box::new(EqualWeight) as Box<dyn Policy>,
        Box::new(Random::new(42)),
    ] {
        let mut policy = policy;
        let name = policy.identifier().to_string();
        let mut env = Environment::new(table.clone(), cfg.clone())?;

        let start = Instant::now();
        let replay = env.backtest(&mut policy)?;
        let elapsed = start.elapsed();

        let final_value = initial_cash + replay.total_reward.0;
        println!("--- {name} ---");
        println!("Total reward:   {:>12.2}", replay.total_reward.0);
        println!("Final value:    {:>12.2}", final_value);
        println!("Steps replayed: {:>12}", replay.rewards.len());
        println!("Wall time:      {elapsed:>12.2?}");
        println!("Diagnostics:    {:?}", env.diagnostics());
        println!();
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// A deterministic three-asset table: trend, mean-reverting chop, and a
/// series with a corrupt patch to exercise the sanitation path.
fn synthetic_table() -> PriceTable {
    let steps = 250;

    let trend = (0..steps)
        .map(|t| 100.0 * (1.0 + 0.002 * t as f64))
        .collect();

    let chop = (0..steps)
        .map(|t| 50.0 + 4.0 * (t as f64 * 0.7).sin())
        .collect();

    let mut patchy: Vec<f64> = (0..steps)
        .map(|t| 20.0 * (1.0 + 0.001 * t as f64))
        .collect();
    patchy[60] = f64::NAN;
    patchy[61] = 0.0;

    PriceTable::builder()
        .with_series(Symbol::new("TREND"), trend)
        .with_series(Symbol::new("CHOP"), chop)
        .with_series(Symbol::new("PATCHY"), patchy)
        .build()
        .expect("synthetic table is well-formed")
}
