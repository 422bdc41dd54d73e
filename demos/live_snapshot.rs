//! One-shot recommendation over a live single-snapshot price table, with a
//! TTL quote cache in front of the feed.
//!
//! ```sh
//! RUST_LOG=info cargo run --example live_snapshot
//! ```

use anyhow::Result;
use chrono::Duration;
use refolio::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Stand-in for a live quote source; one symbol is deliberately missing so
    // the sentinel substitution path is visible in the logs.
    let feed = StaticFeed::new()
        .with_quote(Symbol::new("BHARTIARTL"), Price(1_542.3))
        .with_quote(Symbol::new("TATASTEEL"), Price(151.8))
        .with_quote(Symbol::new("RELIANCE"), Price(2_954.6));
    let mut feed = CachedFeed::new(feed, QuoteCache::new(Duration::minutes(5)));

    let symbols = vec![
        Symbol::new("BHARTIARTL"),
        Symbol::new("TATASTEEL"),
        Symbol::new("RELIANCE"),
        Symbol::new("INFY"),
    ];

    let snapshot = snapshot_table(&mut feed, &symbols, 1e-6)?;
    println!(
        "Snapshot: {} assets, {} substituted, {} quotes cached",
        snapshot.table.asset_count(),
        snapshot.substituted,
        feed.cache().len(),
    );

    let mut env = Environment::new(snapshot.table, EnvConfig::default())?;
    let rec = env.recommend(&mut EqualWeight)?;

    println!("Recommended target weights:");
    for (symbol, weight) in rec.weights() {
        println!("  {symbol}: {weight:.4}");
    }

    Ok(())
}
