use tracing::warn;

use crate::{
    data::{
        domain::{Price, Symbol},
        table::PriceTable,
    },
    error::{FetchError, RefolioResult},
};

pub mod cache;

/// A source of latest close quotes, one symbol at a time.
///
/// Fetch failures are typed and never swallowed inside the feed. The sentinel
/// substitution policy belongs to the consumer: see [`snapshot_table`].
pub trait PriceFeed {
    fn latest(&mut self, symbol: &Symbol) -> Result<Price, FetchError>;
}

/// An in-memory feed over fixed quotes. Useful for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    quotes: Vec<(Symbol, Price)>,
}

impl StaticFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, symbol: Symbol, price: Price) -> Self {
        self.quotes.push((symbol, price));
        self
    }
}

impl PriceFeed for StaticFeed {
    fn latest(&mut self, symbol: &Symbol) -> Result<Price, FetchError> {
        self.quotes
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, p)| *p)
            .ok_or_else(|| FetchError::Unavailable(symbol.to_string()))
    }
}

/// Result of assembling a live snapshot table.
#[derive(Debug)]
pub struct Snapshot {
    pub table: PriceTable,
    /// Symbols whose fetch failed or returned an unusable quote; their price
    /// was substituted with the floor sentinel.
    pub substituted: usize,
}

/// Builds a single-step [`PriceTable`] from live quotes, for the one-shot
/// recommendation flow.
///
/// The substitution policy is applied here, by the caller of the feed: a
/// failed fetch or a non-finite/non-positive quote becomes `floor`, with a
/// warning, since a live data gap must not abort a recommendation. Requesting
/// an empty symbol list fails at table construction.
#[tracing::instrument(skip(feed, symbols), fields(assets = symbols.len()))]
pub fn snapshot_table<F: PriceFeed>(
    feed: &mut F,
    symbols: &[Symbol],
    floor: f64,
) -> RefolioResult<Snapshot> {
    let mut substituted = 0;
    let mut builder = PriceTable::builder();

    for symbol in symbols {
        let close = match feed.latest(symbol) {
            Ok(Price(p)) if p.is_finite() && p > 0.0 => p,
            Ok(Price(p)) => {
                warn!(%symbol, price = p, "Unusable live quote, substituting floor");
                substituted += 1;
                floor
            }
            Err(e) => {
                warn!(%symbol, error = %e, "Quote fetch failed, substituting floor");
                substituted += 1;
                floor
            }
        };
        builder = builder.with_series(symbol.clone(), vec![close]);
    }

    Ok(Snapshot {
        table: builder.build()?,
        substituted,
    })
}
