use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::{
    data::domain::{Price, Symbol},
    error::FetchError,
    provider::PriceFeed,
};

/// An explicitly owned quote cache: `symbol -> (price, fetched_at)` with a
/// fixed time-to-live.
///
/// Injected into whatever resolves prices, never a process-wide global. The
/// expiry check is explicit: an entry older than the TTL is treated as
/// absent.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    ttl: Duration,
    entries: HashMap<Symbol, (Price, DateTime<Utc>)>,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The cached price for `symbol`, if present and fresh.
    pub fn get(&self, symbol: &Symbol) -> Option<Price> {
        self.get_at(symbol, Utc::now())
    }

    /// Expiry check against an explicit clock, for deterministic tests.
    pub fn get_at(&self, symbol: &Symbol, now: DateTime<Utc>) -> Option<Price> {
        let (price, fetched_at) = self.entries.get(symbol)?;
        if now - *fetched_at <= self.ttl {
            Some(*price)
        } else {
            None
        }
    }

    pub fn insert(&mut self, symbol: Symbol, price: Price) {
        self.insert_at(symbol, price, Utc::now());
    }

    pub fn insert_at(&mut self, symbol: Symbol, price: Price, fetched_at: DateTime<Utc>) {
        self.entries.insert(symbol, (price, fetched_at));
    }

    /// Drops every expired entry.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (_, fetched_at)| now - *fetched_at <= ttl);
    }
}

/// A feed wrapper that consults the injected cache before delegating to the
/// inner feed, and records every successful fetch.
#[derive(Debug, Clone)]
pub struct CachedFeed<F> {
    inner: F,
    cache: QuoteCache,
}

impl<F> CachedFeed<F> {
    pub fn new(inner: F, cache: QuoteCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }
}

impl<F: PriceFeed> PriceFeed for CachedFeed<F> {
    fn latest(&mut self, symbol: &Symbol) -> Result<Price, FetchError> {
        if let Some(price) = self.cache.get(symbol) {
            debug!(%symbol, "Quote served from cache");
            return Ok(price);
        }

        let price = self.inner.latest(symbol)?;
        self.cache.insert(symbol.clone(), price);
        Ok(price)
    }
}
