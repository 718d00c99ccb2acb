//! Fallback-aware quote retrieval.
//!
//! The fetcher runs one retrieval cycle over the configured tickers:
//! 1. Fetch the live price from the provider, bounded by the policy timeout
//! 2. On success, emit a `LIVE` quote
//! 3. On any failure, look the symbol up in the fallback snapshot
//! 4. Emit `FALLBACK` if the snapshot has it, `UNAVAILABLE` otherwise
//!
//! Tickers are independent: a failure, timeout or panic while fetching one
//! ticker never affects another. There are no retries within a cycle.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::{stream, FutureExt, StreamExt};
use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::config::FetchPolicy;
use crate::errors::FetchError;
use crate::models::{Quote, QuoteSet, QuoteSource, TickerSpec};
use crate::provider::QuoteProvider;
use crate::snapshot::SnapshotCache;

/// Retrieves quotes from one provider, substituting snapshot values on failure.
pub struct FallbackFetcher {
    provider: Arc<dyn QuoteProvider>,
    snapshot: Arc<SnapshotCache>,
    policy: FetchPolicy,
}

impl FallbackFetcher {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        snapshot: Arc<SnapshotCache>,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            provider,
            snapshot,
            policy,
        }
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    pub fn snapshot(&self) -> &SnapshotCache {
        &self.snapshot
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Run one retrieval cycle.
    ///
    /// The returned set has exactly one quote per ticker, in the order given.
    /// Fetches run concurrently up to `max_concurrency`.
    pub async fn retrieve_all(&self, tickers: &[TickerSpec]) -> QuoteSet {
        let quotes: Vec<Quote> = stream::iter(tickers.iter())
            .map(|ticker| self.retrieve_one(ticker))
            .buffered(self.policy.max_concurrency.max(1))
            .collect()
            .await;

        let set = QuoteSet::new(quotes);
        info!(
            "Retrieved {} quotes from '{}': {} live, {} fallback, {} unavailable",
            set.len(),
            self.provider.id(),
            set.count(QuoteSource::Live),
            set.count(QuoteSource::Fallback),
            set.count(QuoteSource::Unavailable)
        );
        set
    }

    /// Retrieve a single ticker.
    pub async fn retrieve_one(&self, ticker: &TickerSpec) -> Quote {
        match self.fetch_live(&ticker.symbol).await {
            Ok(price) => {
                debug!("Live quote for '{}': {}", ticker.symbol, price);
                Quote::live(&ticker.symbol, &ticker.label, price)
            }
            Err(e) => {
                warn!("Live fetch failed for '{}': {}", ticker.label, e);
                self.fallback(ticker)
            }
        }
    }

    async fn fetch_live(&self, symbol: &str) -> Result<Decimal, FetchError> {
        let provider_id = self.provider.id();
        let call = AssertUnwindSafe(self.provider.fetch(symbol)).catch_unwind();

        match tokio::time::timeout(self.policy.timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(FetchError::new(provider_id, symbol, "provider panicked")),
            Err(_) => Err(FetchError::timeout(provider_id, symbol, self.policy.timeout)),
        }
    }

    fn fallback(&self, ticker: &TickerSpec) -> Quote {
        match self.snapshot.lookup(&ticker.symbol) {
            Some(price) => {
                info!("Using snapshot price {} for '{}'", price, ticker.symbol);
                Quote::fallback(&ticker.symbol, &ticker.label, price)
            }
            None => {
                warn!("No snapshot price for '{}', marking unavailable", ticker.symbol);
                Quote::unavailable(&ticker.symbol, &ticker.label)
            }
        }
    }
}
