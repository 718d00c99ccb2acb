//! Quoteboard Market Data Crate
//!
//! This crate retrieves the handful of market quotes shown on the homepage
//! (Nikkei 225, USD/JPY, JGB futures) and guarantees that every configured
//! ticker yields a displayable value.
//!
//! # Overview
//!
//! - A [`QuoteProvider`] fetches the live price for one symbol or fails with
//!   a single [`FetchError`] kind
//! - The [`FallbackFetcher`] runs one retrieval cycle over the configured
//!   tickers and substitutes the last-known price from a
//!   [`FallbackSnapshot`] when a live fetch fails
//! - The result is a [`QuoteSet`]: one [`Quote`] per ticker, in
//!   configuration order, each marked `LIVE`, `FALLBACK` or `UNAVAILABLE`
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  TickerSpec list | --> | FallbackFetcher  |  (timeout + fallback policy)
//! +------------------+     +------------------+
//!                             |            |
//!                             v            v
//!                  +---------------+  +----------------+
//!                  | QuoteProvider |  | SnapshotCache  |  (lazy, read-only)
//!                  +---------------+  +----------------+
//!                             |
//!                             v
//!                     +------------------+
//!                     |     QuoteSet     |  (handed to the page renderer)
//!                     +------------------+
//! ```
//!
//! # Example
//!
//! ```ignore
//! use quoteboard_market_data::MarketDataConfig;
//!
//! let config = MarketDataConfig::from_env()?;
//! let fetcher = config.build_fetcher()?;
//! let quotes = fetcher.retrieve_all(&config.tickers()?).await;
//! for quote in &quotes {
//!     println!("{}: {}", quote.label, quote.display_value());
//! }
//! ```

pub mod config;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod provider;
pub mod snapshot;

pub use config::{FetchPolicy, MarketDataConfig};
pub use errors::{FetchError, MarketDataError, SnapshotError};
pub use fetcher::FallbackFetcher;
pub use models::{
    default_tickers, parse_tickers_json, Quote, QuoteSet, QuoteSource, TickerSpec, PLACEHOLDER,
};
pub use provider::{
    build_provider, AlphaVantageProvider, FredProvider, ProviderKeys, ProviderKind,
    QuoteProvider, YahooProvider,
};
pub use snapshot::{FallbackSnapshot, SnapshotCache, SnapshotState};
