//! Error types for the market data crate.
//!
//! This module provides:
//! - [`FetchError`]: The single failure kind returned by quote providers
//! - [`SnapshotError`]: Failures while loading the fallback snapshot file
//! - [`MarketDataError`]: Configuration-time errors (tickers, provider setup)
//!
//! Only [`MarketDataError`] ever reaches the caller of this crate. Fetch and
//! snapshot failures are absorbed by the fetcher and the snapshot cache.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A quote provider could not produce a price for a symbol.
///
/// Network failures, empty provider responses, malformed price fields and
/// timeouts all collapse into this one kind. The `message` is kept for
/// logging only; callers never branch on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Fetch failed: {provider} {symbol} - {message}")]
pub struct FetchError {
    /// The provider that failed
    pub provider: String,
    /// The symbol that was requested
    pub symbol: String,
    /// Human-readable failure description
    pub message: String,
}

impl FetchError {
    pub fn new(provider: &str, symbol: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            symbol: symbol.to_string(),
            message: message.into(),
        }
    }

    pub fn timeout(provider: &str, symbol: &str, budget: Duration) -> Self {
        Self::new(
            provider,
            symbol,
            format!("request exceeded {}ms", budget.as_millis()),
        )
    }

    pub fn no_data(provider: &str, symbol: &str) -> Self {
        Self::new(provider, symbol, "no data returned for symbol")
    }
}

/// Errors raised while loading a fallback snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot contents are not valid JSON.
    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// The snapshot is valid JSON but not a symbol -> price object.
    #[error("Snapshot must be a JSON object mapping symbols to prices")]
    NotAnObject,
}

/// Errors that can occur while configuring market data retrieval.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A ticker entry has an empty symbol or label.
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// A configuration source (env var, ticker file) is malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured provider name is not recognised.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// A provider could not be constructed.
    #[error("Provider error: {provider} - {message}")]
    ProviderInit {
        /// The provider that failed to initialise
        provider: String,
        /// The underlying error message
        message: String,
    },
}
