//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all quote source adapters implement
//! - Concrete providers (Yahoo, FRED, Alpha Vantage)
//! - `ProviderKind` and `build_provider` for configuration-driven selection
//!
//! Exactly one provider serves a fetcher. There is no failover between
//! providers; a failed fetch goes straight to the fallback snapshot.

mod traits;

pub mod alpha_vantage;
pub mod fred;
pub mod yahoo;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use num_traits::FromPrimitive;
use rust_decimal::Decimal;

use crate::errors::{FetchError, MarketDataError};

pub use alpha_vantage::AlphaVantageProvider;
pub use fred::FredProvider;
pub use traits::QuoteProvider;
pub use yahoo::YahooProvider;

/// Supported quote providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Fred,
    AlphaVantage,
}

impl ProviderKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Fred => "fred",
            Self::AlphaVantage => "alpha_vantage",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "fred" => Ok(Self::Fred),
            "alpha_vantage" | "alphavantage" => Ok(Self::AlphaVantage),
            _ => Err(MarketDataError::UnknownProvider(s.to_string())),
        }
    }
}

/// API keys for providers that accept one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderKeys {
    pub fred: Option<String>,
    pub alpha_vantage: Option<String>,
}

/// Build the provider for `kind`, bounding each of its calls by `timeout`.
pub fn build_provider(
    kind: ProviderKind,
    keys: &ProviderKeys,
    timeout: Duration,
) -> Result<Arc<dyn QuoteProvider>, MarketDataError> {
    let provider: Arc<dyn QuoteProvider> = match kind {
        ProviderKind::Yahoo => Arc::new(YahooProvider::new(timeout)?),
        ProviderKind::Fred => Arc::new(FredProvider::new(keys.fred.clone(), timeout)),
        ProviderKind::AlphaVantage => Arc::new(AlphaVantageProvider::new(
            keys.alpha_vantage.clone(),
            timeout,
        )),
    };
    Ok(provider)
}

/// Convert a float price from a provider into a `Decimal`.
pub(crate) fn price_from_f64(provider: &str, symbol: &str, raw: f64) -> Result<Decimal, FetchError> {
    if !raw.is_finite() {
        return Err(FetchError::new(
            provider,
            symbol,
            format!("non-finite price {}", raw),
        ));
    }
    Decimal::from_f64(raw).ok_or_else(|| {
        FetchError::new(
            provider,
            symbol,
            format!("Failed to convert price {} to Decimal", raw),
        )
    })
}

/// Parse a textual price from a provider into a `Decimal`.
pub(crate) fn price_from_str(provider: &str, symbol: &str, raw: &str) -> Result<Decimal, FetchError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| FetchError::new(provider, symbol, format!("malformed price '{}'", raw)))
}
