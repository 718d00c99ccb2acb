//! Quote provider trait definition.
//!
//! This module defines the `QuoteProvider` trait that every quote source
//! adapter implements.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::FetchError;

/// Trait for quote source adapters.
///
/// Implement this trait to add support for a new data source. The fetcher
/// treats every error the same way, so adapters should not encode retry or
/// fallback hints in the error. Adapters must not retry internally.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use rust_decimal::Decimal;
/// use quoteboard_market_data::{FetchError, QuoteProvider};
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl QuoteProvider for FixedProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn fetch(&self, symbol: &str) -> Result<Decimal, FetchError> {
///         Err(FetchError::no_data(self.id(), symbol))
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO", "FRED", etc.
    /// Used for logging.
    fn id(&self) -> &'static str;

    /// Fetch the current price for a provider-specific symbol.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the provider is unreachable, has no data
    /// for the symbol, returns a malformed price, or exceeds its time budget.
    async fn fetch(&self, symbol: &str) -> Result<Decimal, FetchError>;
}
