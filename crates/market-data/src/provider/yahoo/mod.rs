//! Yahoo Finance quote provider.
//!
//! Uses the Yahoo Finance chart API (through `yahoo_finance_api`) to read the
//! latest close for indices (e.g., ^N225), futures (^JGBL) and FX rates
//! (e.g., JPY=X).

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use yahoo_finance_api as yahoo;

use crate::errors::{FetchError, MarketDataError};
use crate::provider::{price_from_f64, QuoteProvider};

const PROVIDER_ID: &str = "YAHOO";

/// Yahoo Finance quote provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    timeout: Duration,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider whose calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderInit {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector, timeout })
    }

    async fn fetch_last_close(&self, symbol: &str) -> Result<f64, FetchError> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| map_yahoo_error(symbol, e))?;

        let quote = response
            .last_quote()
            .map_err(|e| map_yahoo_error(symbol, e))?;

        debug!(
            "Yahoo returned close {} for {} at {}",
            quote.close, symbol, quote.timestamp
        );
        Ok(quote.close)
    }
}

fn map_yahoo_error(symbol: &str, error: yahoo::YahooError) -> FetchError {
    match error {
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
            FetchError::no_data(PROVIDER_ID, symbol)
        }
        other => FetchError::new(PROVIDER_ID, symbol, other.to_string()),
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, symbol: &str) -> Result<Decimal, FetchError> {
        if symbol.trim().is_empty() {
            return Err(FetchError::new(PROVIDER_ID, symbol, "empty symbol"));
        }

        let close = tokio::time::timeout(self.timeout, self.fetch_last_close(symbol))
            .await
            .map_err(|_| FetchError::timeout(PROVIDER_ID, symbol, self.timeout))??;

        price_from_f64(PROVIDER_ID, symbol, close)
    }
}
