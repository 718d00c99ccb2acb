//! Alpha Vantage quote provider.
//!
//! Reads realtime FX rates through the `CURRENCY_EXCHANGE_RATE` endpoint.
//! Symbols may be given as `USDJPY`, `USD/JPY`, or in Yahoo form (`JPY=X`
//! meaning USD/JPY, `EURJPY=X` meaning EUR/JPY).
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::FetchError;
use crate::provider::{price_from_str, QuoteProvider};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

/// Alpha Vantage FX rate provider.
///
/// Without an API key every fetch fails, so the fetcher falls back to the
/// snapshot.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: Option<String>,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    rate: Option<ExchangeRate>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRate {
    #[serde(rename = "5. Exchange Rate")]
    exchange_rate: Option<String>,
    #[serde(rename = "6. Last Refreshed")]
    last_refreshed: Option<String>,
}

/// Split a symbol into `(from, to)` currency codes.
fn parse_pair(symbol: &str) -> Option<(String, String)> {
    let symbol = symbol.trim().to_ascii_uppercase();
    if !symbol.is_ascii() {
        return None;
    }
    let is_code = |s: &str| s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic());

    if let Some(yahoo) = symbol.strip_suffix("=X") {
        return match yahoo.len() {
            3 if is_code(yahoo) => Some(("USD".to_string(), yahoo.to_string())),
            6 if is_code(&yahoo[..3]) && is_code(&yahoo[3..]) => {
                Some((yahoo[..3].to_string(), yahoo[3..].to_string()))
            }
            _ => None,
        };
    }

    if let Some((from, to)) = symbol.split_once('/') {
        return (is_code(from) && is_code(to)).then(|| (from.to_string(), to.to_string()));
    }

    if symbol.len() == 6 && is_code(&symbol[..3]) && is_code(&symbol[3..]) {
        return Some((symbol[..3].to_string(), symbol[3..].to_string()));
    }

    None
}

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider whose HTTP calls are bounded by `timeout`.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Make a request to the Alpha Vantage API.
    async fn request(
        &self,
        symbol: &str,
        api_key: &str,
        from: &str,
        to: &str,
    ) -> Result<String, FetchError> {
        let params = [
            ("function", "CURRENCY_EXCHANGE_RATE"),
            ("from_currency", from),
            ("to_currency", to),
            ("apikey", api_key),
        ];

        let url = reqwest::Url::parse_with_params(BASE_URL, &params).map_err(|e| {
            FetchError::new(PROVIDER_ID, symbol, format!("Failed to build URL: {}", e))
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(api_key, "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::new(PROVIDER_ID, symbol, "request timed out")
            } else {
                FetchError::new(PROVIDER_ID, symbol, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                PROVIDER_ID,
                symbol,
                format!("HTTP {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::new(PROVIDER_ID, symbol, e.to_string()))
    }

    /// Extract the exchange rate from a response body.
    fn parse_rate(symbol: &str, body: &str) -> Result<Decimal, FetchError> {
        let response: ExchangeRateResponse = serde_json::from_str(body).map_err(|e| {
            FetchError::new(
                PROVIDER_ID,
                symbol,
                format!("Failed to parse response: {}", e),
            )
        })?;

        if let Some(message) = response.error_message {
            return Err(FetchError::new(PROVIDER_ID, symbol, message));
        }

        // Rate-limit notices arrive as 200 responses without a rate block
        let rate = match response.rate {
            Some(rate) => rate,
            None => {
                if let Some(notice) = response.note.or(response.information) {
                    warn!("Alpha Vantage notice for {}: {}", symbol, notice);
                    return Err(FetchError::new(PROVIDER_ID, symbol, notice));
                }
                return Err(FetchError::no_data(PROVIDER_ID, symbol));
            }
        };

        let raw = rate.exchange_rate.ok_or_else(|| {
            FetchError::new(PROVIDER_ID, symbol, "missing exchange rate field")
        })?;

        debug!(
            "Alpha Vantage rate {} for {} (refreshed {})",
            raw,
            symbol,
            rate.last_refreshed.as_deref().unwrap_or("unknown")
        );
        price_from_str(PROVIDER_ID, symbol, &raw)
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, symbol: &str) -> Result<Decimal, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::new(PROVIDER_ID, symbol, "API key not configured"))?;

        let (from, to) = parse_pair(symbol).ok_or_else(|| {
            FetchError::new(PROVIDER_ID, symbol, "symbol is not a currency pair")
        })?;

        let body = self.request(symbol, api_key, &from, &to).await?;
        Self::parse_rate(symbol, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair(from: &str, to: &str) -> Option<(String, String)> {
        Some((from.to_string(), to.to_string()))
    }

    #[test]
    fn test_parse_pair_forms() {
        assert_eq!(parse_pair("USDJPY"), pair("USD", "JPY"));
        assert_eq!(parse_pair("usd/jpy"), pair("USD", "JPY"));
        assert_eq!(parse_pair("JPY=X"), pair("USD", "JPY"));
        assert_eq!(parse_pair("EURJPY=X"), pair("EUR", "JPY"));
    }

    #[test]
    fn test_parse_pair_rejects_non_fx() {
        assert_eq!(parse_pair("^N225"), None);
        assert_eq!(parse_pair("NIKKEI225"), None);
        assert_eq!(parse_pair("US/JPY"), None);
        assert_eq!(parse_pair(""), None);
    }

    #[test]
    fn test_parse_rate() {
        let body = r#"{
            "Realtime Currency Exchange Rate": {
                "1. From_Currency Code": "USD",
                "3. To_Currency Code": "JPY",
                "5. Exchange Rate": "149.50000000",
                "6. Last Refreshed": "2024-03-01 12:00:01"
            }
        }"#;
        assert_eq!(
            AlphaVantageProvider::parse_rate("USDJPY", body).unwrap(),
            dec!(149.5)
        );
    }

    #[test]
    fn test_parse_rate_limit_notice() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let err = AlphaVantageProvider::parse_rate("USDJPY", body).unwrap_err();
        assert!(err.message.contains("call frequency"));
    }

    #[test]
    fn test_parse_rate_missing_field() {
        let body = r#"{"Realtime Currency Exchange Rate": {}}"#;
        let err = AlphaVantageProvider::parse_rate("USDJPY", body).unwrap_err();
        assert_eq!(err.message, "missing exchange rate field");
    }

    #[test]
    fn test_parse_rate_error_message() {
        let body = r#"{"Error Message": "Invalid API call."}"#;
        assert!(AlphaVantageProvider::parse_rate("USDJPY", body).is_err());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fetch() {
        let provider = AlphaVantageProvider::new(None, Duration::from_secs(1));
        let err = provider.fetch("USDJPY").await.unwrap_err();
        assert_eq!(err.provider, "ALPHA_VANTAGE");
        assert_eq!(err.message, "API key not configured");
    }
}
