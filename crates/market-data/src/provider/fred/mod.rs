//! FRED (Federal Reserve Economic Data) quote provider.
//!
//! Reads the most recent observation of a FRED series, e.g. `NIKKEI225` for
//! the Nikkei 225 close or `IRLTLT01JPM156N` for the Japan 10-year government
//! bond yield. FRED marks missing observations with a `"."` value.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::FetchError;
use crate::provider::{price_from_str, QuoteProvider};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const PROVIDER_ID: &str = "FRED";

/// FRED series observation provider.
///
/// The API key is optional: anonymous calls work until FRED's request limit
/// is reached.
pub struct FredProvider {
    client: Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

impl FredProvider {
    /// Create a new FRED provider whose HTTP calls are bounded by `timeout`.
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

    async fn request(&self, series_id: &str) -> Result<String, FetchError> {
        let mut params: Vec<(&str, &str)> = vec![
            ("series_id", series_id),
            ("file_type", "json"),
            ("sort_order", "desc"),
            ("limit", "1"),
        ];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("api_key", key));
        }

        let url = reqwest::Url::parse_with_params(BASE_URL, &params).map_err(|e| {
            FetchError::new(PROVIDER_ID, series_id, format!("Failed to build URL: {}", e))
        })?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::new(PROVIDER_ID, series_id, "request timed out")
            } else {
                FetchError::new(PROVIDER_ID, series_id, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                PROVIDER_ID,
                series_id,
                format!("HTTP {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::new(PROVIDER_ID, series_id, e.to_string()))
    }

    /// Extract the latest observation value from a response body.
    fn parse_latest(series_id: &str, body: &str) -> Result<Decimal, FetchError> {
        let response: ObservationsResponse = serde_json::from_str(body).map_err(|e| {
            FetchError::new(
                PROVIDER_ID,
                series_id,
                format!("Failed to parse response: {}", e),
            )
        })?;

        if let Some(message) = response.error_message {
            return Err(FetchError::new(PROVIDER_ID, series_id, message));
        }

        let latest = response
            .observations
            .first()
            .ok_or_else(|| FetchError::no_data(PROVIDER_ID, series_id))?;

        if latest.value.trim() == "." {
            return Err(FetchError::new(
                PROVIDER_ID,
                series_id,
                format!("no observation value for {}", latest.date),
            ));
        }

        debug!(
            "FRED observation {} = {} for {}",
            latest.date, latest.value, series_id
        );
        price_from_str(PROVIDER_ID, series_id, &latest.value)
    }
}

#[async_trait]
impl QuoteProvider for FredProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, symbol: &str) -> Result<Decimal, FetchError> {
        if symbol.trim().is_empty() {
            return Err(FetchError::new(PROVIDER_ID, symbol, "empty symbol"));
        }
        let body = self.request(symbol).await?;
        Self::parse_latest(symbol, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_latest_observation() {
        let body = r#"{
            "observations": [
                {"realtime_start": "2024-03-01", "date": "2024-02-29", "value": "39166.19"}
            ]
        }"#;
        let value = FredProvider::parse_latest("NIKKEI225", body).unwrap();
        assert_eq!(value, dec!(39166.19));
    }

    #[test]
    fn test_parse_missing_value_marker() {
        let body = r#"{"observations": [{"date": "2024-03-20", "value": "."}]}"#;
        let err = FredProvider::parse_latest("NIKKEI225", body).unwrap_err();
        assert!(err.message.contains("2024-03-20"));
    }

    #[test]
    fn test_parse_empty_observations() {
        let body = r#"{"observations": []}"#;
        let err = FredProvider::parse_latest("NIKKEI225", body).unwrap_err();
        assert_eq!(err, FetchError::no_data("FRED", "NIKKEI225"));
    }

    #[test]
    fn test_parse_api_error_message() {
        let body = r#"{"error_code": 400, "error_message": "Bad Request. The series does not exist."}"#;
        let err = FredProvider::parse_latest("BOGUS", body).unwrap_err();
        assert!(err.message.starts_with("Bad Request"));
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(FredProvider::parse_latest("NIKKEI225", "<html>").is_err());
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let provider = FredProvider::new(Some("  ".to_string()), Duration::from_secs(1));
        assert!(provider.api_key.is_none());
        assert_eq!(provider.id(), "FRED");
    }
}
