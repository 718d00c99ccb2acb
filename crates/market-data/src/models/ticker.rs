//! Ticker configuration models.

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// A configured ticker: the provider symbol plus its display label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickerSpec {
    /// Provider-specific identifier (e.g., "^N225", "JPY=X", "NIKKEI225")
    pub symbol: String,

    /// Human-readable name shown on the page (e.g., "Nikkei 225")
    pub label: String,
}

impl TickerSpec {
    /// Create a ticker, rejecting empty symbols or labels.
    pub fn new(
        symbol: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Self, MarketDataError> {
        let symbol: String = symbol.into();
        let label: String = label.into();
        let spec = Self {
            symbol: symbol.trim().to_string(),
            label: label.trim().to_string(),
        };
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<(), MarketDataError> {
        if self.symbol.is_empty() {
            return Err(MarketDataError::InvalidTicker(format!(
                "empty symbol for label '{}'",
                self.label
            )));
        }
        if self.label.is_empty() {
            return Err(MarketDataError::InvalidTicker(format!(
                "empty label for symbol '{}'",
                self.symbol
            )));
        }
        Ok(())
    }
}

/// The tickers shown on the homepage when nothing else is configured.
pub fn default_tickers() -> Vec<TickerSpec> {
    [
        ("^N225", "Nikkei 225"),
        ("JPY=X", "USDJPY"),
        // JGB 10Y yield is not always available on Yahoo; the future is shown for reference
        ("^JGBL", "JGB Future (ref)"),
    ]
    .into_iter()
    .map(|(symbol, label)| TickerSpec {
        symbol: symbol.to_string(),
        label: label.to_string(),
    })
    .collect()
}

/// Parse an ordered ticker list from a JSON array of `{symbol, label}` objects.
pub fn parse_tickers_json(json: &str) -> Result<Vec<TickerSpec>, MarketDataError> {
    let raw: Vec<TickerSpec> = serde_json::from_str(json)
        .map_err(|e| MarketDataError::InvalidConfig(format!("ticker list: {}", e)))?;

    raw.into_iter()
        .map(|t| TickerSpec::new(t.symbol, t.label))
        .collect()
}
