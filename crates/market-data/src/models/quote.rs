use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder rendered when no value is available.
pub const PLACEHOLDER: &str = "--";

/// Where a quote's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteSource {
    /// Fetched from the provider during this retrieval cycle
    Live,
    /// Taken from the bundled snapshot after the live fetch failed
    Fallback,
    /// Neither the provider nor the snapshot had a value
    Unavailable,
}

impl QuoteSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "LIVE",
            Self::Fallback => "FALLBACK",
            Self::Unavailable => "UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest value for one configured ticker.
///
/// `value` is `Some` exactly when `source` is not [`QuoteSource::Unavailable`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol the quote was retrieved for
    pub symbol: String,

    /// Display label from the ticker configuration
    pub label: String,

    /// Price, absent when unavailable
    pub value: Option<Decimal>,

    /// Origin of the value
    pub source: QuoteSource,
}

impl Quote {
    pub fn live(symbol: impl Into<String>, label: impl Into<String>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            label: label.into(),
            value: Some(price),
            source: QuoteSource::Live,
        }
    }

    pub fn fallback(symbol: impl Into<String>, label: impl Into<String>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            label: label.into(),
            value: Some(price),
            source: QuoteSource::Fallback,
        }
    }

    pub fn unavailable(symbol: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            label: label.into(),
            value: None,
            source: QuoteSource::Unavailable,
        }
    }

    /// Value formatted for display, or `"--"` when unavailable.
    pub fn display_value(&self) -> String {
        self.value
            .map(|v| v.normalize().to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}

/// Ordered quotes for one retrieval cycle, one per configured ticker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSet {
    /// When the retrieval cycle finished
    pub retrieved_at: DateTime<Utc>,

    /// Quotes in ticker configuration order
    pub quotes: Vec<Quote>,
}

impl QuoteSet {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self {
            retrieved_at: Utc::now(),
            quotes,
        }
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.quotes.iter()
    }

    /// First quote retrieved for `symbol`.
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.symbol == symbol)
    }

    /// Number of quotes with the given source.
    pub fn count(&self, source: QuoteSource) -> usize {
        self.quotes.iter().filter(|q| q.source == source).count()
    }
}

impl IntoIterator for QuoteSet {
    type Item = Quote;
    type IntoIter = std::vec::IntoIter<Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.quotes.into_iter()
    }
}

impl<'a> IntoIterator for &'a QuoteSet {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.quotes.iter()
    }
}
