//! Fallback snapshot of last-known prices.
//!
//! The snapshot is a JSON object mapping provider symbols to prices:
//!
//! ```json
//! { "^N225": 38000.12, "JPY=X": "149.50" }
//! ```
//!
//! Prices may be JSON numbers or numeric strings. Entries that are neither
//! are skipped, so only the affected ticker loses its fallback. This crate
//! only ever reads snapshots.

mod cache;

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use log::warn;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::SnapshotError;

pub use cache::{SnapshotCache, SnapshotState};

/// Snapshot compiled into the crate.
const BUNDLED_SNAPSHOT: &str = include_str!("../../data/fallback_snapshot.json");

/// Read-only mapping from symbol to last-known price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackSnapshot {
    prices: HashMap<String, Decimal>,
}

impl FallbackSnapshot {
    /// Parse a snapshot from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(json)?;
        let entries = match value {
            Value::Object(map) => map,
            _ => return Err(SnapshotError::NotAnObject),
        };

        let mut prices = HashMap::with_capacity(entries.len());
        for (symbol, raw) in entries {
            match parse_price(&raw) {
                Some(price) => {
                    prices.insert(symbol, price);
                }
                None => warn!("Skipping snapshot entry '{}': {} is not a price", symbol, raw),
            }
        }

        Ok(Self { prices })
    }

    /// Load a snapshot file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// The snapshot shipped with the crate.
    pub fn bundled() -> Result<Self, SnapshotError> {
        Self::from_json_str(BUNDLED_SNAPSHOT)
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.prices.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Decimal)> for FallbackSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

fn parse_price(raw: &Value) -> Option<Decimal> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_numbers_and_strings() {
        let snapshot = FallbackSnapshot::from_json_str(r#"{"^N225": 38000.12, "JPY=X": "149.50"}"#)
            .unwrap();
        assert_eq!(snapshot.get("^N225"), Some(dec!(38000.12)));
        assert_eq!(snapshot.get("JPY=X"), Some(dec!(149.50)));
        assert_eq!(snapshot.get("^JGBL"), None);
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let snapshot = FallbackSnapshot::from_json_str(
            r#"{"^N225": 38000.12, "JPY=X": "n/a", "^JGBL": null, "X": [1]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("JPY=X").is_none());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(
            FallbackSnapshot::from_json_str("[1, 2]"),
            Err(SnapshotError::NotAnObject)
        ));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(matches!(
            FallbackSnapshot::from_json_str("{\"^N225\": "),
            Err(SnapshotError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FallbackSnapshot::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"^N225": 38000.12, "JPY=X": 149.50}}"#).unwrap();

        let first = FallbackSnapshot::load(file.path()).unwrap();
        let second = FallbackSnapshot::load(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_bundled_snapshot_covers_default_tickers() {
        let snapshot = FallbackSnapshot::bundled().unwrap();
        for ticker in crate::models::default_tickers() {
            assert!(
                snapshot.get(&ticker.symbol).is_some(),
                "missing {}",
                ticker.symbol
            );
        }
    }
}
