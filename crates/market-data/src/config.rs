//! Retrieval configuration.
//!
//! Settings come from environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `QUOTEBOARD_PROVIDER` | `yahoo` | `yahoo`, `fred` or `alpha_vantage` |
//! | `QUOTEBOARD_FETCH_TIMEOUT_MS` | `5000` | per-ticker time budget |
//! | `QUOTEBOARD_MAX_CONCURRENCY` | `4` | concurrent fetches per cycle |
//! | `QUOTEBOARD_SNAPSHOT_PATH` | bundled | fallback snapshot file |
//! | `QUOTEBOARD_TICKERS_FILE` | built-in list | JSON array of `{symbol, label}` |
//! | `FRED_API_KEY` | none | optional FRED key |
//! | `ALPHAVANTAGE_API_KEY` | none | Alpha Vantage key |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::errors::MarketDataError;
use crate::fetcher::FallbackFetcher;
use crate::models::{default_tickers, parse_tickers_json, TickerSpec};
use crate::provider::{build_provider, ProviderKeys, ProviderKind};
use crate::snapshot::SnapshotCache;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Per-cycle fetch policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Time budget for each ticker's live fetch
    pub timeout: Duration,
    /// Maximum fetches in flight at once; 1 means sequential
    pub max_concurrency: usize,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl FetchPolicy {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let timeout_ms = parse_or_default(
            "QUOTEBOARD_FETCH_TIMEOUT_MS",
            lookup("QUOTEBOARD_FETCH_TIMEOUT_MS"),
            DEFAULT_TIMEOUT_MS,
        );
        let max_concurrency = parse_or_default(
            "QUOTEBOARD_MAX_CONCURRENCY",
            lookup("QUOTEBOARD_MAX_CONCURRENCY"),
            DEFAULT_MAX_CONCURRENCY,
        );
        Self {
            timeout: Duration::from_millis(timeout_ms.max(1)),
            max_concurrency: max_concurrency.max(1),
        }
    }
}

/// Everything needed to build a [`FallbackFetcher`] and its ticker list.
#[derive(Debug, Clone, Default)]
pub struct MarketDataConfig {
    pub provider: ProviderKind,
    pub keys: ProviderKeys,
    /// `None` uses the snapshot bundled with the crate
    pub snapshot_path: Option<PathBuf>,
    /// `None` uses [`default_tickers`]
    pub tickers_file: Option<PathBuf>,
    pub policy: FetchPolicy,
}

impl MarketDataConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, MarketDataError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MarketDataError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match non_empty("QUOTEBOARD_PROVIDER") {
            Some(name) => name.parse::<ProviderKind>()?,
            None => ProviderKind::default(),
        };

        Ok(Self {
            provider,
            keys: ProviderKeys {
                fred: non_empty("FRED_API_KEY"),
                alpha_vantage: non_empty("ALPHAVANTAGE_API_KEY"),
            },
            snapshot_path: non_empty("QUOTEBOARD_SNAPSHOT_PATH").map(PathBuf::from),
            tickers_file: non_empty("QUOTEBOARD_TICKERS_FILE").map(PathBuf::from),
            policy: FetchPolicy::from_lookup(&lookup),
        })
    }

    /// The configured ticker list.
    pub fn tickers(&self) -> Result<Vec<TickerSpec>, MarketDataError> {
        match &self.tickers_file {
            None => Ok(default_tickers()),
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    MarketDataError::InvalidConfig(format!(
                        "cannot read ticker file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                parse_tickers_json(&json)
            }
        }
    }

    /// The snapshot cache for this configuration. Nothing is loaded yet.
    pub fn snapshot_cache(&self) -> SnapshotCache {
        match &self.snapshot_path {
            Some(path) => SnapshotCache::from_path(path),
            None => SnapshotCache::bundled(),
        }
    }

    /// Wire the configured provider, snapshot cache and policy together.
    pub fn build_fetcher(&self) -> Result<FallbackFetcher, MarketDataError> {
        let provider = build_provider(self.provider, &self.keys, self.policy.timeout)?;
        Ok(FallbackFetcher::new(
            provider,
            Arc::new(self.snapshot_cache()),
            self.policy.clone(),
        ))
    }
}

fn parse_or_default<T: std::str::FromStr + Copy + std::fmt::Display>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}='{}', using {}", key, value, default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MarketDataConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.provider, ProviderKind::Yahoo);
        assert_eq!(config.policy, FetchPolicy::default());
        assert!(config.snapshot_path.is_none());
        assert_eq!(config.tickers().unwrap(), default_tickers());
    }

    #[test]
    fn test_reads_all_settings() {
        let config = MarketDataConfig::from_lookup(lookup_from(&[
            ("QUOTEBOARD_PROVIDER", "fred"),
            ("QUOTEBOARD_FETCH_TIMEOUT_MS", "2500"),
            ("QUOTEBOARD_MAX_CONCURRENCY", "1"),
            ("QUOTEBOARD_SNAPSHOT_PATH", "/srv/snapshot.json"),
            ("FRED_API_KEY", "abc"),
            ("ALPHAVANTAGE_API_KEY", " "),
        ]))
        .unwrap();

        assert_eq!(config.provider, ProviderKind::Fred);
        assert_eq!(config.policy.timeout, Duration::from_millis(2500));
        assert_eq!(config.policy.max_concurrency, 1);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/srv/snapshot.json")));
        assert_eq!(config.keys.fred.as_deref(), Some("abc"));
        assert!(config.keys.alpha_vantage.is_none());
    }

    #[test]
    fn test_invalid_numbers_use_defaults() {
        let policy = FetchPolicy::from_lookup(lookup_from(&[
            ("QUOTEBOARD_FETCH_TIMEOUT_MS", "soon"),
            ("QUOTEBOARD_MAX_CONCURRENCY", "0"),
        ]));
        assert_eq!(policy.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(policy.max_concurrency, 1);
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let result =
            MarketDataConfig::from_lookup(lookup_from(&[("QUOTEBOARD_PROVIDER", "bloomberg")]));
        assert!(matches!(result, Err(MarketDataError::UnknownProvider(_))));
    }

    #[test]
    fn test_tickers_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"symbol": "NIKKEI225", "label": "Nikkei 225"}}]"#).unwrap();

        let config = MarketDataConfig {
            tickers_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let tickers = config.tickers().unwrap();
        assert_eq!(tickers, vec![TickerSpec::new("NIKKEI225", "Nikkei 225").unwrap()]);
    }

    #[test]
    fn test_missing_tickers_file() {
        let config = MarketDataConfig {
            tickers_file: Some(PathBuf::from("/definitely/not/here.json")),
            ..Default::default()
        };
        assert!(matches!(
            config.tickers(),
            Err(MarketDataError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_build_fetcher_uses_configured_provider() {
        let config = MarketDataConfig {
            provider: ProviderKind::AlphaVantage,
            ..Default::default()
        };
        let fetcher = config.build_fetcher().unwrap();
        assert_eq!(fetcher.provider_id(), "ALPHA_VANTAGE");
    }
}
