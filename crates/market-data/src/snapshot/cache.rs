//! Lazily loaded, process-lifetime snapshot cache.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use log::{info, warn};
use rust_decimal::Decimal;

use super::FallbackSnapshot;

/// Where a cache loads its snapshot from.
#[derive(Debug, Clone)]
enum SnapshotOrigin {
    File(PathBuf),
    Bundled,
}

/// Lifecycle of a [`SnapshotCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotState {
    /// No lookup has needed the snapshot yet
    NotLoaded,
    /// The snapshot was loaded and is served from memory
    Loaded(Arc<FallbackSnapshot>),
    /// Loading failed; every lookup returns `None` for the cache's lifetime
    Failed(String),
}

/// Loads a [`FallbackSnapshot`] at most once, on first use.
///
/// A missing or malformed snapshot does not raise: the cache moves to
/// [`SnapshotState::Failed`] and all lookups miss. Concurrent first lookups
/// block on a single load.
#[derive(Debug)]
pub struct SnapshotCache {
    origin: SnapshotOrigin,
    slot: OnceLock<Result<Arc<FallbackSnapshot>, String>>,
}

impl SnapshotCache {
    /// Cache backed by a snapshot file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: SnapshotOrigin::File(path.into()),
            slot: OnceLock::new(),
        }
    }

    /// Cache backed by the snapshot compiled into the crate.
    pub fn bundled() -> Self {
        Self {
            origin: SnapshotOrigin::Bundled,
            slot: OnceLock::new(),
        }
    }

    /// Cache that is already loaded with `snapshot`.
    pub fn preloaded(snapshot: FallbackSnapshot) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(Ok(Arc::new(snapshot)));
        Self {
            origin: SnapshotOrigin::Bundled,
            slot,
        }
    }

    /// Current lifecycle state. Does not trigger a load.
    pub fn state(&self) -> SnapshotState {
        match self.slot.get() {
            None => SnapshotState::NotLoaded,
            Some(Ok(snapshot)) => SnapshotState::Loaded(Arc::clone(snapshot)),
            Some(Err(reason)) => SnapshotState::Failed(reason.clone()),
        }
    }

    /// Force the load now instead of on the first fallback.
    pub fn preload(&self) -> SnapshotState {
        let _ = self.snapshot();
        self.state()
    }

    /// The loaded snapshot, loading it on first call.
    pub fn snapshot(&self) -> Option<Arc<FallbackSnapshot>> {
        self.slot
            .get_or_init(|| self.load())
            .as_ref()
            .ok()
            .map(Arc::clone)
    }

    /// Last-known price for `symbol`, if the snapshot loaded and has it.
    pub fn lookup(&self, symbol: &str) -> Option<Decimal> {
        self.snapshot().and_then(|s| s.get(symbol))
    }

    fn load(&self) -> Result<Arc<FallbackSnapshot>, String> {
        let result = match &self.origin {
            SnapshotOrigin::File(path) => FallbackSnapshot::load(path),
            SnapshotOrigin::Bundled => FallbackSnapshot::bundled(),
        };

        match result {
            Ok(snapshot) => {
                info!(
                    "Loaded fallback snapshot ({}) with {} prices",
                    self.describe_origin(),
                    snapshot.len()
                );
                Ok(Arc::new(snapshot))
            }
            Err(e) => {
                warn!(
                    "Fallback snapshot ({}) unavailable, fallbacks will be empty: {}",
                    self.describe_origin(),
                    e
                );
                Err(e.to_string())
            }
        }
    }

    fn describe_origin(&self) -> String {
        match &self.origin {
            SnapshotOrigin::File(path) => path.display().to_string(),
            SnapshotOrigin::Bundled => "bundled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_lazy_load_lifecycle() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"JPY=X": 149.50}}"#).unwrap();

        let cache = SnapshotCache::from_path(file.path());
        assert_eq!(cache.state(), SnapshotState::NotLoaded);

        assert_eq!(cache.lookup("JPY=X"), Some(dec!(149.50)));
        assert!(matches!(cache.state(), SnapshotState::Loaded(_)));
    }

    #[test]
    fn test_loads_only_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"JPY=X": 149.50}}"#).unwrap();
        let cache = SnapshotCache::from_path(file.path());
        assert_eq!(cache.lookup("JPY=X"), Some(dec!(149.50)));

        // Rewriting the file after the first load has no effect
        std::fs::write(file.path(), r#"{"JPY=X": 1}"#).unwrap();
        assert_eq!(cache.lookup("JPY=X"), Some(dec!(149.50)));
    }

    #[test]
    fn test_missing_file_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::from_path(dir.path().join("missing.json"));

        assert_eq!(cache.lookup("JPY=X"), None);
        assert!(matches!(cache.state(), SnapshotState::Failed(_)));
    }

    #[test]
    fn test_malformed_file_stays_failed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let cache = SnapshotCache::from_path(file.path());
        assert!(matches!(cache.preload(), SnapshotState::Failed(_)));

        // A repaired file is not picked up within the same cache lifetime
        std::fs::write(file.path(), r#"{"JPY=X": 149.5}"#).unwrap();
        assert_eq!(cache.lookup("JPY=X"), None);
    }

    #[test]
    fn test_preloaded() {
        let snapshot: FallbackSnapshot = [("^N225".to_string(), dec!(38000.12))]
            .into_iter()
            .collect();
        let cache = SnapshotCache::preloaded(snapshot);
        assert!(matches!(cache.state(), SnapshotState::Loaded(_)));
        assert_eq!(cache.lookup("^N225"), Some(dec!(38000.12)));
    }

    #[test]
    fn test_bundled() {
        let cache = SnapshotCache::bundled();
        assert!(cache.lookup("^N225").is_some());
    }
}
