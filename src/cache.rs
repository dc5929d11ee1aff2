// Last-value snapshot cell: single writer (the worker), many readers
// (request handlers).

use crate::models::MetricSnapshot;
use std::sync::RwLock;

#[derive(Default)]
pub struct SnapshotCache {
    inner: RwLock<Option<MetricSnapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the cached snapshot with the current tick's.
    pub fn store(&self, snapshot: MetricSnapshot) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(snapshot);
        }
    }

    /// Most recent snapshot, or None before the first tick has completed.
    pub fn latest(&self) -> Option<MetricSnapshot> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_first_store_then_overwrites() {
        let cache = SnapshotCache::new();
        assert!(cache.latest().is_none());

        let mut snapshot = MetricSnapshot::default();
        cache.store(snapshot.clone());
        assert_eq!(cache.latest(), Some(snapshot.clone()));

        snapshot.timestamp += chrono::Duration::seconds(1);
        cache.store(snapshot.clone());
        assert_eq!(cache.latest().unwrap().timestamp, snapshot.timestamp);
    }
}
