//! Per-file resume positions, persisted as a JSON map in localStorage.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{playback, storage_keys};
use crate::core::error::StoreError;
use crate::core::store::KeyValueStore;

/// Last playback position of each video, keyed by full path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResumeIndex {
    positions: BTreeMap<String, f64>,
    /// Paths cleared since the last load, dropped from the stored map on save.
    cleared: BTreeSet<String>,
}

impl ResumeIndex {
    /// Load the stored index. A missing or malformed entry yields an empty index.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            positions: read_map(store),
            cleared: BTreeSet::new(),
        }
    }

    pub fn get(&self, path: &str) -> Option<f64> {
        self.positions.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Record where playback of `path` stopped.
    ///
    /// Positions too close to either end of the stream clear the entry instead.
    pub fn record(&mut self, path: &str, position: f64, duration: f64) {
        let near_start = !position.is_finite() || position < playback::RESUME_MIN_SECS;
        let near_end = duration.is_finite()
            && duration > 0.0
            && position >= duration - playback::RESUME_END_GUARD_SECS;

        if near_start || near_end {
            self.clear(path);
        } else {
            self.cleared.remove(path);
            self.positions.insert(path.to_string(), position);
        }
    }

    pub fn clear(&mut self, path: &str) {
        self.positions.remove(path);
        self.cleared.insert(path.to_string());
    }

    /// Merge into the stored map and write it back. Entries recorded here win.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let mut merged = read_map(store);
        for path in &self.cleared {
            merged.remove(path);
        }
        merged.extend(self.positions.iter().map(|(k, v)| (k.clone(), *v)));

        let json =
            serde_json::to_string(&merged).map_err(|e| StoreError::Serialize(e.to_string()))?;
        store.set(storage_keys::RESUME_INDEX, &json)
    }
}

fn read_map(store: &dyn KeyValueStore) -> BTreeMap<String, f64> {
    let Some(json) = store.get(storage_keys::RESUME_INDEX) else {
        return BTreeMap::new();
    };
    serde_json::from_str(&json).unwrap_or_else(|e| {
        log::warn!("Discarding malformed resume index: {}", e);
        BTreeMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    #[test]
    fn test_round_trip_through_store() {
        let store = MemoryStore::default();
        let mut index = ResumeIndex::load(&store);
        index.record("/usb/movie.mp4", 42.5, 3600.0);
        index.save(&store).unwrap();

        let reloaded = ResumeIndex::load(&store);
        assert_eq!(reloaded.get("/usb/movie.mp4"), Some(42.5));
    }

    #[test]
    fn test_positions_near_edges_are_cleared() {
        let mut index = ResumeIndex::default();
        index.record("/a.mp4", 30.0, 100.0);
        index.record("/a.mp4", 0.4, 100.0);
        assert_eq!(index.get("/a.mp4"), None);

        index.record("/b.mp4", 96.0, 100.0);
        assert_eq!(index.get("/b.mp4"), None);

        index.record("/c.mp4", 50.0, f64::NAN);
        assert_eq!(index.get("/c.mp4"), Some(50.0));
    }

    #[test]
    fn test_save_merges_with_other_writers() {
        let store = MemoryStore::default();
        let mut first = ResumeIndex::load(&store);
        let mut second = ResumeIndex::load(&store);

        first.record("/a.mp4", 10.0, 100.0);
        first.save(&store).unwrap();
        second.record("/b.mp4", 20.0, 100.0);
        second.save(&store).unwrap();

        let merged = ResumeIndex::load(&store);
        assert_eq!(merged.get("/a.mp4"), Some(10.0));
        assert_eq!(merged.get("/b.mp4"), Some(20.0));
    }

    #[test]
    fn test_cleared_entry_removed_on_save() {
        let store = MemoryStore::default();
        let mut index = ResumeIndex::load(&store);
        index.record("/a.mp4", 10.0, 100.0);
        index.save(&store).unwrap();

        let mut index = ResumeIndex::load(&store);
        index.clear("/a.mp4");
        index.save(&store).unwrap();
        assert!(ResumeIndex::load(&store).is_empty());
    }

    #[test]
    fn test_malformed_store_yields_empty() {
        let store = MemoryStore::default();
        store.set(storage_keys::RESUME_INDEX, "[1,2").unwrap();
        assert!(ResumeIndex::load(&store).is_empty());
    }
}
