// Per-session snapshot store

use crate::record::Observation;
use dashmap::DashMap;

/// Last-known observation per entity id
///
/// One store per session: created empty on connect, cleared on disconnect.
/// Only the reconciliation cycle writes to it, once per entity per cycle.
pub struct SnapshotStore {
    /// Lock-free concurrent map for fast reads
    records: DashMap<String, Observation>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Get the stored observation for an entity
    pub fn get(&self, id: &str) -> Option<Observation> {
        self.records.get(id).map(|r| r.clone())
    }

    /// Replace the stored observation for an entity
    pub fn insert(&self, record: Observation) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Number of entities seen so far this session
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every stored observation
    pub fn clear(&self) {
        self.records.clear();
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
