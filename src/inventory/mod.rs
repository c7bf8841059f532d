// Running inventory totals across the connected feed

use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Tracks aggregate inventory for the current session
///
/// First sightings register an entity's availability and capacity; change
/// records adjust availability by their magnitude. Totals are telemetry
/// only and are rebuilt from scratch each session.
pub struct InventoryTracker {
    /// Entities seen so far
    entities: AtomicU64,

    /// Total capacity (availability plus slack at first sighting)
    capacity: AtomicI64,

    /// Currently available units across all entities
    available: AtomicI64,

    /// Lifetime sum of change magnitudes this session
    net_change: AtomicI64,
}

impl InventoryTracker {
    pub fn new() -> Self {
        Self {
            entities: AtomicU64::new(0),
            capacity: AtomicI64::new(0),
            available: AtomicI64::new(0),
            net_change: AtomicI64::new(0),
        }
    }

    /// Register a first-sighting record (call from the delta engine)
    pub fn observe_new(&self, available: i64, slack: i64) {
        self.entities.fetch_add(1, Ordering::Relaxed);
        self.capacity.fetch_add(available + slack, Ordering::Relaxed);
        self.available.fetch_add(available, Ordering::Relaxed);
    }

    /// Apply a change record's signed magnitude
    pub fn apply_change(&self, magnitude: i64) {
        self.available.fetch_add(magnitude, Ordering::Relaxed);
        self.net_change.fetch_add(magnitude, Ordering::Relaxed);
    }

    /// Get snapshot of the current totals
    pub fn snapshot(&self) -> InventorySnapshot {
        let entities = self.entities.load(Ordering::Relaxed);
        let capacity = self.capacity.load(Ordering::Relaxed);
        let available = self.available.load(Ordering::Relaxed);
        let net_change = self.net_change.load(Ordering::Relaxed);

        let percent_available = if capacity > 0 {
            (available as f64 / capacity as f64) * 100.0
        } else {
            0.0
        };

        InventorySnapshot {
            entities,
            capacity,
            available,
            out: capacity - available,
            percent_available,
            net_change,
        }
    }

    /// Zero every counter (disconnect path)
    pub fn reset(&self) {
        self.entities.store(0, Ordering::Relaxed);
        self.capacity.store(0, Ordering::Relaxed);
        self.available.store(0, Ordering::Relaxed);
        self.net_change.store(0, Ordering::Relaxed);
    }
}

impl Default for InventoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of inventory totals at a point in time
#[derive(Debug, Clone, Serialize)]
pub struct InventorySnapshot {
    pub entities: u64,
    pub capacity: i64,
    pub available: i64,
    /// Capacity currently in use (capacity minus available)
    pub out: i64,
    pub percent_available: f64,
    pub net_change: i64,
}
