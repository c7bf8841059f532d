// Snapshot reconciliation

use crate::config::FeedConfig;
use crate::inventory::InventoryTracker;
use crate::record::Observation;
use crate::store::SnapshotStore;
use std::sync::Arc;
use tracing::debug;


/// Output of one reconciliation cycle
#[derive(Debug)]
pub struct CycleOutcome {
    /// First sightings in snapshot order, change = 0
    pub new_entities: Vec<Observation>,

    /// Changed entities in snapshot order, change set to the magnitude
    pub changes: Vec<Observation>,

    /// Arithmetic sum of this cycle's change magnitudes
    pub net_change: i64,
}

/// Diffs fresh snapshots against the store
///
/// Each record is classified once per cycle:
/// - unseen id: stored and emitted as a first sighting
/// - any primary gauge differing from the stored record: stored and
///   emitted as a change whose magnitude is the summed gauge delta
/// - otherwise: stored, nothing emitted
///
/// Entities in the store but absent from the snapshot are left untouched.
pub struct DeltaEngine {
    store: Arc<SnapshotStore>,
    inventory: Arc<InventoryTracker>,
    primary_gauges: Vec<String>,
    capacity_gauges: Vec<String>,
}

impl DeltaEngine {
    pub fn new(
        store: Arc<SnapshotStore>,
        inventory: Arc<InventoryTracker>,
        config: &FeedConfig,
    ) -> Self {
        Self {
            store,
            inventory,
            primary_gauges: config.primary_gauges.clone(),
            capacity_gauges: config.capacity_gauges.clone(),
        }
    }

    /// Reconcile one snapshot against the stored state
    pub fn reconcile(&self, snapshot: Vec<Observation>) -> CycleOutcome {
        let mut new_entities = Vec::new();
        let mut changes = Vec::new();
        let mut net_change = 0i64;

        for mut record in snapshot {
            // Magnitudes are diff output, never source input
            record.change = 0;

            match self.store.get(&record.id) {
                None => {
                    self.inventory.observe_new(
                        gauge_sum(&record, &self.primary_gauges),
                        gauge_sum(&record, &self.capacity_gauges),
                    );
                    self.store.insert(record.clone());
                    new_entities.push(record);
                }
                Some(previous) => {
                    let changed = self
                        .primary_gauges
                        .iter()
                        .any(|gauge| previous.gauge(gauge) != record.gauge(gauge));

                    // The store tracks the newest poll even when nothing changed
                    self.store.insert(record.clone());

                    if changed {
                        let magnitude = self.magnitude(&previous, &record);
                        self.inventory.apply_change(magnitude);
                        net_change += magnitude;
                        record.change = magnitude;
                        changes.push(record);
                    }
                }
            }
        }

        debug!(
            new = new_entities.len(),
            changed = changes.len(),
            net_change,
            "Reconciled snapshot"
        );

        CycleOutcome {
            new_entities,
            changes,
            net_change,
        }
    }

    /// Summed signed delta across the primary gauges
    fn magnitude(&self, previous: &Observation, current: &Observation) -> i64 {
        self.primary_gauges
            .iter()
            .map(|gauge| current.gauge(gauge) - previous.gauge(gauge))
            .sum()
    }
}

fn gauge_sum(record: &Observation, gauges: &[String]) -> i64 {
    gauges.iter().map(|gauge| record.gauge(gauge)).sum()
}
