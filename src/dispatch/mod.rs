// Delivery fan-out for reconciliation output

use crate::record::Observation;
use crate::subscription::SubscriptionTable;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast fan-out consumers subscribe to
///
/// Send errors are ignored: a missing or lagging consumer can drop its own
/// messages but never blocks delivery or the poll loop.
pub struct Dispatcher {
    /// Change records, paced or immediate
    change_tx: broadcast::Sender<Observation>,

    /// First sightings, delivered immediately with change = 0
    new_entity_tx: broadcast::Sender<Observation>,

    /// Change records for watched entities only
    watched_tx: broadcast::Sender<Observation>,

    /// Watched-entity registry consulted per delivery
    subscriptions: Arc<SubscriptionTable>,
}

impl Dispatcher {
    pub fn new(subscriptions: Arc<SubscriptionTable>) -> Self {
        let (change_tx, _) = broadcast::channel(1000);
        // The first cycle delivers every entity in the feed as one burst
        let (new_entity_tx, _) = broadcast::channel(4000);
        let (watched_tx, _) = broadcast::channel(100);

        Self {
            change_tx,
            new_entity_tx,
            watched_tx,
            subscriptions,
        }
    }

    /// Deliver one change record
    pub fn deliver_change(&self, record: Observation) {
        debug!(
            entity = %record.id,
            change = record.change,
            "Delivering change record"
        );

        if self.subscriptions.is_watched(&record.id) {
            let _ = self.watched_tx.send(record.clone());
        }
        let _ = self.change_tx.send(record);
    }

    /// Deliver one first-sighting record
    pub fn deliver_new_entity(&self, record: Observation) {
        let _ = self.new_entity_tx.send(record);
    }

    /// Subscribe to change records
    pub fn subscribe_changes(&self) -> broadcast::Receiver<Observation> {
        self.change_tx.subscribe()
    }

    /// Subscribe to first-sighting records
    pub fn subscribe_new_entities(&self) -> broadcast::Receiver<Observation> {
        self.new_entity_tx.subscribe()
    }

    /// Subscribe to change records for watched entities
    pub fn subscribe_watched(&self) -> broadcast::Receiver<Observation> {
        self.watched_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Location;
    use chrono::Utc;
    use std::collections::HashMap;
    use tokio::sync::broadcast::error::TryRecvError;

    fn make_record(id: &str, change: i64) -> Observation {
        Observation {
            id: id.to_string(),
            label: None,
            gauges: HashMap::new(),
            timestamp: Utc::now(),
            change,
            location: Location {
                longitude: 0.0,
                latitude: 0.0,
            },
        }
    }

    #[test]
    fn change_records_reach_subscribers() {
        let dispatcher = Dispatcher::new(Arc::new(SubscriptionTable::new()));
        let mut rx = dispatcher.subscribe_changes();

        dispatcher.deliver_change(make_record("a", 2));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.id, "a");
        assert_eq!(received.change, 2);
    }

    #[test]
    fn delivery_without_subscribers_is_fine() {
        let dispatcher = Dispatcher::new(Arc::new(SubscriptionTable::new()));
        dispatcher.deliver_change(make_record("a", 1));
        dispatcher.deliver_new_entity(make_record("b", 0));
    }

    #[test]
    fn watched_channel_only_carries_watched_entities() {
        let subscriptions = Arc::new(SubscriptionTable::new());
        subscriptions.watch("a");

        let dispatcher = Dispatcher::new(Arc::clone(&subscriptions));
        let mut watched_rx = dispatcher.subscribe_watched();
        let mut change_rx = dispatcher.subscribe_changes();

        dispatcher.deliver_change(make_record("a", -1));
        dispatcher.deliver_change(make_record("b", 3));

        // Both records on the change channel
        assert_eq!(change_rx.try_recv().unwrap().id, "a");
        assert_eq!(change_rx.try_recv().unwrap().id, "b");

        // Only the watched entity on the watched channel
        assert_eq!(watched_rx.try_recv().unwrap().id, "a");
        assert!(matches!(watched_rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn new_entities_do_not_hit_the_change_channel() {
        let dispatcher = Dispatcher::new(Arc::new(SubscriptionTable::new()));
        let mut change_rx = dispatcher.subscribe_changes();
        let mut new_rx = dispatcher.subscribe_new_entities();

        dispatcher.deliver_new_entity(make_record("a", 0));

        assert_eq!(new_rx.try_recv().unwrap().id, "a");
        assert!(matches!(change_rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
