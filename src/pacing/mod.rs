// Paced delivery of change records

use crate::dispatch::Dispatcher;
use crate::record::Observation;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;


/// Paced delivery queue
///
/// Spreads a cycle's change records over the window until the next poll:
/// one record per tick at ceil(batch / window) deliveries per second.
/// Records queued by earlier batches always drain before later ones, and
/// every queued record is delivered exactly once unless the queue is
/// stopped outright.
pub struct Pacer {
    /// Records awaiting delivery, oldest first
    queue: Arc<Mutex<VecDeque<Observation>>>,

    /// Drain task for the current batch, if one is running
    drain_task: tokio::sync::Mutex<Option<JoinHandle<()>>>,

    dispatcher: Arc<Dispatcher>,
}

impl Pacer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            drain_task: tokio::sync::Mutex::new(None),
            dispatcher,
        }
    }

    /// Number of records still awaiting delivery
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Queue a batch of records and start draining it
    ///
    /// The drain rate is computed from this batch's size and the window:
    /// the first delivery happens one spacing interval from now, then one
    /// record per tick until the queue is empty. A drain task left over
    /// from an earlier batch is retired first; its undelivered records
    /// stay at the front of the queue.
    pub async fn schedule(&self, records: Vec<Observation>, window_secs: u64) {
        if records.is_empty() {
            return;
        }

        let spacing = delivery_spacing(records.len(), window_secs);
        debug!(
            batch = records.len(),
            window_secs,
            spacing_ms = spacing.as_millis() as u64,
            "Scheduling paced deliveries"
        );

        let mut slot = self.drain_task.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
            let _ = previous.await;
        }

        self.queue.lock().unwrap().extend(records);

        let queue = Arc::clone(&self.queue);
        let dispatcher = Arc::clone(&self.dispatcher);
        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + spacing, spacing);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                // No await between the pop and the delivery, so a record
                // can never be lost to cancellation
                let record = queue.lock().unwrap().pop_front();
                match record {
                    Some(record) => dispatcher.deliver_change(record),
                    None => break,
                }
            }
        }));
    }

    /// Deliver everything still queued, in order, right now
    ///
    /// The drain task is retired before the synchronous drain, so an
    /// in-progress delivery completes first and nothing goes out twice.
    pub async fn flush(&self) {
        let mut slot = self.drain_task.lock().await;
        if let Some(task) = slot.take() {
            task.abort();
            let _ = task.await;
        }
        drop(slot);

        let drained: Vec<Observation> = {
            let mut queue = self.queue.lock().unwrap();
            queue.drain(..).collect()
        };

        if drained.is_empty() {
            return;
        }

        debug!(count = drained.len(), "Flushing undelivered records");
        for record in drained {
            self.dispatcher.deliver_change(record);
        }
    }

    /// Drop everything still queued without delivering
    pub async fn stop(&self) {
        let mut slot = self.drain_task.lock().await;
        if let Some(task) = slot.take() {
            task.abort();
            let _ = task.await;
        }

        let discarded = {
            let mut queue = self.queue.lock().unwrap();
            let count = queue.len();
            queue.clear();
            count
        };

        if discarded > 0 {
            debug!(discarded, "Discarded pending deliveries");
        }
    }
}

/// Tick spacing for draining `batch` records over `window_secs`
///
/// ceil(batch / window) deliveries per second, at least one per second,
/// with ticks never tighter than one millisecond.
fn delivery_spacing(batch: usize, window_secs: u64) -> Duration {
    let window = window_secs.max(1);
    let per_second = ((batch as u64 + window - 1) / window).max(1);
    Duration::from_millis((1000 / per_second).max(1))
}
