//! Fixed-interval poll loop.
//!
//! Each session gets its own poller that fetches a snapshot on an
//! interval, reconciles it against the store, and hands the results to
//! the dispatcher (directly or through the pacer).

use crate::config::FeedConfig;
use crate::delta::DeltaEngine;
use crate::dispatch::Dispatcher;
use crate::pacing::Pacer;
use crate::source::FeedSource;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Per-session polling loop.
///
/// Manages the reconciliation cycle for a single session:
/// - Fetches a full snapshot on a fixed interval (first fetch immediately)
/// - Flushes the pacer's leftovers before each diff
/// - Hands new entities to the dispatcher and changes to the pacer
/// - A failed fetch abandons the cycle; the next tick is the only retry
/// - Tracks status (last poll, errors)
pub struct FeedPoller {
    /// Upstream feed
    source: Arc<dyn FeedSource>,
    /// Reconciliation engine bound to this session's store
    delta: DeltaEngine,
    /// Paced delivery queue for change records
    pacer: Arc<Pacer>,
    /// Delivery fan-out
    dispatcher: Arc<Dispatcher>,
    /// Poll interval and delivery mode
    config: FeedConfig,
    /// Set on disconnect; a cycle finishing after this is discarded
    shutdown: Arc<AtomicBool>,
    /// Status tracking
    status: Arc<tokio::sync::Mutex<PollerStatus>>,
}

/// Status information for a polling session.
#[derive(Clone, Debug)]
pub struct PollerStatus {
    /// Last successful poll timestamp
    pub last_poll: Option<DateTime<Utc>>,
    /// Last error message (if any)
    pub last_error: Option<String>,
    /// Total number of successful polls
    pub poll_count: u64,
    /// Total number of errors
    pub error_count: u64,
}

impl Default for PollerStatus {
    fn default() -> Self {
        Self {
            last_poll: None,
            last_error: None,
            poll_count: 0,
            error_count: 0,
        }
    }
}

impl FeedPoller {
    pub fn new(
        source: Arc<dyn FeedSource>,
        delta: DeltaEngine,
        pacer: Arc<Pacer>,
        dispatcher: Arc<Dispatcher>,
        config: FeedConfig,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            delta,
            pacer,
            dispatcher,
            config,
            shutdown,
            status: Arc::new(tokio::sync::Mutex::new(PollerStatus::default())),
        }
    }

    /// Returns a clone of the status tracker for external monitoring.
    pub fn status(&self) -> Arc<tokio::sync::Mutex<PollerStatus>> {
        Arc::clone(&self.status)
    }

    /// Starts the polling loop (non-blocking).
    ///
    /// Spawns a background task that polls the feed on schedule.
    /// Returns a JoinHandle that can be used for graceful shutdown.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        let source_name = self.source.name().to_string();
        let poll_interval_secs = self.config.poll_interval_secs;

        tokio::spawn(async move {
            info!(
                source = %source_name,
                interval_secs = poll_interval_secs,
                paced = self.config.paced_delivery,
                "Starting feed poller"
            );

            let mut ticker = interval(Duration::from_secs(poll_interval_secs));
            // An overrunning cycle skips the ticks it missed rather than
            // bursting to catch up; at most one cycle is ever in flight
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let poller = self;

            loop {
                // The first tick fires immediately: the initial fetch
                // happens at connect time, not one interval later
                ticker.tick().await;

                if poller.shutdown.load(Ordering::SeqCst) {
                    break;
                }

                debug!(source = %source_name, "Polling feed");
                poller.poll_once().await;
            }

            info!(source = %source_name, "Feed poller stopped");
        })
    }

    /// Runs one reconciliation cycle and records the outcome in status.
    ///
    /// A cycle discarded by shutdown touches neither counter.
    pub(crate) async fn poll_once(&self) {
        match self.run_cycle().await {
            Err(e) => {
                error!(
                    source = %self.source.name(),
                    error = %e,
                    "Poll cycle failed, keeping previous snapshot until next tick"
                );

                // Update status with error
                let mut status = self.status.lock().await;
                status.last_error = Some(e.to_string());
                status.error_count += 1;
            }
            Ok(true) => {
                // Update status on success
                let mut status = self.status.lock().await;
                status.last_poll = Some(Utc::now());
                status.last_error = None;
                status.poll_count += 1;
            }
            Ok(false) => {}
        }
    }

    /// Fetches one snapshot, reconciles it, and delivers the results.
    ///
    /// Returns `Ok(false)` when the cycle was discarded because the
    /// session shut down mid-fetch.
    async fn run_cycle(&self) -> Result<bool> {
        // 1. Fetch the full snapshot. On failure the cycle ends here:
        //    the store and the pacing queue keep their previous contents.
        let snapshot = self
            .source
            .fetch_snapshot()
            .await
            .context("Failed to fetch snapshot")?;

        // A disconnect that landed mid-fetch wins; drop the stale result
        if self.shutdown.load(Ordering::SeqCst) {
            return Ok(false);
        }

        // 2. Deliver what the previous cycle left in the pacing queue,
        //    in order, before this cycle's records exist
        self.pacer.flush().await;

        // 3. Diff the snapshot against the stored state
        let outcome = self.delta.reconcile(snapshot);

        info!(
            source = %self.source.name(),
            new = outcome.new_entities.len(),
            changed = outcome.changes.len(),
            net_change = outcome.net_change,
            "Poll cycle reconciled"
        );

        // 4. First sightings go out immediately, never paced
        for record in outcome.new_entities {
            self.dispatcher.deliver_new_entity(record);
        }

        // 5. Change records: paced across the window, or delivered inline
        if self.config.paced_delivery {
            self.pacer
                .schedule(outcome.changes, self.config.poll_interval_secs)
                .await;
        } else {
            for record in outcome.changes {
                self.dispatcher.deliver_change(record);
            }
        }

        Ok(true)
    }
}
