//! Feed connection lifecycle.
//!
//! A `Feed` owns everything that outlives a connection (subscriptions,
//! inventory, delivery channels) and creates per-session state on
//! connect: a fresh store, pacer, and poller. Disconnect tears the
//! session down and clears the per-session state, so a reconnect sees
//! the whole feed as new again.


use crate::config::{ConfigError, FeedConfig};
use crate::delta::DeltaEngine;
use crate::dispatch::Dispatcher;
use crate::inventory::{InventorySnapshot, InventoryTracker};
use crate::pacing::Pacer;
use crate::poller::{FeedPoller, PollerStatus};
use crate::record::Observation;
use crate::source::{FeedInfo, FeedSource};
use crate::store::SnapshotStore;
use crate::subscription::SubscriptionTable;
use anyhow::Result;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

/// Connection state of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// State created on connect and discarded on disconnect.
struct Session {
    id: Uuid,
    store: Arc<SnapshotStore>,
    pacer: Arc<Pacer>,
    poller_handle: tokio::task::JoinHandle<()>,
    poller_shutdown: Arc<AtomicBool>,
    status: Arc<tokio::sync::Mutex<PollerStatus>>,
}

/// A feed and its connection lifecycle.
///
/// Subscriptions and delivery channels live here and survive
/// disconnects; the snapshot store, pacer, and poller belong to the
/// session and are rebuilt on every connect.
pub struct Feed {
    source: Arc<dyn FeedSource>,
    config: FeedConfig,
    subscriptions: Arc<SubscriptionTable>,
    inventory: Arc<InventoryTracker>,
    dispatcher: Arc<Dispatcher>,
    state: RwLock<ConnectionState>,
    state_tx: broadcast::Sender<ConnectionState>,
    session: tokio::sync::Mutex<Option<Session>>,
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Feed {
    /// Creates a disconnected feed. Fails if the configuration is invalid.
    pub fn new(source: Arc<dyn FeedSource>, config: FeedConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let subscriptions = Arc::new(SubscriptionTable::new());
        let (state_tx, _) = broadcast::channel(16);

        Ok(Self {
            source,
            config,
            subscriptions: Arc::clone(&subscriptions),
            inventory: Arc::new(InventoryTracker::new()),
            dispatcher: Arc::new(Dispatcher::new(subscriptions)),
            state: RwLock::new(ConnectionState::Disconnected),
            state_tx,
            session: tokio::sync::Mutex::new(None),
        })
    }

    /// Opens the feed and starts polling.
    ///
    /// Rejects the call if a session is already active. On handshake
    /// failure the feed returns to `Disconnected` and no session is
    /// created.
    pub async fn connect(&self) -> Result<FeedInfo> {
        let mut slot = self.session.lock().await;
        if slot.is_some() {
            anyhow::bail!("feed is already connected");
        }

        self.set_state(ConnectionState::Connecting);
        info!(source = %self.source.name(), "Connecting feed");

        let feed_info = match self.source.open().await {
            Ok(info) => info,
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                return Err(e.context("Feed handshake failed"));
            }
        };

        // Fresh per-session state; nothing carries over from a previous run
        let id = Uuid::new_v4();
        let store = Arc::new(SnapshotStore::new());
        let pacer = Arc::new(Pacer::new(Arc::clone(&self.dispatcher)));
        let shutdown = Arc::new(AtomicBool::new(false));

        let delta = DeltaEngine::new(
            Arc::clone(&store),
            Arc::clone(&self.inventory),
            &self.config,
        );
        let poller = FeedPoller::new(
            Arc::clone(&self.source),
            delta,
            Arc::clone(&pacer),
            Arc::clone(&self.dispatcher),
            self.config.clone(),
            Arc::clone(&shutdown),
        );
        let status = poller.status();
        let poller_handle = poller.start();

        *slot = Some(Session {
            id,
            store,
            pacer,
            poller_handle,
            poller_shutdown: shutdown,
            status,
        });

        self.set_state(ConnectionState::Connected);
        info!(
            source = %self.source.name(),
            session_id = %id,
            title = %feed_info.title,
            "Feed connected"
        );

        Ok(feed_info)
    }

    /// Stops polling and discards all per-session state.
    ///
    /// Safe to call at any time; does nothing when already disconnected.
    pub async fn disconnect(&self) {
        let mut slot = self.session.lock().await;
        let session = match slot.take() {
            Some(session) => session,
            None => return,
        };

        info!(
            source = %self.source.name(),
            session_id = %session.id,
            "Disconnecting feed"
        );

        // Stop the poller first so no in-flight cycle repopulates
        // state during teardown
        session.poller_shutdown.store(true, Ordering::SeqCst);
        session.poller_handle.abort();
        let _ = session.poller_handle.await;

        // Pending paced deliveries are discarded, never delivered late
        session.pacer.stop().await;

        session.store.clear();
        self.inventory.reset();

        self.set_state(ConnectionState::Disconnected);
        info!(source = %self.source.name(), "Feed disconnected");
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write().unwrap() = state;
        let _ = self.state_tx.send(state);
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state.read().unwrap()
    }

    pub fn subscribe_connection_state(&self) -> broadcast::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<Observation> {
        self.dispatcher.subscribe_changes()
    }

    pub fn subscribe_new_entities(&self) -> broadcast::Receiver<Observation> {
        self.dispatcher.subscribe_new_entities()
    }

    pub fn subscribe_watched(&self) -> broadcast::Receiver<Observation> {
        self.dispatcher.subscribe_watched()
    }

    /// Marks an entity for the watched channel. Survives disconnects.
    pub fn watch(&self, id: &str) -> bool {
        self.subscriptions.watch(id)
    }

    pub fn unwatch(&self, id: &str) -> bool {
        self.subscriptions.unwatch(id)
    }

    /// Flips the watch flag and returns the new value.
    pub fn toggle_watch(&self, id: &str) -> bool {
        self.subscriptions.toggle(id)
    }

    pub fn is_watched(&self, id: &str) -> bool {
        self.subscriptions.is_watched(id)
    }

    pub fn watched_ids(&self) -> Vec<String> {
        self.subscriptions.watched_ids()
    }

    /// Current inventory totals.
    pub fn inventory(&self) -> InventorySnapshot {
        self.inventory.snapshot()
    }

    /// Poll status for the active session, `None` when disconnected.
    pub async fn poll_status(&self) -> Option<PollerStatus> {
        let slot = self.session.lock().await;
        match slot.as_ref() {
            Some(session) => Some(session.status.lock().await.clone()),
            None => None,
        }
    }

    /// Number of entities in the active session's store.
    pub async fn entity_count(&self) -> usize {
        let slot = self.session.lock().await;
        match slot.as_ref() {
            Some(session) => session.store.len(),
            None => 0,
        }
    }
}
