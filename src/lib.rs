//! Cadence - snapshot reconciliation and paced delivery for polled feeds.
//!
//! Cadence sits between a feed that only serves full snapshots and
//! consumers that want a steady stream of changes. Each poll cycle is
//! diffed against the previous one; first sightings go out immediately
//! and changes can be spread evenly across the poll window instead of
//! arriving as one burst per poll.
//!
//! # Architecture
//!
//! ```text
//! External feed (full snapshots)
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Feed Poller                        │
//! │  - Fetch snapshot on a fixed interval    │
//! │  - Abandon the cycle on fetch failure    │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Delta Engine + Snapshot Store      │
//! │  - Classify new / changed / unchanged    │
//! │  - Compute signed change magnitudes      │
//! │  - Track running inventory totals        │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Pacing Scheduler                   │
//! │  - Spread changes across the poll window │
//! │  - Flush leftovers before the next cycle │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Dispatcher                         │
//! │  - Broadcast channel per record kind     │
//! │  - Watched-entity routing                │
//! └─────────────────────────────────────────┘
//!          ↓
//!   Consumers (one broadcast receiver each)
//! ```
//!
//! # Core Types
//!
//! - [`Feed`] - Connection lifecycle around a [`FeedSource`]
//! - [`FeedSource`] - Trait a feed adapter implements
//! - [`Observation`] - One entity as seen in a snapshot
//! - [`FeedConfig`] - Poll interval, delivery mode, gauge roles

// Feed configuration and validation
pub mod config;

// Snapshot diffing
pub mod delta;

// Broadcast delivery channels
pub mod dispatch;

// Running inventory totals
pub mod inventory;

// Paced delivery of change records
pub mod pacing;

// Fixed-interval poll loop
pub mod poller;

// Observation record model
pub mod record;

// Connection lifecycle
pub mod session;

// Feed source trait
pub mod source;

// Per-session snapshot store
pub mod store;

// Watched-entity table
pub mod subscription;

// Re-export public types
pub use config::{load_config, ConfigError, FeedConfig};
pub use delta::{CycleOutcome, DeltaEngine};
pub use dispatch::Dispatcher;
pub use inventory::{InventorySnapshot, InventoryTracker};
pub use pacing::Pacer;
pub use poller::{FeedPoller, PollerStatus};
pub use record::{Location, Observation};
pub use session::{ConnectionState, Feed};
pub use source::{FeedInfo, FeedSource};
pub use store::SnapshotStore;
pub use subscription::SubscriptionTable;
