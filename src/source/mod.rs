// Upstream feed contract

use crate::record::{Location, Observation};
use anyhow::Result;
use async_trait::async_trait;

/// Metadata returned by a source's opening handshake
#[derive(Debug, Clone)]
pub struct FeedInfo {
    /// Display name of the feed
    pub title: String,

    /// Center of the feed's coverage area, if the source reports one
    pub location: Option<Location>,
}

/// Feed source interface for external snapshot feeds.
///
/// A source owns the transport to one upstream feed: `open` performs the
/// initial handshake and returns feed metadata, `fetch_snapshot` returns
/// the complete current state of every entity the feed reports.
///
/// Sources are stateless between calls - polling cadence, reconciliation,
/// and delivery all live in the engine.
///
/// # Example
/// ```no_run
/// use cadence::{FeedInfo, FeedSource, Observation};
/// use anyhow::Result;
/// use async_trait::async_trait;
///
/// struct StaticSource;
///
/// #[async_trait]
/// impl FeedSource for StaticSource {
///     fn name(&self) -> &str {
///         "static"
///     }
///
///     async fn open(&self) -> Result<FeedInfo> {
///         Ok(FeedInfo {
///             title: "Static Feed".to_string(),
///             location: None,
///         })
///     }
///
///     async fn fetch_snapshot(&self) -> Result<Vec<Observation>> {
///         // Fetch the full entity list from the upstream feed
///         Ok(vec![])
///     }
/// }
/// ```
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Short identifier for logging (e.g. "citybikes")
    fn name(&self) -> &str;

    /// Validate the feed and fetch its metadata.
    ///
    /// Called once per connect, before polling starts. An error here
    /// fails the connect and leaves the feed disconnected.
    async fn open(&self) -> Result<FeedInfo>;

    /// Fetch the full current snapshot.
    ///
    /// Errors are per-cycle: the engine logs the failure, leaves all
    /// state untouched, and waits for the next scheduled poll.
    async fn fetch_snapshot(&self) -> Result<Vec<Observation>>;
}
