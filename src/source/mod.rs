//! Data source abstraction between the UI loop and the gateway.
//!
//! The UI never awaits network calls. It sends [`Request`]s to a source and
//! drains [`Update`]s once per tick. [`GatewaySource`] backs this with a
//! polling worker that owns the HTTP client and the [`QueryCache`];
//! [`ChannelSource`] lets tests and embedders push updates by hand.

mod cache;
mod channel;
mod gateway;

pub use cache::{QueryCache, QueryData, QueryKey, Tag, TagKind};
pub use channel::{ChannelHandle, ChannelSource};
pub use gateway::GatewaySource;

use std::fmt::Debug;

use crate::gateway::{GatewayError, SeedKind, SeedOutcome};

/// Something the UI asks the data layer to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Serve from cache when present, otherwise fetch.
    Query(QueryKey),
    /// Fetch even when cached.
    Refetch(QueryKey),
    /// Refetch every cached query plus the crew status.
    RefreshAll,
    /// Run a seed mutation, then invalidate its tags.
    RunSeed(SeedKind),
    /// Enable or disable the polling timer.
    SetAutoRefresh(bool),
}

/// Something the data layer reports back to the UI.
#[derive(Debug, Clone)]
pub enum Update {
    /// A fetch for this key has started.
    Loading(QueryKey),
    /// A query settled after a gateway round trip.
    Query {
        key: QueryKey,
        result: Result<QueryData, GatewayError>,
    },
    /// A query was answered from the cache. Carries no new observation.
    Cached { key: QueryKey, data: QueryData },
    /// A seed mutation settled.
    Seed {
        kind: SeedKind,
        result: Result<SeedOutcome, GatewayError>,
    },
}

/// Trait for exchanging requests and updates with a data backend.
///
/// # Example
///
/// ```
/// use crewwatch::{ChannelSource, DataSource, QueryKey, Request};
///
/// let (mut handle, mut source) = ChannelSource::create("test");
/// source.request(Request::Query(QueryKey::CrewStatus));
/// assert_eq!(handle.drain_requests(), vec![Request::Query(QueryKey::CrewStatus)]);
/// assert!(source.poll().is_none());
/// ```
pub trait DataSource: Send + Debug {
    /// Take the next pending update without blocking.
    fn poll(&mut self) -> Option<Update>;

    /// Queue a request. Never blocks.
    fn request(&mut self, request: Request);

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message if the source itself has failed.
    fn error(&self) -> Option<&str>;
}
