//! # crewwatch
//!
//! A terminal dashboard for monitoring astronaut crew state through a
//! monitoring REST gateway.
//!
//! The crate polls the gateway for crew status, astronaut profiles,
//! statistics, alerts and reports, caches the results by query, and raises
//! an alert modal with an audible cue whenever a crew member degrades into
//! a stressed or critical state.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(detector,│    │(render) │    │         │ │
//! │  └────┬────┘    │  store)  │    └─────────┘    └─────────┘ │
//! │       │         └────┬─────┘                               │
//! │       ▼              ▼                                     │
//! │  ┌─────────┐    ┌──────────┐                               │
//! │  │ source  │    │  notify  │── bell | tone | silent        │
//! │  │ (cache) │    └──────────┘                               │
//! │  └────┬────┘                                               │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ gateway │── REST (reqwest)                              │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`gateway`]**: Typed REST client and the gateway's JSON models
//! - **[`source`]**: Data access layer ([`DataSource`] trait) with a tag-invalidated
//!   query cache, a polling worker ([`GatewaySource`]) and a channel source for tests
//! - **[`data`]**: Crew status change detection, per-query UI state and state timelines
//! - **[`notify`]**: Audible alert cues
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`config`]** / **[`logging`]**: Layered settings and tracing setup
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the default gateway (http://localhost:5000)
//! crewwatch
//!
//! # Another gateway, polling every 15 seconds, logging to a file
//! crewwatch --gateway http://station:5000 --refresh 15s --log-file crewwatch.log
//!
//! # One-shot JSON export
//! crewwatch --export crew.json
//! ```
//!
//! ### As a library with the gateway source
//!
//! ```no_run
//! use std::time::Duration;
//! use crewwatch::{App, GatewaySource};
//! use crewwatch::gateway::GatewayClient;
//! use crewwatch::notify::BellNotifier;
//!
//! # tokio_test::block_on(async {
//! let client = GatewayClient::builder()
//!     .endpoint("http://localhost:5000")
//!     .build()
//!     .unwrap();
//! let source = GatewaySource::spawn(client, Duration::from_secs(60));
//! let app = App::new(Box::new(source), Box::new(BellNotifier), true);
//! # });
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use crewwatch::{ChannelSource, DataSource, QueryKey, Request};
//!
//! let (mut handle, mut source) = ChannelSource::create("replay");
//! source.request(Request::Query(QueryKey::CrewStatus));
//! assert_eq!(handle.drain_requests(), vec![Request::Query(QueryKey::CrewStatus)]);
//! assert!(source.poll().is_none());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod gateway;
pub mod logging;
pub mod notify;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use data::{AlertKind, AlertModal, StatusDetector};
pub use source::{
    ChannelHandle, ChannelSource, DataSource, GatewaySource, QueryData, QueryKey, Request, Update,
};
