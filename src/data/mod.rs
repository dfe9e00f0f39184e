//! State derived from gateway data on the UI side.
//!
//! ## Submodules
//!
//! - [`detector`]: Crew status change detection and the alert modal
//! - [`duration`]: Parsing of interval strings (e.g., "60s", "500ms") and elapsed labels
//! - [`history`]: Per-astronaut state timeline for the monitoring strip
//! - [`store`]: Last known data, error and loading flag per query
//!
//! ## Data Flow
//!
//! ```text
//! Update::Query (fresh fetch)          Update::Cached (cache hit)
//!        │                                     │
//!        ▼                                     ▼
//! QueryStore::settle()                 QueryStore::serve_cached()
//!        │
//!        └──▶ CrewStatus ──▶ StatusDetector::observe() ──▶ AlertModal + Notifier
//!                        └──▶ History::record() (timeline strip)
//! ```

pub mod detector;
pub mod duration;
pub mod history;
pub mod store;

pub use detector::{AlertKind, AlertModal, CrewAlert, StatusDetector};
pub use history::History;
pub use store::{QueryState, QueryStore};
