//! Client-side query cache with tag-based invalidation.
//!
//! Every query result is stored under its [`QueryKey`]. Keys provide tags;
//! mutations invalidate tag kinds, which drops every cached entry providing
//! a tag of that kind regardless of its id.

use std::collections::HashMap;
use std::time::Instant;

use crate::gateway::{
    Alert, AstronautMonitoring, AstronautProfile, AstronautStatistics, CrewStatistics, CrewStatus,
    DashboardData, HistoryParams, ReportRange, ReportRecord, ReportSummary, SeedKind, SeedOutcome,
    TestResponse,
};

/// The kind of a cache tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    AstronautProfile,
    AstronautMonitoring,
    AstronautStatus,
    AstronautStatistics,
    CrewStatus,
    CrewStatistics,
    Dashboard,
    Alert,
    History,
    Report,
    Test,
}

/// A cache label, optionally scoped to one astronaut.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub kind: TagKind,
    pub id: Option<String>,
}

impl Tag {
    fn kind(kind: TagKind) -> Self {
        Self { kind, id: None }
    }

    fn scoped(kind: TagKind, id: &str) -> Self {
        Self {
            kind,
            id: Some(id.to_string()),
        }
    }
}

/// Identifies one cached query, including its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Profiles,
    Dashboard,
    CrewStatistics,
    CrewStatus,
    ActiveAlerts,
    TestEndpoint,
    SeedStatus,
    AstronautStatus(String),
    AstronautStatistics(String),
    History {
        astronaut_id: String,
        params: HistoryParams,
    },
    ReportData(ReportRange),
    ReportSummary(ReportRange),
}

impl QueryKey {
    /// Tags provided by this query.
    pub fn tags(&self) -> Vec<Tag> {
        match self {
            QueryKey::Profiles => vec![Tag::kind(TagKind::AstronautProfile)],
            QueryKey::Dashboard => vec![Tag::kind(TagKind::Dashboard)],
            QueryKey::CrewStatistics => vec![Tag::kind(TagKind::CrewStatistics)],
            QueryKey::CrewStatus => vec![Tag::kind(TagKind::CrewStatus)],
            QueryKey::ActiveAlerts => vec![Tag::kind(TagKind::Alert)],
            QueryKey::TestEndpoint | QueryKey::SeedStatus => vec![Tag::kind(TagKind::Test)],
            QueryKey::AstronautStatus(id) => vec![Tag::scoped(TagKind::AstronautStatus, id)],
            QueryKey::AstronautStatistics(id) => {
                vec![Tag::scoped(TagKind::AstronautStatistics, id)]
            }
            QueryKey::History { astronaut_id, .. } => {
                vec![Tag::scoped(TagKind::History, astronaut_id)]
            }
            QueryKey::ReportData(_) | QueryKey::ReportSummary(_) => {
                vec![Tag::kind(TagKind::Report)]
            }
        }
    }

    /// Whether any tag of this key has one of the given kinds.
    pub fn provides_any(&self, kinds: &[TagKind]) -> bool {
        self.tags().iter().any(|tag| kinds.contains(&tag.kind))
    }

    /// Short label for logs and the status bar.
    pub fn label(&self) -> String {
        match self {
            QueryKey::Profiles => "profiles".to_string(),
            QueryKey::Dashboard => "dashboard".to_string(),
            QueryKey::CrewStatistics => "crew statistics".to_string(),
            QueryKey::CrewStatus => "crew status".to_string(),
            QueryKey::ActiveAlerts => "active alerts".to_string(),
            QueryKey::TestEndpoint => "test endpoint".to_string(),
            QueryKey::SeedStatus => "seed status".to_string(),
            QueryKey::AstronautStatus(id) => format!("status {}", id),
            QueryKey::AstronautStatistics(id) => format!("statistics {}", id),
            QueryKey::History { astronaut_id, .. } => format!("history {}", astronaut_id),
            QueryKey::ReportData(range) => format!("report data {}", range),
            QueryKey::ReportSummary(range) => format!("report summary {}", range),
        }
    }
}

impl SeedKind {
    /// Tag kinds invalidated once this seed settles.
    pub fn invalidates(&self) -> &'static [TagKind] {
        match self {
            SeedKind::All => &[
                TagKind::AstronautProfile,
                TagKind::AstronautMonitoring,
                TagKind::CrewStatus,
            ],
            SeedKind::Profiles => &[TagKind::AstronautProfile],
            SeedKind::Monitoring => &[TagKind::AstronautMonitoring, TagKind::CrewStatus],
        }
    }
}

/// A decoded query result.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Profiles(Vec<AstronautProfile>),
    Dashboard(Box<DashboardData>),
    CrewStatistics(Box<CrewStatistics>),
    CrewStatus(CrewStatus),
    ActiveAlerts(Vec<Alert>),
    TestEndpoint(TestResponse),
    SeedStatus(SeedOutcome),
    AstronautStatus(Box<AstronautMonitoring>),
    AstronautStatistics(Box<AstronautStatistics>),
    History(Vec<AstronautMonitoring>),
    ReportData(Vec<ReportRecord>),
    ReportSummary(Box<ReportSummary>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: QueryData,
    fetched_at: Instant,
}

/// Query results keyed by [`QueryKey`].
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&QueryData> {
        self.entries.get(key).map(|entry| &entry.data)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// When the entry for `key` was last stored.
    pub fn fetched_at(&self, key: &QueryKey) -> Option<Instant> {
        self.entries.get(key).map(|entry| entry.fetched_at)
    }

    pub fn insert(&mut self, key: QueryKey, data: QueryData) {
        self.entries.insert(
            key,
            CacheEntry {
                data,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop every entry providing a tag of one of `kinds`.
    ///
    /// Returns the removed keys so the caller can refetch them.
    pub fn invalidate(&mut self, kinds: &[TagKind]) -> Vec<QueryKey> {
        let removed: Vec<QueryKey> = self
            .entries
            .keys()
            .filter(|key| key.provides_any(kinds))
            .cloned()
            .collect();
        for key in &removed {
            self.entries.remove(key);
        }
        removed
    }

    pub fn keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_cache() -> QueryCache {
        let mut cache = QueryCache::new();
        cache.insert(QueryKey::Profiles, QueryData::Profiles(Vec::new()));
        cache.insert(QueryKey::CrewStatus, QueryData::CrewStatus(CrewStatus::default()));
        cache.insert(
            QueryKey::Dashboard,
            QueryData::Dashboard(Box::default()),
        );
        cache.insert(
            QueryKey::AstronautStatistics("a1".to_string()),
            QueryData::AstronautStatistics(Box::default()),
        );
        cache.insert(
            QueryKey::History {
                astronaut_id: "a1".to_string(),
                params: HistoryParams::latest(20),
            },
            QueryData::History(Vec::new()),
        );
        cache
    }

    #[test]
    fn test_profile_seed_invalidates_profiles_only() {
        let mut cache = filled_cache();
        let removed = cache.invalidate(SeedKind::Profiles.invalidates());
        assert_eq!(removed, vec![QueryKey::Profiles]);
        assert!(!cache.contains(&QueryKey::Profiles));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_run_all_invalidates_profiles_and_crew_status() {
        let mut cache = filled_cache();
        let mut removed = cache.invalidate(SeedKind::All.invalidates());
        removed.sort_by_key(|key| key.label());
        assert_eq!(removed, vec![QueryKey::CrewStatus, QueryKey::Profiles]);
        assert!(cache.contains(&QueryKey::Dashboard));
    }

    #[test]
    fn test_scoped_tags_match_by_kind() {
        let mut cache = filled_cache();
        cache.insert(
            QueryKey::AstronautStatistics("a2".to_string()),
            QueryData::AstronautStatistics(Box::default()),
        );

        let removed = cache.invalidate(&[TagKind::AstronautStatistics]);
        assert_eq!(removed.len(), 2);
        assert!(!cache.contains(&QueryKey::AstronautStatistics("a1".to_string())));
        assert!(!cache.contains(&QueryKey::AstronautStatistics("a2".to_string())));
    }

    #[test]
    fn test_invalidate_unmatched_kind_keeps_everything() {
        let mut cache = filled_cache();
        assert!(cache.invalidate(&[TagKind::Report]).is_empty());
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_key_tags() {
        assert_eq!(
            QueryKey::AstronautStatus("a3".to_string()).tags(),
            vec![Tag {
                kind: TagKind::AstronautStatus,
                id: Some("a3".to_string())
            }]
        );
        assert!(QueryKey::SeedStatus.provides_any(&[TagKind::Test]));
        assert!(!QueryKey::SeedStatus.provides_any(&[TagKind::CrewStatus]));
    }
}
