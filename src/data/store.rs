//! UI-side view of query results.
//!
//! The worker owns the real cache; the store keeps what the UI has been
//! told so far: the last good data per query, the last error and whether a
//! fetch is in flight. A failed refetch keeps the previous data around.

use std::collections::HashMap;
use std::time::Instant;

use crate::gateway::{
    Alert, AstronautMonitoring, AstronautProfile, AstronautStatistics, CrewStatistics, CrewStatus,
    DashboardData, GatewayError, HistoryParams, ReportRange, ReportRecord, ReportSummary,
    SeedOutcome, TestResponse,
};
use crate::source::{QueryData, QueryKey};

/// Everything known about one query.
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    pub data: Option<QueryData>,
    pub error: Option<GatewayError>,
    pub loading: bool,
    pub updated_at: Option<Instant>,
}

/// Query states keyed by [`QueryKey`].
#[derive(Debug, Default)]
pub struct QueryStore {
    queries: HashMap<QueryKey, QueryState>,
}

impl QueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fetch as started.
    pub fn start(&mut self, key: QueryKey) {
        self.queries.entry(key).or_default().loading = true;
    }

    /// Store the outcome of a fetch.
    pub fn settle(&mut self, key: QueryKey, result: Result<QueryData, GatewayError>) {
        let state = self.queries.entry(key).or_default();
        state.loading = false;
        match result {
            Ok(data) => {
                state.data = Some(data);
                state.error = None;
                state.updated_at = Some(Instant::now());
            }
            Err(e) => state.error = Some(e),
        }
    }

    /// Take a copy served from the cache. Keeps the time of the last fetch.
    pub fn serve_cached(&mut self, key: QueryKey, data: QueryData) {
        let state = self.queries.entry(key).or_default();
        state.loading = false;
        state.data = Some(data);
        state.error = None;
        state.updated_at.get_or_insert_with(Instant::now);
    }

    pub fn state(&self, key: &QueryKey) -> Option<&QueryState> {
        self.queries.get(key)
    }

    pub fn error(&self, key: &QueryKey) -> Option<&GatewayError> {
        self.queries.get(key).and_then(|s| s.error.as_ref())
    }

    pub fn is_loading(&self, key: &QueryKey) -> bool {
        self.queries.get(key).is_some_and(|s| s.loading)
    }

    /// Whether any query is in flight.
    pub fn any_loading(&self) -> bool {
        self.queries.values().any(|s| s.loading)
    }

    fn data(&self, key: &QueryKey) -> Option<&QueryData> {
        self.queries.get(key).and_then(|s| s.data.as_ref())
    }

    pub fn crew_status(&self) -> Option<&CrewStatus> {
        match self.data(&QueryKey::CrewStatus)? {
            QueryData::CrewStatus(crew) => Some(crew),
            _ => None,
        }
    }

    pub fn dashboard(&self) -> Option<&DashboardData> {
        match self.data(&QueryKey::Dashboard)? {
            QueryData::Dashboard(dashboard) => Some(dashboard),
            _ => None,
        }
    }

    pub fn profiles(&self) -> Option<&[AstronautProfile]> {
        match self.data(&QueryKey::Profiles)? {
            QueryData::Profiles(profiles) => Some(profiles),
            _ => None,
        }
    }

    pub fn crew_statistics(&self) -> Option<&CrewStatistics> {
        match self.data(&QueryKey::CrewStatistics)? {
            QueryData::CrewStatistics(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn active_alerts(&self) -> Option<&[Alert]> {
        match self.data(&QueryKey::ActiveAlerts)? {
            QueryData::ActiveAlerts(alerts) => Some(alerts),
            _ => None,
        }
    }

    pub fn test_endpoint(&self) -> Option<&TestResponse> {
        match self.data(&QueryKey::TestEndpoint)? {
            QueryData::TestEndpoint(response) => Some(response),
            _ => None,
        }
    }

    pub fn seed_status(&self) -> Option<&SeedOutcome> {
        match self.data(&QueryKey::SeedStatus)? {
            QueryData::SeedStatus(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn astronaut_status(&self, astronaut_id: &str) -> Option<&AstronautMonitoring> {
        match self.data(&QueryKey::AstronautStatus(astronaut_id.to_string()))? {
            QueryData::AstronautStatus(status) => Some(status),
            _ => None,
        }
    }

    pub fn astronaut_statistics(&self, astronaut_id: &str) -> Option<&AstronautStatistics> {
        match self.data(&QueryKey::AstronautStatistics(astronaut_id.to_string()))? {
            QueryData::AstronautStatistics(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn history(&self, astronaut_id: &str, params: &HistoryParams) -> Option<&[AstronautMonitoring]> {
        let key = QueryKey::History {
            astronaut_id: astronaut_id.to_string(),
            params: params.clone(),
        };
        match self.data(&key)? {
            QueryData::History(records) => Some(records),
            _ => None,
        }
    }

    pub fn report_data(&self, range: &ReportRange) -> Option<&[ReportRecord]> {
        match self.data(&QueryKey::ReportData(*range))? {
            QueryData::ReportData(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn report_summary(&self, range: &ReportRange) -> Option<&ReportSummary> {
        match self.data(&QueryKey::ReportSummary(*range))? {
            QueryData::ReportSummary(summary) => Some(summary),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_keeps_stale_data_on_error() {
        let mut store = QueryStore::new();
        store.start(QueryKey::CrewStatus);
        assert!(store.is_loading(&QueryKey::CrewStatus));

        let crew = CrewStatus {
            total_members: 3,
            ..CrewStatus::default()
        };
        store.settle(QueryKey::CrewStatus, Ok(QueryData::CrewStatus(crew)));
        assert!(!store.any_loading());
        assert_eq!(store.crew_status().unwrap().total_members, 3);

        store.start(QueryKey::CrewStatus);
        store.settle(QueryKey::CrewStatus, Err(GatewayError::Timeout));
        assert_eq!(store.crew_status().unwrap().total_members, 3);
        assert!(matches!(
            store.error(&QueryKey::CrewStatus),
            Some(GatewayError::Timeout)
        ));
    }

    #[test]
    fn test_success_clears_error() {
        let mut store = QueryStore::new();
        store.settle(QueryKey::Profiles, Err(GatewayError::Timeout));
        assert!(store.profiles().is_none());

        store.settle(QueryKey::Profiles, Ok(QueryData::Profiles(Vec::new())));
        assert!(store.error(&QueryKey::Profiles).is_none());
        assert_eq!(store.profiles().map(|p| p.len()), Some(0));
    }

    #[test]
    fn test_cached_copy_keeps_fetch_time() {
        let mut store = QueryStore::new();
        store.serve_cached(QueryKey::Profiles, QueryData::Profiles(Vec::new()));
        let first = store.state(&QueryKey::Profiles).and_then(|s| s.updated_at);
        assert!(first.is_some());

        store.start(QueryKey::Profiles);
        store.serve_cached(QueryKey::Profiles, QueryData::Profiles(Vec::new()));
        let state = store.state(&QueryKey::Profiles).unwrap();
        assert!(!state.loading);
        assert_eq!(state.updated_at, first);
    }

    #[test]
    fn test_scoped_getters() {
        let mut store = QueryStore::new();
        let params = HistoryParams::latest(20);
        store.settle(
            QueryKey::History {
                astronaut_id: "a1".to_string(),
                params: params.clone(),
            },
            Ok(QueryData::History(vec![AstronautMonitoring::default()])),
        );

        assert_eq!(store.history("a1", &params).map(|h| h.len()), Some(1));
        assert!(store.history("a2", &params).is_none());
        assert!(store.history("a1", &HistoryParams::latest(5)).is_none());
    }
}
