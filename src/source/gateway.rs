//! Polling worker backed by the gateway client.
//!
//! A single tokio task owns the [`GatewayClient`], the [`QueryCache`] and the
//! refresh timer. The UI talks to it through unbounded channels, so neither
//! side ever blocks the other. Dropping the [`GatewaySource`] aborts the task.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{DataSource, QueryCache, QueryData, QueryKey, Request, Update};
use crate::gateway::{GatewayClient, GatewayError, SeedKind};

/// A data source that polls the gateway from a background task.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use crewwatch::{DataSource, GatewaySource, QueryKey, Request};
/// use crewwatch::gateway::GatewayClient;
///
/// # tokio_test::block_on(async {
/// let client = GatewayClient::builder().build().unwrap();
/// let mut source = GatewaySource::spawn(client, Duration::from_secs(60));
/// source.request(Request::Query(QueryKey::CrewStatus));
/// # });
/// ```
#[derive(Debug)]
pub struct GatewaySource {
    requests: mpsc::UnboundedSender<Request>,
    updates: mpsc::UnboundedReceiver<Update>,
    description: String,
    stopped: bool,
    worker: JoinHandle<()>,
}

impl GatewaySource {
    /// Spawn the polling worker on the current runtime.
    pub fn spawn(client: GatewayClient, refresh: Duration) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let description = format!("gateway: {}", client.endpoint());

        let worker = Worker::new(client, update_tx);
        let worker = tokio::spawn(worker.run(request_rx, refresh));

        Self {
            requests: request_tx,
            updates: update_rx,
            description,
            stopped: false,
            worker,
        }
    }
}

impl Drop for GatewaySource {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

impl DataSource for GatewaySource {
    fn poll(&mut self) -> Option<Update> {
        match self.updates.try_recv() {
            Ok(update) => Some(update),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.stopped = true;
                None
            }
        }
    }

    fn request(&mut self, request: Request) {
        if self.requests.send(request).is_err() {
            self.stopped = true;
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.stopped.then_some("Polling worker stopped")
    }
}

/// State owned by the polling task.
struct Worker {
    client: GatewayClient,
    cache: QueryCache,
    updates: mpsc::UnboundedSender<Update>,
    auto_refresh: bool,
}

impl Worker {
    fn new(client: GatewayClient, updates: mpsc::UnboundedSender<Update>) -> Self {
        Self {
            client,
            cache: QueryCache::new(),
            updates,
            auto_refresh: true,
        }
    }

    async fn run(mut self, mut requests: mpsc::UnboundedReceiver<Request>, refresh: Duration) {
        let mut ticker = time::interval_at(Instant::now() + refresh, refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(?refresh, "polling worker started");

        loop {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(request) => self.handle(request).await,
                    None => break,
                },
                _ = ticker.tick() => {
                    if self.auto_refresh {
                        self.poll_tick().await;
                    }
                }
            }
        }

        debug!("polling worker stopped");
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::Query(key) => self.query(key).await,
            Request::Refetch(key) => self.refetch(key).await,
            Request::RefreshAll => {
                let mut keys = self.cached_keys();
                if !keys.contains(&QueryKey::CrewStatus) {
                    keys.push(QueryKey::CrewStatus);
                }
                for key in keys {
                    self.refetch(key).await;
                }
            }
            Request::RunSeed(kind) => self.run_seed(kind).await,
            Request::SetAutoRefresh(enabled) => {
                info!(enabled, "auto refresh toggled");
                self.auto_refresh = enabled;
            }
        }
    }

    /// Crew status always, plus the dashboard and alerts once something asked for them.
    async fn poll_tick(&mut self) {
        self.refetch(QueryKey::CrewStatus).await;
        for key in [QueryKey::Dashboard, QueryKey::ActiveAlerts] {
            if self.cache.contains(&key) {
                self.refetch(key).await;
            }
        }
    }

    async fn query(&mut self, key: QueryKey) {
        match self.cache.get(&key) {
            Some(data) => {
                let data = data.clone();
                self.publish(Update::Cached { key, data });
            }
            None => self.refetch(key).await,
        }
    }

    async fn refetch(&mut self, key: QueryKey) {
        self.publish(Update::Loading(key.clone()));
        let result = fetch(&self.client, &key).await;
        match &result {
            Ok(data) => self.cache.insert(key.clone(), data.clone()),
            Err(e) => warn!(query = %key.label(), error = %e, "query failed"),
        }
        self.publish(Update::Query { key, result });
    }

    async fn run_seed(&mut self, kind: SeedKind) {
        info!(seed = kind.label(), "running seed");
        let result = self.client.run_seed(kind).await;
        match &result {
            Ok(outcome) => info!(seed = kind.label(), message = %outcome.message, "seed finished"),
            Err(e) => warn!(seed = kind.label(), error = %e, "seed failed"),
        }

        // Tags are invalidated once the mutation settles, success or not
        let stale = self.cache.invalidate(kind.invalidates());
        self.publish(Update::Seed { kind, result });

        for key in stale {
            debug!(query = %key.label(), "refetching invalidated query");
            self.refetch(key).await;
        }
    }

    fn cached_keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = self.cache.keys().cloned().collect();
        keys.sort_by_key(|key| key.label());
        keys
    }

    fn publish(&self, update: Update) {
        // The receiver only goes away when the source is dropped
        let _ = self.updates.send(update);
    }
}

/// Run the gateway call behind a query key.
async fn fetch(client: &GatewayClient, key: &QueryKey) -> Result<QueryData, GatewayError> {
    let data = match key {
        QueryKey::Profiles => QueryData::Profiles(client.profiles().await?),
        QueryKey::Dashboard => QueryData::Dashboard(Box::new(client.dashboard().await?)),
        QueryKey::CrewStatistics => {
            QueryData::CrewStatistics(Box::new(client.crew_statistics().await?))
        }
        QueryKey::CrewStatus => QueryData::CrewStatus(client.crew_status().await?),
        QueryKey::ActiveAlerts => QueryData::ActiveAlerts(client.active_alerts().await?),
        QueryKey::TestEndpoint => QueryData::TestEndpoint(client.test_endpoint().await?),
        QueryKey::SeedStatus => QueryData::SeedStatus(client.seeds_status().await?),
        QueryKey::AstronautStatus(id) => {
            QueryData::AstronautStatus(Box::new(client.astronaut_status(id).await?))
        }
        QueryKey::AstronautStatistics(id) => {
            QueryData::AstronautStatistics(Box::new(client.astronaut_statistics(id).await?))
        }
        QueryKey::History {
            astronaut_id,
            params,
        } => QueryData::History(client.astronaut_history(astronaut_id, params).await?),
        QueryKey::ReportData(range) => QueryData::ReportData(client.report_data(range).await?),
        QueryKey::ReportSummary(range) => {
            QueryData::ReportSummary(Box::new(client.report_summary(range).await?))
        }
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::{crew_json, spawn_gateway};
    use crate::gateway::OverallState;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_gateway(hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/astronauts/crew-status/current",
                get(move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Json(crew_json(&[("a1", "CRITICO")]))
                    }
                }),
            )
            .route(
                "/astronauts/profiles",
                get(|| async { Json(json!([{"astronautId": "a1", "fullName": "Ana Torres"}])) }),
            )
            .route(
                "/astronauts/seeds/monitoring",
                post(|| async { Json(json!({"success": true, "message": "done"})) }),
            )
    }

    async fn worker_for(router: Router) -> (Worker, mpsc::UnboundedReceiver<Update>) {
        let endpoint = spawn_gateway(router).await;
        let client = GatewayClient::builder().endpoint(endpoint).build().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        (Worker::new(client, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Update>) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    #[tokio::test]
    async fn test_query_is_served_from_cache() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (mut worker, mut rx) = worker_for(counting_gateway(hits.clone())).await;

        worker.query(QueryKey::CrewStatus).await;
        worker.query(QueryKey::CrewStatus).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let updates = drain(&mut rx);
        // Loading + result, then the cached copy alone
        assert_eq!(updates.len(), 3);
        assert!(matches!(updates[0], Update::Loading(QueryKey::CrewStatus)));
        assert!(matches!(updates[1], Update::Query { result: Ok(_), .. }));
        match &updates[2] {
            Update::Cached {
                key: QueryKey::CrewStatus,
                data: QueryData::CrewStatus(crew),
            } => assert_eq!(crew.crew_members[0].status, OverallState::Critico),
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refetch_bypasses_cache() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (mut worker, _rx) = worker_for(counting_gateway(hits.clone())).await;

        worker.query(QueryKey::CrewStatus).await;
        worker.refetch(QueryKey::CrewStatus).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_seed_refetches_invalidated_queries() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (mut worker, mut rx) = worker_for(counting_gateway(hits.clone())).await;

        worker.query(QueryKey::CrewStatus).await;
        worker.query(QueryKey::Profiles).await;
        drain(&mut rx);

        worker.run_seed(SeedKind::Monitoring).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        let updates = drain(&mut rx);
        assert!(matches!(
            updates[0],
            Update::Seed {
                kind: SeedKind::Monitoring,
                result: Ok(_)
            }
        ));
        let refetched: Vec<_> = updates
            .iter()
            .filter_map(|u| match u {
                Update::Query { key, .. } => Some(key.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(refetched, vec![QueryKey::CrewStatus]);
        assert!(worker.cache.contains(&QueryKey::Profiles));
    }

    #[tokio::test]
    async fn test_failed_seed_still_invalidates() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (mut worker, mut rx) = worker_for(counting_gateway(hits.clone())).await;

        worker.query(QueryKey::Profiles).await;
        drain(&mut rx);

        // No route for run-all, so the gateway answers 404
        worker.run_seed(SeedKind::All).await;
        let updates = drain(&mut rx);
        match &updates[0] {
            Update::Seed { result: Err(e), .. } => assert_eq!(e.status_code(), Some(404)),
            other => panic!("unexpected update: {:?}", other),
        }
        assert!(updates.iter().any(|u| matches!(
            u,
            Update::Query {
                key: QueryKey::Profiles,
                result: Ok(_)
            }
        )));
    }

    #[tokio::test]
    async fn test_failed_query_is_not_cached() {
        let (mut worker, mut rx) = worker_for(Router::new()).await;
        worker.query(QueryKey::Dashboard).await;

        assert!(!worker.cache.contains(&QueryKey::Dashboard));
        let updates = drain(&mut rx);
        assert!(matches!(
            updates.last(),
            Some(Update::Query { result: Err(_), .. })
        ));
    }

    #[tokio::test]
    async fn test_tick_skips_uncached_dashboard() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (mut worker, mut rx) = worker_for(counting_gateway(hits.clone())).await;

        worker.poll_tick().await;
        let keys: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|u| match u {
                Update::Query { key, .. } => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec![QueryKey::CrewStatus]);
    }

    #[tokio::test]
    async fn test_gateway_source_round_trip() {
        let hits = Arc::new(AtomicUsize::new(0));
        let endpoint = spawn_gateway(counting_gateway(hits.clone())).await;
        let client = GatewayClient::builder().endpoint(endpoint).build().unwrap();
        let mut source = GatewaySource::spawn(client, Duration::from_secs(3600));

        source.request(Request::Query(QueryKey::CrewStatus));

        let mut settled = None;
        for _ in 0..100 {
            match source.poll() {
                Some(Update::Query { result, .. }) => {
                    settled = Some(result);
                    break;
                }
                Some(_) => continue,
                None => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
        assert!(matches!(settled, Some(Ok(QueryData::CrewStatus(_)))));
        assert!(source.error().is_none());
        assert!(source.description().starts_with("gateway: http://127.0.0.1"));
    }
}
