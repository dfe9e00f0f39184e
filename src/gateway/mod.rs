//! HTTP client for the astronaut monitoring gateway.
//!
//! The gateway is an external REST service. This module only knows how to
//! call it: every query and mutation the dashboard uses is a typed method on
//! [`GatewayClient`]. Caching lives one layer up in [`crate::source`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use crewwatch::gateway::GatewayClient;
//!
//! # tokio_test::block_on(async {
//! let client = GatewayClient::builder()
//!     .endpoint("http://localhost:5000")
//!     .build()
//!     .unwrap();
//!
//! let crew = client.crew_status().await.unwrap();
//! for member in &crew.crew_members {
//!     println!("{}: {}", member.name, member.status);
//! }
//! # });
//! ```

mod error;
pub mod types;

pub use error::{ErrorReport, GatewayError};
pub use types::*;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Default gateway location.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Typed client for the gateway REST API.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    endpoint: String,
}

impl GatewayClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> GatewayClientBuilder {
        GatewayClientBuilder::default()
    }

    /// The base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// All astronaut profiles.
    pub async fn profiles(&self) -> Result<Vec<AstronautProfile>, GatewayError> {
        self.get("/astronauts/profiles", &[]).await
    }

    /// The combined dashboard document.
    pub async fn dashboard(&self) -> Result<DashboardData, GatewayError> {
        self.get("/astronauts/dashboard", &[]).await
    }

    /// Aggregated statistics for one astronaut.
    pub async fn astronaut_statistics(
        &self,
        astronaut_id: &str,
    ) -> Result<AstronautStatistics, GatewayError> {
        self.get_for("/astronauts/statistics", astronaut_id, &[]).await
    }

    /// Crew-wide statistics.
    pub async fn crew_statistics(&self) -> Result<CrewStatistics, GatewayError> {
        self.get("/astronauts/crew/statistics", &[]).await
    }

    /// Monitoring history for one astronaut.
    pub async fn astronaut_history(
        &self,
        astronaut_id: &str,
        params: &HistoryParams,
    ) -> Result<Vec<AstronautMonitoring>, GatewayError> {
        self.get_for("/astronauts/monitoring/history", astronaut_id, &params.pairs())
            .await
    }

    /// Alerts currently raised by the gateway.
    pub async fn active_alerts(&self) -> Result<Vec<Alert>, GatewayError> {
        self.get("/astronauts/alerts/active", &[]).await
    }

    /// Current state of every crew member.
    pub async fn crew_status(&self) -> Result<CrewStatus, GatewayError> {
        self.get("/astronauts/crew-status/current", &[]).await
    }

    /// Latest monitoring record for one astronaut.
    pub async fn astronaut_status(
        &self,
        astronaut_id: &str,
    ) -> Result<AstronautMonitoring, GatewayError> {
        self.get_for("/astronauts/status", astronaut_id, &[]).await
    }

    /// Connectivity check.
    pub async fn test_endpoint(&self) -> Result<TestResponse, GatewayError> {
        self.get("/astronauts/test", &[]).await
    }

    /// Whether the demo dataset has been seeded.
    pub async fn seeds_status(&self) -> Result<SeedOutcome, GatewayError> {
        self.get("/astronauts/seeds/status", &[]).await
    }

    /// Report rows for a date range.
    pub async fn report_data(&self, range: &ReportRange) -> Result<Vec<ReportRecord>, GatewayError> {
        self.get("/astronauts/reports/data", &range.pairs()).await
    }

    /// Report summary for a date range.
    pub async fn report_summary(&self, range: &ReportRange) -> Result<ReportSummary, GatewayError> {
        self.get("/astronauts/reports/summary", &range.pairs()).await
    }

    /// Run one of the seed mutations.
    pub async fn run_seed(&self, kind: SeedKind) -> Result<SeedOutcome, GatewayError> {
        let url = self.url(kind.path(), None)?;
        self.send(Method::POST, url, &[]).await
    }

    /// Base URL plus `path`, with `segment` appended as one encoded path segment.
    fn url(&self, path: &str, segment: Option<&str>) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&format!("{}{}", self.endpoint, path))
            .map_err(|e| GatewayError::Request(format!("invalid gateway URL: {}", e)))?;
        if let Some(segment) = segment {
            url.path_segments_mut()
                .map_err(|_| GatewayError::Request(format!("invalid gateway URL: {}", self.endpoint)))?
                .push(segment);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = self.url(path, None)?;
        self.send(Method::GET, url, query).await
    }

    /// GET on a per-astronaut resource.
    async fn get_for<T: DeserializeOwned>(
        &self,
        path: &str,
        astronaut_id: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let url = self.url(path, Some(astronaut_id))?;
        self.send(Method::GET, url, query).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        debug!(%method, %url, ?query, "gateway request");

        let mut request = self.client.request(method.clone(), url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, %url, error = %e, "gateway request failed");
            GatewayError::from(e)
        })?;

        let status = response.status();
        debug!(%method, %url, status = status.as_u16(), "gateway response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%method, %url, status = status.as_u16(), %body, "gateway returned an error");
            return Err(GatewayError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                &body,
            ));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Parse(e.to_string()))
    }
}

/// Builder for GatewayClient.
#[derive(Debug, Default)]
pub struct GatewayClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl GatewayClientBuilder {
    /// Set the gateway base URL (e.g., "http://localhost:5000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GatewayClient, GatewayError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GatewayClient { client, endpoint })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::extract::{Path, RawQuery};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    /// Serve `router` on an ephemeral port and return its base URL.
    pub(crate) async fn spawn_gateway(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub(crate) fn crew_json(states: &[(&str, &str)]) -> serde_json::Value {
        let members: Vec<_> = states
            .iter()
            .map(|(id, status)| {
                json!({
                    "astronautId": id,
                    "name": format!("Astronaut {}", id),
                    "codename": id.to_uppercase(),
                    "status": status,
                    "color": "gray",
                    "lastUpdate": "2024-05-01T10:00:00Z"
                })
            })
            .collect();
        json!({
            "id": 1,
            "timestamp": "2024-05-01T10:00:00Z",
            "crewMembers": members,
            "totalMembers": states.len()
        })
    }

    #[test]
    fn test_builder_defaults() {
        let client = GatewayClient::builder().build().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:5000");
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = GatewayClient::builder()
            .endpoint("http://gateway.local:8080/")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "http://gateway.local:8080");
    }

    #[test]
    fn test_astronaut_id_is_one_path_segment() {
        let client = GatewayClient::builder().build().unwrap();
        let url = |id| client.url("/astronauts/status", Some(id)).unwrap();

        assert_eq!(url("a1").as_str(), "http://localhost:5000/astronauts/status/a1");
        assert_eq!(url("crew/a1").path(), "/astronauts/status/crew%2Fa1");
        assert_eq!(url("ana torres").path(), "/astronauts/status/ana%20torres");

        let odd = url("a?1#x%");
        assert_eq!(odd.path(), "/astronauts/status/a%3F1%23x%25");
        assert_eq!(odd.query(), None);
        assert_eq!(odd.fragment(), None);
    }

    #[tokio::test]
    async fn test_reserved_characters_reach_the_gateway() {
        let router = Router::new().route(
            "/astronauts/status/:id",
            get(|Path(id): Path<String>| async move {
                Json(json!({"astronautId": id, "overallState": "OPTIMO"}))
            }),
        );
        let endpoint = spawn_gateway(router).await;
        let client = GatewayClient::builder().endpoint(endpoint).build().unwrap();

        let status = client.astronaut_status("a?1#b").await.unwrap();
        assert_eq!(status.astronaut_id, "a?1#b");
        assert_eq!(status.overall_state, OverallState::Optimo);
    }

    #[tokio::test]
    async fn test_crew_status_request() {
        let router = Router::new().route(
            "/astronauts/crew-status/current",
            get(|| async { Json(crew_json(&[("a1", "OPTIMO"), ("a2", "CRITICO")])) }),
        );
        let endpoint = spawn_gateway(router).await;
        let client = GatewayClient::builder().endpoint(endpoint).build().unwrap();

        let crew = client.crew_status().await.unwrap();
        assert_eq!(crew.crew_members.len(), 2);
        assert_eq!(crew.crew_members[1].status, OverallState::Critico);
    }

    #[tokio::test]
    async fn test_history_request_sends_params() {
        let router = Router::new().route(
            "/astronauts/monitoring/history/:id",
            get(|Path(id): Path<String>, RawQuery(query): RawQuery| async move {
                Json(json!([{
                    "astronautId": id,
                    "overallState": "ESTRESADO",
                    "stateDescription": query.unwrap_or_default()
                }]))
            }),
        );
        let endpoint = spawn_gateway(router).await;
        let client = GatewayClient::builder().endpoint(endpoint).build().unwrap();

        let records = client.astronaut_history("a1", &HistoryParams::latest(20)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].astronaut_id, "a1");
        assert_eq!(records[0].overall_state, OverallState::Estresado);
        assert_eq!(records[0].state_description.as_deref(), Some("limit=20"));
    }

    #[tokio::test]
    async fn test_seed_mutation_posts() {
        let router = Router::new().route(
            "/astronauts/seeds/profiles",
            post(|| async {
                Json(json!({"success": true, "message": "6 profiles created", "timestamp": "now"}))
            }),
        );
        let endpoint = spawn_gateway(router).await;
        let client = GatewayClient::builder().endpoint(endpoint).build().unwrap();

        let outcome = client.run_seed(SeedKind::Profiles).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "6 profiles created");
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let router = Router::new().route(
            "/astronauts/profiles",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "profiles table missing"})),
                )
            }),
        );
        let endpoint = spawn_gateway(router).await;
        let client = GatewayClient::builder().endpoint(endpoint).build().unwrap();

        let err = client.profiles().await.unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        let report = err.report();
        assert_eq!(report.message, "Error 400: Bad Request");
        assert!(report.details.unwrap().contains("profiles table missing"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let router = Router::new().route("/astronauts/test", get(|| async { "not json" }));
        let endpoint = spawn_gateway(router).await;
        let client = GatewayClient::builder().endpoint(endpoint).build().unwrap();

        let err = client.test_endpoint().await.unwrap_err();
        assert!(matches!(err, GatewayError::Parse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind and drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GatewayClient::builder()
            .endpoint(format!("http://{}", addr))
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let err = client.seeds_status().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Connection(_) | GatewayError::Request(_)
        ));
    }
}
