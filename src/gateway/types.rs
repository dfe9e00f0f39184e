//! Wire types returned by the monitoring gateway.
//!
//! These mirror the JSON documents served under `/astronauts/*`. Field names
//! are camelCase on the wire; most fields are defaulted so that a partially
//! populated document still deserializes.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Coarse health classification of a crew member.
///
/// The gateway sends these as upper-case Spanish codes. Anything else maps
/// to [`OverallState::Unknown`] so a new backend code never aborts a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum OverallState {
    #[serde(rename = "OPTIMO")]
    Optimo,
    #[serde(rename = "ESTRESADO")]
    Estresado,
    #[serde(rename = "CRITICO")]
    Critico,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl OverallState {
    /// Parse a wire code. Only the exact uppercase codes are recognised.
    pub fn parse(code: &str) -> Self {
        match code {
            "OPTIMO" => OverallState::Optimo,
            "ESTRESADO" => OverallState::Estresado,
            "CRITICO" => OverallState::Critico,
            _ => OverallState::Unknown,
        }
    }

    /// Returns the wire code.
    pub fn code(&self) -> &'static str {
        match self {
            OverallState::Optimo => "OPTIMO",
            OverallState::Estresado => "ESTRESADO",
            OverallState::Critico => "CRITICO",
            OverallState::Unknown => "UNKNOWN",
        }
    }

    /// Returns a short symbol for table cells.
    pub fn symbol(&self) -> &'static str {
        match self {
            OverallState::Optimo => "OK",
            OverallState::Estresado => "STRESS",
            OverallState::Critico => "CRIT",
            OverallState::Unknown => "?",
        }
    }

    /// Severity rank used for sorting (higher is worse).
    pub fn severity(&self) -> u8 {
        match self {
            OverallState::Optimo => 1,
            OverallState::Unknown => 0,
            OverallState::Estresado => 2,
            OverallState::Critico => 3,
        }
    }
}

impl From<String> for OverallState {
    fn from(code: String) -> Self {
        OverallState::parse(&code)
    }
}

impl fmt::Display for OverallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Per-state counters keyed by the wire codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateCounts {
    #[serde(rename = "OPTIMO", default)]
    pub optimo: u64,
    #[serde(rename = "ESTRESADO", default)]
    pub estresado: u64,
    #[serde(rename = "CRITICO", default)]
    pub critico: u64,
}

impl StateCounts {
    pub fn total(&self) -> u64 {
        self.optimo + self.estresado + self.critico
    }
}

/// Per-state percentages keyed by the wire codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePercentages {
    #[serde(rename = "OPTIMO", default)]
    pub optimo: f64,
    #[serde(rename = "ESTRESADO", default)]
    pub estresado: f64,
    #[serde(rename = "CRITICO", default)]
    pub critico: f64,
}

/// Calibration values recorded for an astronaut at rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaselineMetrics {
    pub normal_eye_opening: f64,
    pub normal_tension_expressions: f64,
    pub normal_pallor: f64,
    pub normal_focus: f64,
    pub normal_concentration: f64,
    pub normal_ear: f64,
}

/// Per-astronaut classification thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileThresholds {
    pub stress_threshold: f64,
    pub critical_threshold: f64,
    pub drowsy_threshold: f64,
    pub closed_threshold: f64,
}

/// An astronaut profile as stored by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstronautProfile {
    #[serde(default)]
    pub id: i64,
    pub astronaut_id: String,
    pub full_name: String,
    #[serde(default)]
    pub codename: String,
    #[serde(default)]
    pub initials: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub baseline_metrics: Option<BaselineMetrics>,
    #[serde(default)]
    pub thresholds: Option<ProfileThresholds>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_monitoring: bool,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default)]
    pub current_status: Option<OverallState>,
    #[serde(default)]
    pub status_last_updated: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl AstronautProfile {
    /// Initials from the profile, or derived from the full name.
    pub fn initials(&self) -> String {
        match &self.initials {
            Some(initials) if !initials.is_empty() => initials.clone(),
            _ => self.full_name.split_whitespace().filter_map(|w| w.chars().next()).collect(),
        }
    }

    /// Case-insensitive match on full name or codename.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        self.full_name.to_lowercase().contains(&needle)
            || self.codename.to_lowercase().contains(&needle)
    }
}

/// A historical alert attached to a monitoring record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertHistoryEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    pub severity: String,
}

/// One biometric/emotional monitoring record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AstronautMonitoring {
    pub id: i64,
    pub astronaut_id: String,
    pub astronaut_name: String,
    pub codename: String,
    pub timestamp: String,
    pub face_detected: bool,
    pub face_confidence: Option<f64>,
    pub recognized_name: Option<String>,
    pub eye_opening: Option<f64>,
    pub tension_expressions: Option<f64>,
    pub pallor: Option<f64>,
    pub focus: Option<f64>,
    pub concentration: Option<f64>,
    pub ear: Option<f64>,
    pub eye_state: Option<String>,
    pub dominant_emotion: Option<String>,
    pub emotion_confidence: Option<f64>,
    pub emotional_state: Option<String>,
    pub emotion_breakdown: Option<BTreeMap<String, f64>>,
    pub overall_state: OverallState,
    pub state_description: Option<String>,
    pub alert_level: Option<String>,
    pub consecutive_closed_frames: u64,
    pub stability_frames: u64,
    pub sentiment_counts: Option<BTreeMap<String, f64>>,
    pub dominant_sentiment: Option<String>,
    pub sentiment_percentage: Option<f64>,
    pub total_frames: u64,
    pub active_alerts: Option<Vec<String>>,
    pub alert_history: Option<Vec<AlertHistoryEntry>>,
    pub recommended_actions: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

/// A crew member entry inside a crew status document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    pub astronaut_id: String,
    pub name: String,
    #[serde(default)]
    pub codename: String,
    #[serde(default)]
    pub status: OverallState,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub last_update: String,
}

/// Current state of the whole crew.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrewStatus {
    pub id: i64,
    pub timestamp: String,
    pub crew_members: Vec<CrewMember>,
    pub total_members: u64,
    pub optimal_count: u64,
    pub stressed_count: u64,
    pub critical_count: u64,
    pub unknown_count: u64,
    pub crew_alerts: Option<Vec<String>>,
    pub crew_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AverageMetrics {
    pub eye_opening: f64,
    pub tension_expressions: f64,
    pub pallor: f64,
    pub focus: f64,
    pub concentration: f64,
    pub ear: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertTotals {
    pub total_alerts: u64,
    pub critical_alerts: u64,
    pub stress_alerts: u64,
    pub last_alert: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatisticsBody {
    pub total_records: u64,
    pub time_range: TimeRange,
    pub state_counts: StateCounts,
    pub state_percentages: StatePercentages,
    pub average_metrics: AverageMetrics,
    pub alert_history: AlertTotals,
    pub performance_score: f64,
}

/// Aggregated statistics for one astronaut.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AstronautStatistics {
    pub astronaut_id: String,
    pub full_name: String,
    pub codename: String,
    pub statistics: StatisticsBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrewPerformance {
    pub average_score: f64,
    pub best_performer: String,
    pub needs_attention: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AstronautScore {
    pub astronaut_id: String,
    pub full_name: String,
    pub performance_score: f64,
    pub state_counts: StateCounts,
}

/// Crew-wide statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrewStatistics {
    pub total_astronauts: u64,
    pub active_astronauts: u64,
    pub total_records: u64,
    pub time_range: TimeRange,
    pub overall_state_counts: StateCounts,
    pub overall_percentages: StatePercentages,
    pub crew_performance: CrewPerformance,
    pub astronaut_stats: Vec<AstronautScore>,
}

/// Snapshot of the most recent readings for one astronaut.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentReading {
    pub overall_state: OverallState,
    pub eye_opening: f64,
    pub tension_expressions: f64,
    pub pallor: f64,
    pub focus: f64,
    pub concentration: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AstronautStatus {
    pub astronaut_id: String,
    pub full_name: String,
    pub codename: String,
    pub current_status: CurrentReading,
}

/// An active alert raised by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alert {
    pub astronaut_id: String,
    pub astronaut_name: String,
    pub alert_type: String,
    pub description: String,
    pub timestamp: String,
    pub recommended_actions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardCrew {
    pub timestamp: String,
    pub crew_members: Vec<CrewMember>,
    pub total_members: u64,
    pub optimal_count: u64,
    pub stressed_count: u64,
    pub critical_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStatistics {
    pub total_records: u64,
    pub unique_astronauts: u64,
    pub state_counts: StateCounts,
}

/// The combined dashboard document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardData {
    pub crew_status: DashboardCrew,
    pub active_alerts: Vec<Alert>,
    pub crew_statistics: DashboardStatistics,
    pub astronaut_statuses: Vec<AstronautStatus>,
}

/// Filters for the monitoring history query.
///
/// Absent or zero values are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HistoryParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub state: Option<OverallState>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl HistoryParams {
    /// Most recent `limit` records.
    pub fn latest(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Query pairs in the order the gateway documents them.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_date.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("startDate", start.clone()));
        }
        if let Some(end) = self.end_date.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("endDate", end.clone()));
        }
        if let Some(state) = self.state {
            pairs.push(("state", state.code().to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset.filter(|o| *o > 0) {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

/// Inclusive calendar date range for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportRange {
    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid start date: {}", start.trim()))?;
        let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid end date: {}", end.trim()))?;
        if end < start {
            bail!("End date {} is before start date {}", end, start);
        }
        Ok(Self { start, end })
    }

    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("startDate", self.start.format("%Y-%m-%d").to_string()),
            ("endDate", self.end.format("%Y-%m-%d").to_string()),
        ]
    }

    /// Default export file name for this range.
    pub fn export_file_name(&self) -> String {
        format!(
            "astronaut-report-{}-to-{}.json",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

impl fmt::Display for ReportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// One row of report data. Unknown fields are preserved for export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astronaut_name: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub overall_state: OverallState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_opening: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension_expressions: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ReportRecord {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().or(self.astronaut_name.as_deref()).unwrap_or("-")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportDuration {
    pub days: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportInfo {
    pub total_records: u64,
    pub unique_astronauts: u64,
    pub duration: Option<ReportDuration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportStatistics {
    pub state_counts: BTreeMap<String, u64>,
    pub state_percentages: BTreeMap<String, f64>,
    pub average_metrics: BTreeMap<String, f64>,
}

/// Summary document for a report range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    #[serde(default)]
    pub report_info: Option<ReportInfo>,
    #[serde(default)]
    pub statistics: Option<ReportStatistics>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Result of a seed run or seed status query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedOutcome {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestData {
    pub astronauts: Vec<String>,
}

/// Response of the connectivity test endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub data: Option<TestData>,
}

/// The seed mutations offered by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedKind {
    /// Profiles, monitoring history and crew status.
    All,
    /// Astronaut profiles with baseline metrics.
    Profiles,
    /// Monitoring history and crew status.
    Monitoring,
}

impl SeedKind {
    pub fn path(&self) -> &'static str {
        match self {
            SeedKind::All => "/astronauts/seeds/run-all",
            SeedKind::Profiles => "/astronauts/seeds/profiles",
            SeedKind::Monitoring => "/astronauts/seeds/monitoring",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeedKind::All => "all seeds",
            SeedKind::Profiles => "profile seeds",
            SeedKind::Monitoring => "monitoring seeds",
        }
    }
}

/// Render a gateway timestamp as local time, falling back to the raw text.
pub fn format_timestamp(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) if raw.is_empty() => "-".to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_crew_status() {
        let json = r#"{
            "id": 7,
            "timestamp": "2024-05-01T10:00:00Z",
            "crewMembers": [
                {"astronautId": "a1", "name": "Ana Torres", "codename": "NOVA",
                 "status": "CRITICO", "color": "red", "lastUpdate": "2024-05-01T09:59:00Z"},
                {"astronautId": "a2", "name": "Luis Vega", "codename": "ORION",
                 "status": "EN_REPOSO"}
            ],
            "totalMembers": 2,
            "criticalCount": 1,
            "unknownCount": 1
        }"#;

        let status: CrewStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.crew_members.len(), 2);
        assert_eq!(status.crew_members[0].status, OverallState::Critico);
        assert_eq!(status.crew_members[1].status, OverallState::Unknown);
        assert_eq!(status.critical_count, 1);
        assert_eq!(status.optimal_count, 0);
    }

    #[test]
    fn test_overall_state_parse() {
        assert_eq!(OverallState::parse("OPTIMO"), OverallState::Optimo);
        assert_eq!(OverallState::parse("ESTRESADO"), OverallState::Estresado);
        assert_eq!(OverallState::parse("critico"), OverallState::Unknown);
        assert_eq!(OverallState::parse(" CRITICO"), OverallState::Unknown);
        assert_eq!(OverallState::parse("CRITICO"), OverallState::Critico);
        assert_eq!(OverallState::parse("??"), OverallState::Unknown);
        assert_eq!(serde_json::to_string(&OverallState::Critico).unwrap(), "\"CRITICO\"");
    }

    #[test]
    fn test_history_params_skip_empty_values() {
        let params = HistoryParams {
            start_date: Some("2024-05-01".to_string()),
            end_date: Some(String::new()),
            state: Some(OverallState::Estresado),
            limit: Some(0),
            offset: Some(40),
        };

        assert_eq!(
            params.pairs(),
            vec![
                ("startDate", "2024-05-01".to_string()),
                ("state", "ESTRESADO".to_string()),
                ("offset", "40".to_string()),
            ]
        );
        assert!(HistoryParams::default().pairs().is_empty());
    }

    #[test]
    fn test_report_range_parse() {
        let range = ReportRange::parse("2024-05-01", "2024-05-07").unwrap();
        assert_eq!(range.pairs()[0], ("startDate", "2024-05-01".to_string()));
        assert_eq!(
            range.export_file_name(),
            "astronaut-report-2024-05-01-to-2024-05-07.json"
        );

        assert!(ReportRange::parse("2024-05-07", "2024-05-01").is_err());
        assert!(ReportRange::parse("yesterday", "2024-05-01").is_err());
    }

    #[test]
    fn test_report_record_keeps_extra_fields() {
        let json = r#"{"astronautName": "Ana", "timestamp": "t", "overallState": "OPTIMO",
                       "eyeOpening": 81.5, "pallor": 12.0}"#;
        let record: ReportRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.display_name(), "Ana");
        assert_eq!(record.eye_opening, Some(81.5));
        assert_eq!(record.extra.get("pallor"), Some(&serde_json::json!(12.0)));
    }

    #[test]
    fn test_profile_initials_and_filter() {
        let profile: AstronautProfile = serde_json::from_str(
            r#"{"astronautId": "a1", "fullName": "Ana Maria Torres", "codename": "NOVA"}"#,
        )
        .unwrap();
        assert_eq!(profile.initials(), "AMT");
        assert!(profile.matches("nov"));
        assert!(profile.matches("TORRES"));
        assert!(!profile.matches("orion"));
    }
}
