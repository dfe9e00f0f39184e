//! Application state and navigation logic.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::data::{History, QueryStore, StatusDetector};
use crate::gateway::{
    GatewayError, HistoryParams, ReportRange, SeedKind, SeedOutcome,
};
use crate::notify::Notifier;
use crate::source::{DataSource, QueryData, QueryKey, Request, Update};
use crate::ui::Theme;

/// History records shown in the astronaut detail overlay.
pub const DETAIL_HISTORY_LIMIT: u32 = 20;

/// Report rows rendered in the reports view.
pub const REPORT_ROW_LIMIT: usize = 50;

/// The current view/tab in the TUI.
///
/// Astronaut detail is an overlay (controlled by `App::show_detail_overlay`)
/// rather than a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Crew overview, active alerts and current readings.
    Dashboard,
    /// Astronaut profiles.
    Astronauts,
    /// Crew and per-astronaut statistics.
    Statistics,
    /// Live crew status with state timelines.
    Monitoring,
    /// Date-range reports and export.
    Reports,
    /// Connectivity check and seed runner.
    Seeds,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Dashboard,
        View::Astronauts,
        View::Statistics,
        View::Monitoring,
        View::Reports,
        View::Seeds,
    ];

    /// Position in the tab bar.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Astronauts => "Astronauts",
            View::Statistics => "Statistics",
            View::Monitoring => "Monitoring",
            View::Reports => "Reports",
            View::Seeds => "Seeds",
        }
    }
}

/// What keystrokes are currently captured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Filter,
    ReportStart,
    ReportEnd,
}

/// Report form state.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    /// Start date as typed (`YYYY-MM-DD`).
    pub start: String,
    /// End date as typed (`YYYY-MM-DD`).
    pub end: String,
    /// Range of the last generated report.
    pub range: Option<ReportRange>,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data
    source: Box<dyn DataSource>,
    pub store: QueryStore,
    pub history: History,
    pub load_error: Option<String>,

    // Alerts
    pub detector: StatusDetector,
    notifier: Box<dyn Notifier>,

    // Navigation state
    pub selected_index: usize,
    pub selected_astronaut: Option<String>,

    // Search/filter and text input
    pub filter_text: String,
    pub input_mode: InputMode,

    // Seeds
    pub seeds_running: HashSet<SeedKind>,
    pub last_seed: Option<(SeedKind, Result<SeedOutcome, GatewayError>)>,

    // Reports
    pub report: ReportForm,

    pub auto_refresh: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and notifier.
    pub fn new(source: Box<dyn DataSource>, notifier: Box<dyn Notifier>, sustained_critical: bool) -> Self {
        Self::with_theme(source, notifier, sustained_critical, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme.
    pub fn with_theme(
        source: Box<dyn DataSource>,
        notifier: Box<dyn Notifier>,
        sustained_critical: bool,
        theme: Theme,
    ) -> Self {
        let mut app = Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            show_detail_overlay: false,
            source,
            store: QueryStore::new(),
            history: History::new(),
            load_error: None,
            detector: StatusDetector::new(sustained_critical),
            notifier,
            selected_index: 0,
            selected_astronaut: None,
            filter_text: String::new(),
            input_mode: InputMode::Normal,
            seeds_running: HashSet::new(),
            last_seed: None,
            report: ReportForm::default(),
            auto_refresh: true,
            theme,
            status_message: None,
        };
        app.request_view_data();
        app
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    fn request(&mut self, request: Request) {
        debug!(?request, "request");
        self.source.request(request);
    }

    /// Drain every pending update from the source.
    ///
    /// Crew status updates go through the detector before anything is drawn.
    /// Returns true if anything arrived.
    pub fn reload_data(&mut self) -> bool {
        self.load_error = self.source.error().map(str::to_string);

        let mut received = false;
        while let Some(update) = self.source.poll() {
            received = true;
            self.apply_update(update);
        }

        if received {
            self.clamp_selection();
        }
        received
    }

    fn apply_update(&mut self, update: Update) {
        match update {
            Update::Loading(key) => self.store.start(key),
            Update::Query { key, result } => {
                // Only fresh fetches count as observations
                if let Ok(QueryData::CrewStatus(crew)) = &result {
                    self.history.record(&crew.crew_members);
                    self.detector
                        .observe(&crew.crew_members, self.notifier.as_mut());
                }
                self.store.settle(key, result);
            }
            Update::Cached { key, data } => self.store.serve_cached(key, data),
            Update::Seed { kind, result } => {
                self.seeds_running.remove(&kind);
                let message = match &result {
                    Ok(outcome) if outcome.success => format!("Seed finished: {}", outcome.message),
                    Ok(outcome) => format!("Seed reported failure: {}", outcome.message),
                    Err(e) => format!("Seed failed: {}", e.report().message),
                };
                self.set_status_message(message);
                self.last_seed = Some((kind, result));
            }
        }
    }

    /// Ask for whatever the current view renders.
    pub fn request_view_data(&mut self) {
        let keys: Vec<QueryKey> = match self.current_view {
            View::Dashboard => vec![QueryKey::CrewStatus, QueryKey::Dashboard, QueryKey::ActiveAlerts],
            View::Astronauts => vec![QueryKey::Profiles],
            View::Statistics => vec![QueryKey::Profiles, QueryKey::CrewStatistics],
            View::Monitoring => vec![QueryKey::CrewStatus, QueryKey::Profiles],
            View::Reports => match self.report.range {
                Some(range) => vec![QueryKey::ReportData(range), QueryKey::ReportSummary(range)],
                None => Vec::new(),
            },
            View::Seeds => vec![QueryKey::TestEndpoint, QueryKey::SeedStatus],
        };
        for key in keys {
            self.request(Request::Query(key));
        }
    }

    /// Force a refetch of everything the data layer has cached.
    pub fn refresh(&mut self) {
        self.request(Request::RefreshAll);
        self.set_status_message("Refreshing...".to_string());
    }

    /// Toggle the polling timer.
    pub fn toggle_auto_refresh(&mut self) {
        self.auto_refresh = !self.auto_refresh;
        self.request(Request::SetAutoRefresh(self.auto_refresh));
        let state = if self.auto_refresh { "on" } else { "off" };
        self.set_status_message(format!("Auto refresh {}", state));
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        if self.current_view != view {
            self.current_view = view;
            self.selected_index = 0;
        }
        self.request_view_data();
    }

    /// Astronaut ids in the order the current view lists them.
    pub fn visible_astronauts(&self) -> Vec<(String, String)> {
        match self.current_view {
            View::Dashboard => self
                .store
                .dashboard()
                .map(|d| {
                    d.crew_status
                        .crew_members
                        .iter()
                        .map(|m| (m.astronaut_id.clone(), m.name.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            View::Astronauts | View::Statistics => self
                .store
                .profiles()
                .map(|profiles| {
                    profiles
                        .iter()
                        .filter(|p| p.matches(&self.filter_text))
                        .map(|p| (p.astronaut_id.clone(), p.full_name.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            View::Monitoring => self
                .store
                .crew_status()
                .map(|crew| {
                    crew.crew_members
                        .iter()
                        .filter(|m| self.matches_filter(&m.name) || self.matches_filter(&m.codename))
                        .map(|m| (m.astronaut_id.clone(), m.name.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            View::Reports | View::Seeds => Vec::new(),
        }
    }

    /// Number of selectable rows in the current view.
    pub fn list_len(&self) -> usize {
        match self.current_view {
            View::Reports => self
                .report
                .range
                .and_then(|range| self.store.report_data(&range))
                .map(|rows| rows.len().min(REPORT_ROW_LIMIT))
                .unwrap_or(0),
            View::Seeds => self
                .store
                .test_endpoint()
                .and_then(|t| t.data.as_ref())
                .map(|d| d.astronauts.len())
                .unwrap_or(0),
            _ => self.visible_astronauts().len(),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.list_len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.list_len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.list_len().saturating_sub(1);
    }

    /// Make an astronaut the selection and fetch its detail queries.
    pub fn select_astronaut(&mut self, astronaut_id: String) {
        info!(%astronaut_id, "astronaut selected");
        for key in self.detail_keys(&astronaut_id) {
            self.request(Request::Query(key));
        }
        self.selected_astronaut = Some(astronaut_id);
    }

    /// Queries backing the detail overlay.
    pub fn detail_keys(&self, astronaut_id: &str) -> Vec<QueryKey> {
        vec![
            QueryKey::AstronautStatus(astronaut_id.to_string()),
            QueryKey::AstronautStatistics(astronaut_id.to_string()),
            QueryKey::History {
                astronaut_id: astronaut_id.to_string(),
                params: HistoryParams::latest(DETAIL_HISTORY_LIMIT),
            },
        ]
    }

    /// Open the detail overlay for the highlighted astronaut.
    pub fn enter_detail(&mut self) {
        let Some((id, _)) = self.visible_astronauts().into_iter().nth(self.selected_index) else {
            return;
        };
        self.select_astronaut(id);
        self.show_detail_overlay = true;
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// "Entendido" on the alert modal.
    pub fn acknowledge_alert(&mut self) {
        self.detector.acknowledge();
    }

    /// "Ver Detalles" on the alert modal.
    pub fn view_alert_details(&mut self) {
        if let Some(id) = self.detector.view_details() {
            self.current_view = View::Monitoring;
            self.request_view_data();
            self.select_astronaut(id);
            self.show_detail_overlay = true;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Start a seed mutation unless the same seed is still running.
    pub fn run_seed(&mut self, kind: SeedKind) {
        if !self.seeds_running.insert(kind) {
            self.set_status_message(format!("{} already running", kind.label()));
            return;
        }
        info!(seed = kind.label(), "seed requested");
        self.request(Request::RunSeed(kind));
        self.set_status_message(format!("Running {}...", kind.label()));
    }

    /// Whether a seed is in flight.
    pub fn seed_running(&self, kind: SeedKind) -> bool {
        self.seeds_running.contains(&kind)
    }

    /// Start editing a report date.
    pub fn edit_report_date(&mut self, mode: InputMode) {
        if matches!(mode, InputMode::ReportStart | InputMode::ReportEnd) {
            self.input_mode = mode;
        }
    }

    /// Parse the typed dates and request the report queries.
    pub fn generate_report(&mut self) {
        if self.report.start.trim().is_empty() || self.report.end.trim().is_empty() {
            self.set_status_message("Enter both start and end dates (s / e)".to_string());
            return;
        }
        match ReportRange::parse(&self.report.start, &self.report.end) {
            Ok(range) => {
                self.report.range = Some(range);
                self.selected_index = 0;
                self.request(Request::Query(QueryKey::ReportData(range)));
                self.request(Request::Query(QueryKey::ReportSummary(range)));
                self.set_status_message(format!("Generating report {}", range));
            }
            Err(e) => self.set_status_message(format!("{:#}", e)),
        }
    }

    /// Write the generated report to `dir` and return the file path.
    pub fn export_report(&self, dir: &Path) -> Result<PathBuf> {
        let Some(range) = self.report.range else {
            bail!("No report generated");
        };
        let Some(rows) = self.store.report_data(&range) else {
            bail!("Report data not loaded yet");
        };

        let export = serde_json::json!({
            "summary": self.store.report_summary(&range),
            "data": rows,
            "exportedAt": chrono::Utc::now().to_rfc3339(),
        });

        let path = dir.join(range.export_file_name());
        let json = serde_json::to_string_pretty(&export)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), rows = rows.len(), "report exported");
        Ok(path)
    }

    /// Export into the working directory and report the outcome.
    pub fn export_report_here(&mut self) {
        match self.export_report(Path::new(".")) {
            Ok(path) => self.set_status_message(format!("Exported to {}", path.display())),
            Err(e) => {
                warn!(error = %e, "report export failed");
                self.set_status_message(format!("Export failed: {}", e));
            }
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.input_mode = InputMode::Filter;
    }

    /// Leave any input mode, keeping what was typed.
    pub fn finish_input(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.selected_index = 0;
        if self.input_mode == InputMode::Filter {
            self.input_mode = InputMode::Normal;
        }
    }

    /// Append a character to the active input.
    pub fn input_push(&mut self, c: char) {
        match self.input_mode {
            InputMode::Filter => {
                self.filter_text.push(c);
                self.selected_index = 0;
            }
            InputMode::ReportStart => self.report.start.push(c),
            InputMode::ReportEnd => self.report.end.push(c),
            InputMode::Normal => {}
        }
    }

    /// Remove the last character from the active input.
    pub fn input_pop(&mut self) {
        match self.input_mode {
            InputMode::Filter => {
                self.filter_text.pop();
                self.selected_index = 0;
            }
            InputMode::ReportStart => {
                self.report.start.pop();
            }
            InputMode::ReportEnd => {
                self.report.end.pop();
            }
            InputMode::Normal => {}
        }
    }

    /// Check if a name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
