//! Crew status change detection.
//!
//! [`StatusDetector`] is fed every crew status refresh. It remembers the last
//! state seen for each astronaut and raises an alert when a member moves into
//! CRITICO or ESTRESADO, or sits in CRITICO while nothing is on screen. At
//! most one alert modal is visible at a time.
//!
//! ```
//! use crewwatch::data::{AlertKind, StatusDetector};
//! use crewwatch::gateway::{CrewMember, OverallState};
//! use crewwatch::notify::SilentNotifier;
//!
//! let member = |status| CrewMember {
//!     astronaut_id: "a1".to_string(),
//!     name: "Ana Torres".to_string(),
//!     codename: "NOVA".to_string(),
//!     status,
//!     color: String::new(),
//!     last_update: String::new(),
//! };
//!
//! let mut detector = StatusDetector::new(true);
//! detector.observe(&[member(OverallState::Optimo)], &mut SilentNotifier);
//! assert!(!detector.modal().is_visible());
//!
//! detector.observe(&[member(OverallState::Critico)], &mut SilentNotifier);
//! assert_eq!(detector.modal().kind, Some(AlertKind::Critical));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::info;

use crate::gateway::{CrewMember, OverallState};
use crate::notify::Notifier;

/// The two alert severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Critical,
    Stressed,
}

impl AlertKind {
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::Critical => "critical",
            AlertKind::Stressed => "stressed",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One emitted alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewAlert {
    pub kind: AlertKind,
    pub astronaut_id: String,
    pub astronaut_name: String,
}

impl CrewAlert {
    fn for_member(kind: AlertKind, member: &CrewMember) -> Self {
        Self {
            kind,
            astronaut_id: member.astronaut_id.clone(),
            astronaut_name: member.name.clone(),
        }
    }
}

/// The alert overlay. `Default` is the hidden state with every field reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertModal {
    pub show: bool,
    pub kind: Option<AlertKind>,
    pub astronaut_name: String,
    pub astronaut_id: String,
}

impl AlertModal {
    pub fn is_visible(&self) -> bool {
        self.show
    }

    fn raise(alert: &CrewAlert) -> Self {
        Self {
            show: true,
            kind: Some(alert.kind),
            astronaut_name: alert.astronaut_name.clone(),
            astronaut_id: alert.astronaut_id.clone(),
        }
    }
}

/// Compares each crew refresh with the previous one and drives the alert modal.
#[derive(Debug, Clone, Default)]
pub struct StatusDetector {
    previous: HashMap<String, OverallState>,
    modal: AlertModal,
    sustained_critical: bool,
}

impl StatusDetector {
    /// `sustained_critical` enables re-alerting on members that stay CRITICO
    /// once the modal has been dismissed.
    pub fn new(sustained_critical: bool) -> Self {
        Self {
            previous: HashMap::new(),
            modal: AlertModal::default(),
            sustained_critical,
        }
    }

    pub fn modal(&self) -> &AlertModal {
        &self.modal
    }

    /// Last state observed for an astronaut.
    pub fn previous_state(&self, astronaut_id: &str) -> Option<OverallState> {
        self.previous.get(astronaut_id).copied()
    }

    pub fn sustained_critical(&self) -> bool {
        self.sustained_critical
    }

    /// Process one crew refresh. Returns the alerts emitted, in order.
    ///
    /// The sustained pass looks at the modal as it was before this refresh,
    /// so several CRITICO members raised in one refresh overwrite each other
    /// and the last one stays on screen.
    pub fn observe(&mut self, members: &[CrewMember], notifier: &mut dyn Notifier) -> Vec<CrewAlert> {
        let was_visible = self.modal.is_visible();
        let mut emitted = Vec::new();
        let mut transitioned = HashSet::new();

        // Transitions overwrite whatever is showing
        for member in members {
            let Some(previous) = self.previous.get(&member.astronaut_id) else {
                continue;
            };
            if *previous == member.status {
                continue;
            }
            let kind = match member.status {
                OverallState::Critico => AlertKind::Critical,
                OverallState::Estresado => AlertKind::Stressed,
                OverallState::Optimo | OverallState::Unknown => continue,
            };
            transitioned.insert(member.astronaut_id.as_str());
            self.emit(CrewAlert::for_member(kind, member), notifier, &mut emitted);
        }

        // Sustained CRITICO only fills a screen that was empty
        if self.sustained_critical && !was_visible {
            for member in members {
                if member.status == OverallState::Critico
                    && !transitioned.contains(member.astronaut_id.as_str())
                {
                    let alert = CrewAlert::for_member(AlertKind::Critical, member);
                    self.emit(alert, notifier, &mut emitted);
                }
            }
        }

        for member in members {
            self.previous
                .insert(member.astronaut_id.clone(), member.status);
        }

        emitted
    }

    fn emit(&mut self, alert: CrewAlert, notifier: &mut dyn Notifier, emitted: &mut Vec<CrewAlert>) {
        info!(
            kind = alert.kind.label(),
            astronaut_id = %alert.astronaut_id,
            astronaut = %alert.astronaut_name,
            "crew alert raised"
        );
        self.modal = AlertModal::raise(&alert);
        notifier.notify(&alert);
        emitted.push(alert);
    }

    /// "Entendido": hide the modal.
    pub fn acknowledge(&mut self) {
        self.modal = AlertModal::default();
    }

    /// "Ver Detalles": hide the modal and return the alerted astronaut id.
    pub fn view_details(&mut self) -> Option<String> {
        if !self.modal.is_visible() {
            return None;
        }
        let modal = std::mem::take(&mut self.modal);
        Some(modal.astronaut_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;

    fn member(id: &str, status: OverallState) -> CrewMember {
        CrewMember {
            astronaut_id: id.to_string(),
            name: format!("Astronaut {}", id),
            codename: String::new(),
            status,
            color: String::new(),
            last_update: String::new(),
        }
    }

    fn detector() -> (StatusDetector, RecordingNotifier) {
        (StatusDetector::new(true), RecordingNotifier::new())
    }

    #[test]
    fn test_transition_to_critical_raises_one_alert() {
        let (mut detector, mut notifier) = detector();
        detector.observe(&[member("a1", OverallState::Optimo)], &mut notifier);
        let emitted = detector.observe(&[member("a1", OverallState::Critico)], &mut notifier);

        assert_eq!(emitted.len(), 1);
        assert_eq!(
            detector.modal(),
            &AlertModal {
                show: true,
                kind: Some(AlertKind::Critical),
                astronaut_name: "Astronaut a1".to_string(),
                astronaut_id: "a1".to_string(),
            }
        );
        assert_eq!(detector.previous_state("a1"), Some(OverallState::Critico));
        assert_eq!(notifier.kinds(), vec![AlertKind::Critical]);
    }

    #[test]
    fn test_optimo_to_estresado_raises_stressed() {
        let (mut detector, mut notifier) = detector();
        detector.observe(&[member("a1", OverallState::Optimo)], &mut notifier);
        detector.observe(&[member("a1", OverallState::Estresado)], &mut notifier);

        assert_eq!(detector.modal().kind, Some(AlertKind::Stressed));
        assert_eq!(notifier.kinds(), vec![AlertKind::Stressed]);
    }

    #[test]
    fn test_transition_to_optimo_is_silent() {
        for from in [OverallState::Estresado, OverallState::Critico, OverallState::Unknown] {
            let (mut detector, mut notifier) = detector();
            detector.observe(&[member("a1", from)], &mut notifier);
            detector.acknowledge();
            let before = notifier.kinds().len();

            let emitted = detector.observe(&[member("a1", OverallState::Optimo)], &mut notifier);
            assert!(emitted.is_empty(), "from {:?}", from);
            assert!(!detector.modal().is_visible());
            assert_eq!(notifier.kinds().len(), before);
        }
    }

    #[test]
    fn test_transition_to_unknown_is_silent() {
        let (mut detector, mut notifier) = detector();
        detector.observe(&[member("a1", OverallState::Optimo)], &mut notifier);
        assert!(detector
            .observe(&[member("a1", OverallState::Unknown)], &mut notifier)
            .is_empty());
        assert_eq!(detector.previous_state("a1"), Some(OverallState::Unknown));
    }

    #[test]
    fn test_first_sight_of_critical_raises_alert() {
        let (mut detector, mut notifier) = detector();
        let emitted = detector.observe(&[member("a1", OverallState::Critico)], &mut notifier);
        assert_eq!(emitted.len(), 1);
        assert!(detector.modal().is_visible());
    }

    #[test]
    fn test_sustained_critical_realerts_after_acknowledge() {
        let (mut detector, mut notifier) = detector();
        detector.observe(&[member("a1", OverallState::Critico)], &mut notifier);

        // Still visible: nothing new
        assert!(detector
            .observe(&[member("a1", OverallState::Critico)], &mut notifier)
            .is_empty());

        detector.acknowledge();
        let emitted = detector.observe(&[member("a1", OverallState::Critico)], &mut notifier);
        assert_eq!(emitted.len(), 1);
        assert_eq!(notifier.kinds().len(), 2);
    }

    #[test]
    fn test_sustained_pass_can_be_disabled() {
        let mut detector = StatusDetector::new(false);
        let mut notifier = RecordingNotifier::new();
        detector.observe(&[member("a1", OverallState::Critico)], &mut notifier);
        assert!(!detector.modal().is_visible());

        detector.observe(&[member("a1", OverallState::Optimo)], &mut notifier);
        detector.observe(&[member("a1", OverallState::Critico)], &mut notifier);
        assert_eq!(detector.modal().kind, Some(AlertKind::Critical));
    }

    #[test]
    fn test_two_critical_members_yield_one_modal() {
        let (mut detector, mut notifier) = detector();
        detector.observe(&[member("a3", OverallState::Critico)], &mut notifier);
        assert_eq!(detector.modal().astronaut_id, "a3");

        // Modal already up: neither sustained member replaces it
        let emitted = detector.observe(
            &[
                member("a1", OverallState::Critico),
                member("a2", OverallState::Critico),
                member("a3", OverallState::Critico),
            ],
            &mut notifier,
        );
        assert!(emitted.is_empty());
        assert!(detector.modal().is_visible());
        assert_eq!(detector.modal().astronaut_id, "a3");
    }

    #[test]
    fn test_last_critical_member_wins_on_empty_screen() {
        let (mut detector, mut notifier) = detector();
        let emitted = detector.observe(
            &[member("a1", OverallState::Critico), member("a2", OverallState::Critico)],
            &mut notifier,
        );
        assert_eq!(emitted.len(), 2);
        assert_eq!(detector.modal().astronaut_id, "a2");
        assert_eq!(detector.modal().kind, Some(AlertKind::Critical));
        assert_eq!(notifier.kinds(), vec![AlertKind::Critical, AlertKind::Critical]);
    }

    #[test]
    fn test_sustained_member_overwrites_stressed_transition() {
        let (mut detector, mut notifier) = detector();
        detector.observe(
            &[member("a1", OverallState::Optimo), member("a2", OverallState::Critico)],
            &mut notifier,
        );
        detector.acknowledge();

        detector.observe(
            &[member("a1", OverallState::Estresado), member("a2", OverallState::Critico)],
            &mut notifier,
        );
        assert_eq!(detector.modal().astronaut_id, "a2");
        assert_eq!(detector.modal().kind, Some(AlertKind::Critical));
    }

    #[test]
    fn test_transition_overwrites_visible_modal() {
        let (mut detector, mut notifier) = detector();
        detector.observe(
            &[member("a1", OverallState::Critico), member("a2", OverallState::Optimo)],
            &mut notifier,
        );
        assert_eq!(detector.modal().astronaut_id, "a1");

        detector.observe(
            &[member("a1", OverallState::Critico), member("a2", OverallState::Estresado)],
            &mut notifier,
        );
        assert_eq!(detector.modal().astronaut_id, "a2");
        assert_eq!(detector.modal().kind, Some(AlertKind::Stressed));
    }

    #[test]
    fn test_transition_suppresses_sustained_duplicate() {
        let (mut detector, mut notifier) = detector();
        detector.observe(&[member("a1", OverallState::Optimo)], &mut notifier);
        let emitted = detector.observe(&[member("a1", OverallState::Critico)], &mut notifier);
        assert_eq!(emitted.len(), 1);
        assert_eq!(notifier.kinds(), vec![AlertKind::Critical]);
    }

    #[test]
    fn test_unchanged_estresado_raises_nothing() {
        let (mut detector, mut notifier) = detector();
        detector.observe(&[member("a1", OverallState::Estresado)], &mut notifier);
        let emitted = detector.observe(&[member("a1", OverallState::Estresado)], &mut notifier);
        assert!(emitted.is_empty());
        assert!(!detector.modal().is_visible());
        assert!(notifier.kinds().is_empty());
    }

    #[test]
    fn test_empty_refresh_changes_nothing() {
        let (mut detector, mut notifier) = detector();
        detector.observe(&[member("a1", OverallState::Optimo)], &mut notifier);
        assert!(detector.observe(&[], &mut notifier).is_empty());
        assert_eq!(detector.previous_state("a1"), Some(OverallState::Optimo));
    }

    #[test]
    fn test_acknowledge_resets_modal() {
        let (mut detector, mut notifier) = detector();
        detector.observe(&[member("a1", OverallState::Critico)], &mut notifier);
        detector.acknowledge();
        assert_eq!(detector.modal(), &AlertModal::default());
    }

    #[test]
    fn test_view_details_returns_astronaut() {
        let (mut detector, mut notifier) = detector();
        assert_eq!(detector.view_details(), None);

        detector.observe(&[member("a7", OverallState::Critico)], &mut notifier);
        assert_eq!(detector.view_details(), Some("a7".to_string()));
        assert!(!detector.modal().is_visible());
        assert_eq!(detector.modal(), &AlertModal::default());
    }
}
