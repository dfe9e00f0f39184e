//! Per-astronaut state timeline for the monitoring strip.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use crate::gateway::{CrewMember, OverallState};

/// Maximum number of observations kept per astronaut.
pub const MAX_HISTORY_SIZE: usize = 60;

/// Tracks the states observed on each crew status refresh.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Observed states per astronaut id, oldest first.
    pub states: HashMap<String, VecDeque<OverallState>>,
    /// When each crew snapshot was recorded.
    pub timestamps: VecDeque<Instant>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one crew status refresh.
    pub fn record(&mut self, members: &[CrewMember]) {
        if members.is_empty() {
            return;
        }

        for member in members {
            let states = self.states.entry(member.astronaut_id.clone()).or_default();
            states.push_back(member.status);
            if states.len() > MAX_HISTORY_SIZE {
                states.pop_front();
            }
        }

        self.timestamps.push_back(Instant::now());
        if self.timestamps.len() > MAX_HISTORY_SIZE {
            self.timestamps.pop_front();
        }
    }

    /// States recorded for one astronaut, oldest first.
    pub fn timeline(&self, astronaut_id: &str) -> Vec<OverallState> {
        self.states
            .get(astronaut_id)
            .map(|states| states.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Count of refreshes in which the astronaut was CRITICO.
    pub fn critical_count(&self, astronaut_id: &str) -> usize {
        self.states
            .get(astronaut_id)
            .map(|states| states.iter().filter(|s| **s == OverallState::Critico).count())
            .unwrap_or(0)
    }

    /// When the last refresh was recorded.
    pub fn last_recorded(&self) -> Option<Instant> {
        self.timestamps.back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str, status: OverallState) -> CrewMember {
        CrewMember {
            astronaut_id: id.to_string(),
            name: id.to_string(),
            codename: String::new(),
            status,
            color: String::new(),
            last_update: String::new(),
        }
    }

    #[test]
    fn test_record_appends_per_astronaut() {
        let mut history = History::new();
        history.record(&[member("a1", OverallState::Optimo), member("a2", OverallState::Critico)]);
        history.record(&[member("a1", OverallState::Critico)]);

        assert_eq!(
            history.timeline("a1"),
            vec![OverallState::Optimo, OverallState::Critico]
        );
        assert_eq!(history.critical_count("a2"), 1);
        assert!(history.timeline("a9").is_empty());
        assert_eq!(history.timestamps.len(), 2);
    }

    #[test]
    fn test_record_is_capped() {
        let mut history = History::new();
        for _ in 0..MAX_HISTORY_SIZE + 5 {
            history.record(&[member("a1", OverallState::Estresado)]);
        }
        assert_eq!(history.timeline("a1").len(), MAX_HISTORY_SIZE);
        assert_eq!(history.timestamps.len(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_empty_refresh_is_ignored() {
        let mut history = History::new();
        history.record(&[]);
        assert!(history.last_recorded().is_none());
    }
}
