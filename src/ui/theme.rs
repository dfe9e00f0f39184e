//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::AlertKind;
use crate::gateway::OverallState;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// OPTIMO.
    pub optimal: Color,
    /// ESTRESADO.
    pub stressed: Color,
    /// CRITICO.
    pub critical: Color,
    /// States the gateway did not report.
    pub unknown: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Secondary text (timestamps, hints).
    pub muted: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            optimal: Color::Green,
            stressed: Color::Yellow,
            critical: Color::Red,
            unknown: Color::Gray,
            border: Color::Gray,
            muted: Color::DarkGray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            optimal: Color::Green,
            stressed: Color::Rgb(180, 120, 0),
            critical: Color::Red,
            unknown: Color::DarkGray,
            border: Color::DarkGray,
            muted: Color::Gray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color for a crew state.
    pub fn state_color(&self, state: OverallState) -> Color {
        match state {
            OverallState::Optimo => self.optimal,
            OverallState::Estresado => self.stressed,
            OverallState::Critico => self.critical,
            OverallState::Unknown => self.unknown,
        }
    }

    /// Get style for a crew state
    pub fn state_style(&self, state: OverallState) -> Style {
        let style = Style::default().fg(self.state_color(state));
        if state == OverallState::Critico {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Border and title style of the alert modal.
    pub fn alert_style(&self, kind: AlertKind) -> Style {
        let color = match kind {
            AlertKind::Critical => self.critical,
            AlertKind::Stressed => self.stressed,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_styles() {
        let theme = Theme::dark();
        assert_eq!(theme.state_style(OverallState::Optimo).fg, Some(Color::Green));
        assert!(theme
            .state_style(OverallState::Critico)
            .add_modifier
            .contains(Modifier::BOLD));
        assert_eq!(theme.alert_style(AlertKind::Stressed).fg, Some(Color::Yellow));
    }
}
