//! Terminal UI rendering using ratatui.
//!
//! This module contains all the view-specific rendering logic for the TUI.
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`dashboard`]: Crew table, crew statistics, active alerts, current readings
//! - [`astronauts`]: Filterable astronaut profile table
//! - [`statistics`]: State distribution, performance and per-astronaut scores
//! - [`monitoring`]: Live crew status with state timeline strips
//! - [`reports`]: Date range form, report summary and rows
//! - [`seeds`]: Gateway connectivity and seed actions
//! - [`detail`]: Modal overlay for the selected astronaut
//! - [`alert`]: The crew alert modal
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (dashboard/astronauts/...::render)   │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top, in order:
//!    - detail::render_overlay
//!    - common::render_help
//!    - alert::render_modal
//! ```

pub mod alert;
pub mod astronauts;
pub mod common;
pub mod dashboard;
pub mod detail;
pub mod monitoring;
pub mod reports;
pub mod seeds;
pub mod statistics;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal width for the layout.
pub const MIN_WIDTH: u16 = 60;
/// Minimum terminal height for the layout.
pub const MIN_HEIGHT: u16 = 12;

/// Draw one frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nPress 'q' to quit",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg).style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(paragraph, area);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Tabs
        Constraint::Min(5),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Dashboard => dashboard::render(frame, app, chunks[2]),
        View::Astronauts => astronauts::render(frame, app, chunks[2]),
        View::Statistics => statistics::render(frame, app, chunks[2]),
        View::Monitoring => monitoring::render(frame, app, chunks[2]),
        View::Reports => reports::render(frame, app, chunks[2]),
        View::Seeds => seeds::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }

    alert::render_modal(frame, app, area);
}
