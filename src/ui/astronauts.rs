//! Astronauts view rendering.
//!
//! Filterable table of astronaut profiles.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::gateway::{format_timestamp, AstronautProfile, OverallState};
use crate::source::QueryKey;
use crate::ui::common::{filter_info, render_placeholder};

/// Render the Astronauts view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(all) = app.store.profiles() else {
        render_placeholder(frame, app, area, &QueryKey::Profiles, "Astronauts");
        return;
    };

    let profiles: Vec<&AstronautProfile> = all.iter().filter(|p| p.matches(&app.filter_text)).collect();

    let header = Row::new(vec!["", "Name", "Codename", "Status", "Monitoring", "Last seen"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = profiles
        .iter()
        .map(|p| {
            let status = p.current_status.unwrap_or(OverallState::Unknown);
            let monitoring = if p.is_monitoring {
                Span::styled("active", Style::default().fg(app.theme.optimal))
            } else {
                Span::styled("idle", app.theme.muted_style())
            };
            let last_seen = p
                .last_seen
                .as_deref()
                .or(p.status_last_updated.as_deref())
                .map(format_timestamp)
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(p.initials()),
                Cell::from(p.full_name.clone()),
                Cell::from(p.codename.clone()),
                Cell::from(status.code()).style(app.theme.state_style(status)),
                Cell::from(monitoring),
                Cell::from(last_seen),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(20),
    ];

    let selected = app.selected_index.min(profiles.len().saturating_sub(1));
    let position_info = if !profiles.is_empty() {
        format!(" [{}/{}]", selected + 1, profiles.len())
    } else {
        String::new()
    };

    let title = format!(
        " Astronauts ({}/{}){}{} ",
        profiles.len(),
        all.len(),
        filter_info(app),
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !profiles.is_empty() {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
