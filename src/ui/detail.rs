//! Detail overlay rendering.
//!
//! Displays a modal overlay with the current status, statistics and recent
//! monitoring history of the selected astronaut.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, DETAIL_HISTORY_LIMIT};
use crate::gateway::{format_timestamp, AstronautMonitoring, HistoryParams};
use crate::source::QueryKey;
use crate::ui::common::{format_metric, render_placeholder};
use crate::ui::statistics::statistics_lines;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the astronaut detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(id) = app.selected_astronaut.as_deref() else {
        return;
    };

    // Width: 95% of screen, clamped to [MIN_OVERLAY_WIDTH, 110]
    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    // Height: 90% of screen, clamped to [MIN_OVERLAY_HEIGHT, 50]
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(14),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .split(overlay_area);
    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(chunks[0]);

    match app.store.astronaut_status(id) {
        Some(status) => render_status(frame, app, status, top[0]),
        None => render_placeholder(
            frame,
            app,
            top[0],
            &QueryKey::AstronautStatus(id.to_string()),
            "Current Status",
        ),
    }

    match app.store.astronaut_statistics(id) {
        Some(stats) => {
            let block = Block::default()
                .title(" Statistics ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.highlight));
            frame.render_widget(Paragraph::new(statistics_lines(app, stats)).block(block), top[1]);
        }
        None => render_placeholder(
            frame,
            app,
            top[1],
            &QueryKey::AstronautStatistics(id.to_string()),
            "Statistics",
        ),
    }

    let params = HistoryParams::latest(DETAIL_HISTORY_LIMIT);
    match app.store.history(id, &params) {
        Some(records) => render_history(frame, app, records, chunks[1]),
        None => render_placeholder(
            frame,
            app,
            chunks[1],
            &QueryKey::History {
                astronaut_id: id.to_string(),
                params,
            },
            "History",
        ),
    }

    let footer = Paragraph::new(" Esc:close  r:refresh ").style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(Clear, chunks[2]);
    frame.render_widget(footer, chunks[2]);
}

fn render_status(frame: &mut Frame, app: &App, status: &AstronautMonitoring, area: Rect) {
    let state_style = app.theme.state_style(status.overall_state);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", status.astronaut_name), bold),
            Span::styled(status.codename.clone(), app.theme.muted_style()),
        ]),
        Line::from(vec![
            Span::raw(" State: "),
            Span::styled(status.overall_state.code(), state_style),
            Span::raw(
                status
                    .state_description
                    .as_deref()
                    .map(|d| format!("  {}", d))
                    .unwrap_or_default(),
            ),
        ]),
        Line::from(format!(
            " Emotion: {}  ({})",
            status.dominant_emotion.as_deref().unwrap_or("N/A"),
            format_metric(status.emotion_confidence),
        )),
        Line::from(""),
        Line::from(format!(
            " Eyes {}  Tension {}  Pallor {}",
            format_metric(status.eye_opening),
            format_metric(status.tension_expressions),
            format_metric(status.pallor),
        )),
        Line::from(format!(
            " Focus {}  Concentration {}  EAR {}",
            format_metric(status.focus),
            format_metric(status.concentration),
            format_metric(status.ear),
        )),
    ];

    if let Some(alerts) = status.active_alerts.as_ref().filter(|a| !a.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" Alerts: {}", alerts.join(", ")),
            Style::default().fg(app.theme.critical),
        )));
    }
    if let Some(actions) = status.recommended_actions.as_ref().filter(|a| !a.is_empty()) {
        lines.push(Line::from(" Recommended:"));
        lines.extend(actions.iter().map(|a| Line::from(format!("  - {}", a))));
    }

    lines.push(Line::from(Span::styled(
        format!(" {}", format_timestamp(&status.timestamp)),
        app.theme.muted_style(),
    )));

    let block = Block::default()
        .title(" Current Status ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(state_style);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

fn render_history(frame: &mut Frame, app: &App, records: &[AstronautMonitoring], area: Rect) {
    let header = Row::new(vec!["Timestamp", "State", "Emotion", "Eyes", "Focus", "Concentration"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = records
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(format_timestamp(&r.timestamp)),
                Cell::from(r.overall_state.code()).style(app.theme.state_style(r.overall_state)),
                Cell::from(r.dominant_emotion.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(format_metric(r.eye_opening)),
                Cell::from(format_metric(r.focus)),
                Cell::from(format_metric(r.concentration)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Length(10),
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(13),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(format!(" History (last {}) ", records.len()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(table, area);
}
