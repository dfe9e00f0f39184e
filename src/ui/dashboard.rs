//! Dashboard view rendering.
//!
//! Crew table on the left, crew statistics and active alerts on the right,
//! current readings per astronaut underneath.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::gateway::{format_timestamp, Alert, DashboardData, StateCounts};
use crate::source::QueryKey;
use crate::ui::common::{format_count, render_placeholder};

/// Render the Dashboard view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(dashboard) = app.store.dashboard() else {
        render_placeholder(frame, app, area, &QueryKey::Dashboard, "Dashboard");
        return;
    };

    let rows = Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).split(area);
    let top = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).split(rows[0]);
    let side = Layout::vertical([Constraint::Length(7), Constraint::Min(3)]).split(top[1]);

    render_crew(frame, app, dashboard, top[0]);
    render_statistics(frame, app, dashboard, side[0]);

    // The standalone alerts query refreshes on its own; fall back to the
    // copy embedded in the dashboard document.
    let alerts = app.store.active_alerts().unwrap_or(dashboard.active_alerts.as_slice());
    render_alerts(frame, app, alerts, side[1]);
    render_readings(frame, app, dashboard, rows[1]);
}

fn render_crew(frame: &mut Frame, app: &App, dashboard: &DashboardData, area: Rect) {
    let header = Row::new(vec!["Astronaut", "Codename", "Status", "Last update"])
        .height(1)
        .style(app.theme.header);

    let members = &dashboard.crew_status.crew_members;
    let rows: Vec<Row> = members
        .iter()
        .map(|m| {
            Row::new(vec![
                Cell::from(m.name.clone()),
                Cell::from(m.codename.clone()),
                Cell::from(m.status.code()).style(app.theme.state_style(m.status)),
                Cell::from(format_timestamp(&m.last_update)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(10),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Crew Members ({}) ", members.len()))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !members.is_empty() {
        state.select(Some(app.selected_index.min(members.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn distribution_line<'a>(app: &App, counts: &StateCounts) -> Line<'a> {
    use crate::gateway::OverallState::*;
    Line::from(vec![
        Span::raw(" "),
        Span::styled(format!("OPTIMO {}", format_count(counts.optimo)), app.theme.state_style(Optimo)),
        Span::raw("  "),
        Span::styled(
            format!("ESTRESADO {}", format_count(counts.estresado)),
            app.theme.state_style(Estresado),
        ),
        Span::raw("  "),
        Span::styled(format!("CRITICO {}", format_count(counts.critico)), app.theme.state_style(Critico)),
    ])
}

fn render_statistics(frame: &mut Frame, app: &App, dashboard: &DashboardData, area: Rect) {
    let stats = &dashboard.crew_statistics;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::raw(" Total records:      "),
            Span::styled(format_count(stats.total_records), bold),
        ]),
        Line::from(vec![
            Span::raw(" Unique astronauts:  "),
            Span::styled(stats.unique_astronauts.to_string(), bold),
        ]),
        Line::from(""),
        distribution_line(app, &stats.state_counts),
    ];

    let block = Block::default()
        .title(" Crew Statistics ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_alerts(frame: &mut Frame, app: &App, alerts: &[Alert], area: Rect) {
    let items: Vec<ListItem> = if alerts.is_empty() {
        vec![ListItem::new(Span::styled(" No active alerts", app.theme.muted_style()))]
    } else {
        alerts
            .iter()
            .map(|a| {
                let description = if a.description.is_empty() {
                    "No description"
                } else {
                    &a.description
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            format!(" {} ", a.astronaut_name),
                            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(description.to_string()),
                    ]),
                    Line::from(Span::styled(
                        format!("   {}", format_timestamp(&a.timestamp)),
                        app.theme.muted_style(),
                    )),
                ])
            })
            .collect()
    };

    let border = if alerts.is_empty() { app.theme.border } else { app.theme.critical };
    let list = List::new(items).block(
        Block::default()
            .title(format!(" Active Alerts ({}) ", alerts.len()))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(list, area);
}

fn percent(value: f64) -> String {
    if value > 0.0 {
        format!("{:.0}%", value)
    } else {
        "N/A".to_string()
    }
}

fn render_readings(frame: &mut Frame, app: &App, dashboard: &DashboardData, area: Rect) {
    let header = Row::new(vec!["Astronaut", "State", "Eyes", "Focus", "Concentration", "Tension", "At"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = dashboard
        .astronaut_statuses
        .iter()
        .map(|a| {
            let reading = &a.current_status;
            Row::new(vec![
                Cell::from(format!("{} ({})", a.full_name, a.codename)),
                Cell::from(reading.overall_state.code()).style(app.theme.state_style(reading.overall_state)),
                Cell::from(percent(reading.eye_opening)),
                Cell::from(percent(reading.focus)),
                Cell::from(percent(reading.concentration)),
                Cell::from(percent(reading.tension_expressions)),
                Cell::from(format_timestamp(&reading.timestamp)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(13),
        Constraint::Length(8),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(" Current Readings ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_treats_zero_as_missing() {
        assert_eq!(percent(0.0), "N/A");
        assert_eq!(percent(72.4), "72%");
    }
}
