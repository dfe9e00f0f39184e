//! Statistics view rendering.
//!
//! Crew-wide distribution and performance on top; per-astronaut scores
//! below, with the statistics of the selected astronaut alongside.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::gateway::{AstronautProfile, AstronautStatistics, CrewStatistics, OverallState};
use crate::source::QueryKey;
use crate::ui::common::{filter_info, format_count, render_placeholder};

/// Width of the distribution bars.
const BAR_WIDTH: usize = 24;

/// Render the Statistics view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(9), Constraint::Min(6)]).split(area);

    match app.store.crew_statistics() {
        Some(stats) => render_crew(frame, app, stats, chunks[0]),
        None => render_placeholder(frame, app, chunks[0], &QueryKey::CrewStatistics, "Crew Statistics"),
    }

    let bottom = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(chunks[1]);

    match app.store.profiles() {
        Some(profiles) => render_scores(frame, app, profiles, bottom[0]),
        None => render_placeholder(frame, app, bottom[0], &QueryKey::Profiles, "Astronauts"),
    }

    render_selected(frame, app, bottom[1]);
}

/// Horizontal bar of `pct` percent.
pub fn bar(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn distribution_row(app: &App, state: OverallState, count: u64, pct: f64) -> Line<'static> {
    let style = app.theme.state_style(state);
    Line::from(vec![
        Span::styled(format!(" {:<10}", state.code()), style),
        Span::styled(bar(pct, BAR_WIDTH), style),
        Span::raw(format!(" {:>5.1}% ({})", pct, format_count(count))),
    ])
}

fn render_crew(frame: &mut Frame, app: &App, stats: &CrewStatistics, area: Rect) {
    let halves = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).split(area);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let counts = &stats.overall_state_counts;
    let pct = &stats.overall_percentages;
    let distribution = vec![
        Line::from(vec![
            Span::raw(" Records: "),
            Span::styled(format_count(stats.total_records), bold),
            Span::raw("   Astronauts: "),
            Span::styled(
                format!("{}/{}", stats.active_astronauts, stats.total_astronauts),
                bold,
            ),
            Span::raw(" active"),
        ]),
        Line::from(""),
        distribution_row(app, OverallState::Optimo, counts.optimo, pct.optimo),
        distribution_row(app, OverallState::Estresado, counts.estresado, pct.estresado),
        distribution_row(app, OverallState::Critico, counts.critico, pct.critico),
    ];

    let block = Block::default()
        .title(" State Distribution ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(distribution).block(block), halves[0]);

    let performance = &stats.crew_performance;
    let or_unavailable = |s: &str| {
        if s.is_empty() {
            "Not available".to_string()
        } else {
            s.to_string()
        }
    };
    let lines = vec![
        Line::from(vec![
            Span::raw(" Average score:   "),
            Span::styled(format!("{:.1}", performance.average_score), bold),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Best performer:  "),
            Span::styled(
                or_unavailable(&performance.best_performer),
                Style::default().fg(app.theme.optimal),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Needs attention: "),
            Span::styled(
                or_unavailable(&performance.needs_attention),
                Style::default().fg(app.theme.critical),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} .. {}", stats.time_range.start, stats.time_range.end),
            app.theme.muted_style(),
        )),
    ];

    let block = Block::default()
        .title(" Crew Performance ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(lines).block(block), halves[1]);
}

fn render_scores(frame: &mut Frame, app: &App, all: &[AstronautProfile], area: Rect) {
    let profiles: Vec<&AstronautProfile> = all.iter().filter(|p| p.matches(&app.filter_text)).collect();
    let scores = app.store.crew_statistics().map(|s| s.astronaut_stats.as_slice()).unwrap_or(&[]);

    let header = Row::new(vec!["Astronaut", "Score", "OPT", "EST", "CRI"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = profiles
        .iter()
        .map(|p| {
            let score = scores.iter().find(|s| s.astronaut_id == p.astronaut_id);
            let cell = |v: Option<u64>| Cell::from(v.map(|n| n.to_string()).unwrap_or_else(|| "-".into()));
            Row::new(vec![
                Cell::from(format!("{} ({})", p.full_name, p.codename)),
                Cell::from(
                    score
                        .map(|s| format!("{:.1}", s.performance_score))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                cell(score.map(|s| s.state_counts.optimo)),
                cell(score.map(|s| s.state_counts.estresado)),
                cell(score.map(|s| s.state_counts.critico)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
    ];

    let title = format!(" Astronauts ({}/{}){} ", profiles.len(), all.len(), filter_info(app));
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
        state.select(Some(app.selected_index.min(profiles.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_selected(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Selected Astronaut ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(id) = app.selected_astronaut.as_deref() else {
        let hint = Paragraph::new(Line::from(Span::styled(
            " Press Enter on an astronaut",
            app.theme.muted_style(),
        )))
        .block(block);
        frame.render_widget(hint, area);
        return;
    };

    match app.store.astronaut_statistics(id) {
        Some(stats) => frame.render_widget(Paragraph::new(statistics_lines(app, stats)).block(block), area),
        None => render_placeholder(
            frame,
            app,
            area,
            &QueryKey::AstronautStatistics(id.to_string()),
            "Selected Astronaut",
        ),
    }
}

/// Summary lines for one astronaut's statistics. Shared with the detail overlay.
pub fn statistics_lines(app: &App, stats: &AstronautStatistics) -> Vec<Line<'static>> {
    let body = &stats.statistics;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let metrics = &body.average_metrics;
    let alerts = &body.alert_history;

    vec![
        Line::from(vec![
            Span::styled(format!(" {} ", stats.full_name), bold),
            Span::styled(stats.codename.clone(), app.theme.muted_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Records: "),
            Span::styled(format_count(body.total_records), bold),
            Span::raw("   Score: "),
            Span::styled(format!("{:.1}", body.performance_score), bold),
        ]),
        Line::from(vec![
            Span::raw(" Alerts: "),
            Span::styled(alerts.total_alerts.to_string(), bold),
            Span::raw(" ("),
            Span::styled(
                format!("{} critical", alerts.critical_alerts),
                Style::default().fg(app.theme.critical),
            ),
            Span::raw(", "),
            Span::styled(
                format!("{} stress", alerts.stress_alerts),
                Style::default().fg(app.theme.stressed),
            ),
            Span::raw(")"),
        ]),
        Line::from(""),
        Line::from(format!(
            " Eyes {:.2}  Tension {:.2}  Pallor {:.2}",
            metrics.eye_opening, metrics.tension_expressions, metrics.pallor
        )),
        Line::from(format!(
            " Focus {:.2}  Concentration {:.2}  EAR {:.3}",
            metrics.focus, metrics.concentration, metrics.ear
        )),
        Line::from(""),
        distribution_row(
            app,
            OverallState::Optimo,
            body.state_counts.optimo,
            body.state_percentages.optimo,
        ),
        distribution_row(
            app,
            OverallState::Estresado,
            body.state_counts.estresado,
            body.state_percentages.estresado,
        ),
        distribution_row(
            app,
            OverallState::Critico,
            body.state_counts.critico,
            body.state_percentages.critico,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.0, 4), "░░░░");
        assert_eq!(bar(50.0, 4), "██░░");
        assert_eq!(bar(250.0, 4), "████");
    }
}
