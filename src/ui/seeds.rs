//! Seeds view rendering.
//!
//! Gateway connectivity, seed status, the seed actions and the astronauts
//! reported by the test endpoint.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::gateway::{format_timestamp, SeedKind};
use crate::source::QueryKey;
use crate::ui::common::render_placeholder;

/// Seed actions in display order with their key and description.
const SEED_ACTIONS: [(SeedKind, char, &str); 3] = [
    (SeedKind::All, 'A', "Profiles and monitoring history, in sequence"),
    (SeedKind::Profiles, 'P', "Six astronauts with baseline metrics and thresholds"),
    (SeedKind::Monitoring, 'M', "Monitoring history for the last seven days"),
];

/// Render the Seeds view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).split(area);
    let left = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Min(6),
    ])
    .split(columns[0]);

    render_connection(frame, app, left[0]);
    render_seed_status(frame, app, left[1]);
    render_actions(frame, app, left[2]);
    render_astronauts(frame, app, columns[1]);
}

fn block(app: &App, title: &str, border: ratatui::style::Color) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(border))
}

fn render_connection(frame: &mut Frame, app: &App, area: Rect) {
    let Some(test) = app.store.test_endpoint() else {
        render_placeholder(frame, app, area, &QueryKey::TestEndpoint, "Gateway");
        return;
    };

    let (label, color) = if test.success {
        ("API CONNECTED", app.theme.optimal)
    } else {
        ("API NOT READY", app.theme.stressed)
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(" ● ", Style::default().fg(color)),
            Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", app.source_description()), app.theme.muted_style()),
        ]),
        Line::from(format!(" {}", test.message)),
        Line::from(Span::styled(
            format!(" {}", format_timestamp(&test.timestamp)),
            app.theme.muted_style(),
        )),
    ];

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block(app, "Gateway", color)),
        area,
    );
}

fn render_seed_status(frame: &mut Frame, app: &App, area: Rect) {
    let Some(status) = app.store.seed_status() else {
        render_placeholder(frame, app, area, &QueryKey::SeedStatus, "Seed Status");
        return;
    };

    let lines = vec![
        Line::from(format!(" {}", status.message)),
        Line::from(Span::styled(
            format!(" {}", format_timestamp(&status.timestamp)),
            app.theme.muted_style(),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(block(app, "Seed Status", app.theme.border)),
        area,
    );
}

fn render_actions(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    for (kind, key, description) in SEED_ACTIONS {
        let state = if app.seed_running(kind) {
            Span::styled(" running...", Style::default().fg(app.theme.stressed))
        } else {
            Span::raw("")
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" [{}] ", key), Style::default().fg(app.theme.highlight)),
            Span::styled(kind.label(), Style::default().add_modifier(Modifier::BOLD)),
            state,
        ]));
        lines.push(Line::from(Span::styled(
            format!("     {}", description),
            app.theme.muted_style(),
        )));
    }

    if let Some((kind, ref result)) = app.last_seed {
        lines.push(Line::from(""));
        let line = match result {
            Ok(outcome) if outcome.success => Span::styled(
                format!(" Last run ({}): {}", kind.label(), outcome.message),
                Style::default().fg(app.theme.optimal),
            ),
            Ok(outcome) => Span::styled(
                format!(" Last run ({}) failed: {}", kind.label(), outcome.message),
                Style::default().fg(app.theme.critical),
            ),
            Err(e) => Span::styled(
                format!(" Last run ({}) failed: {}", kind.label(), e.report().message),
                Style::default().fg(app.theme.critical),
            ),
        };
        lines.push(Line::from(line));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Seeds overwrite existing data in the gateway database",
        Style::default().fg(app.theme.stressed),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block(app, "Run Seeds", app.theme.border)),
        area,
    );
}

fn render_astronauts(frame: &mut Frame, app: &App, area: Rect) {
    let names = app
        .store
        .test_endpoint()
        .and_then(|t| t.data.as_ref())
        .map(|d| d.astronauts.as_slice())
        .unwrap_or(&[]);

    let items: Vec<ListItem> = if names.is_empty() {
        vec![ListItem::new(Span::styled(" No astronauts reported", app.theme.muted_style()))]
    } else {
        names.iter().map(|n| ListItem::new(format!(" {}", n))).collect()
    };

    let list = List::new(items)
        .block(block(app, &format!("Available Astronauts ({})", names.len()), app.theme.border))
        .highlight_style(app.theme.selected);

    let mut state = ListState::default();
    if !names.is_empty() {
        state.select(Some(app.selected_index.min(names.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
