//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, help overlay
//! and the placeholder panel shown while a query is loading or failed.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, InputMode, View};
use crate::data::duration::format_elapsed;
use crate::gateway::OverallState;
use crate::source::QueryKey;

/// Render the header bar with the crew overview.
///
/// Displays: overall indicator, member counts by state, crew size, clock.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let clock = chrono::Local::now().format("%H:%M:%S").to_string();

    let Some(crew) = app.store.crew_status() else {
        let line = Line::from(vec![
            Span::styled(" CREWWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("│ Loading crew status... │ "),
            Span::raw(clock),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let count = |state: OverallState| crew.crew_members.iter().filter(|m| m.status == state).count();
    let optimal = count(OverallState::Optimo);
    let stressed = count(OverallState::Estresado);
    let critical = count(OverallState::Critico);

    let worst = if critical > 0 {
        OverallState::Critico
    } else if stressed > 0 {
        OverallState::Estresado
    } else {
        OverallState::Optimo
    };

    let dim = Style::default().add_modifier(Modifier::DIM);
    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.state_style(worst)),
        Span::styled("CREWWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(optimal.to_string(), app.theme.state_style(OverallState::Optimo)),
        Span::raw(" ok "),
        if stressed > 0 {
            Span::styled(stressed.to_string(), app.theme.state_style(OverallState::Estresado))
        } else {
            Span::styled("0", dim)
        },
        Span::raw(" stress "),
        if critical > 0 {
            Span::styled(critical.to_string(), app.theme.state_style(OverallState::Critico))
        } else {
            Span::styled("0", dim)
        },
        Span::raw(" crit │ "),
        Span::styled(
            crew.crew_members.len().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" crew │ "),
        Span::raw(clock),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format an optional metric, `N/A` when absent.
pub fn format_metric(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: data source, time since the last crew refresh, auto refresh
/// state, available controls. Temporary messages and errors take over.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let paragraph = Paragraph::new(format!(" Error: {} | q:quit", err))
            .style(Style::default().fg(app.theme.critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let updated = app
        .history
        .last_recorded()
        .map(|at| format!("Updated {}", format_elapsed(at.elapsed())))
        .unwrap_or_else(|| "Waiting for data".to_string());

    let refresh = if app.auto_refresh { "auto" } else { "paused" };
    let loading = if app.store.any_loading() { " | Loading..." } else { "" };

    let controls = match app.input_mode {
        InputMode::Filter => "Type to search | Enter:apply Esc:cancel",
        InputMode::ReportStart | InputMode::ReportEnd => "YYYY-MM-DD | Enter:done Esc:cancel",
        InputMode::Normal => match app.current_view {
            View::Dashboard | View::Monitoring => "↑↓:select Enter:detail /:search ?:help q:quit",
            View::Astronauts | View::Statistics => "↑↓:select Enter:detail /:search c:clear ?:help q:quit",
            View::Reports => "s/e:dates g:generate x:export ?:help q:quit",
            View::Seeds => "A:all P:profiles M:monitoring ?:help q:quit",
        },
    };

    let status = format!(
        " {} | {} | refresh:{}{} | {}",
        app.source_description(),
        updated,
        refresh,
        loading,
        controls,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Title suffix describing the active filter.
pub fn filter_info(app: &App) -> String {
    if app.input_mode == InputMode::Filter {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    }
}

/// Center a `width` x `height` box inside `area`, shrinking to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the panel for a query that has no data to show yet.
///
/// Failed queries show the error message and, when the gateway sent a
/// structured body, its pretty-printed details.
pub fn render_placeholder(frame: &mut Frame, app: &App, area: Rect, key: &QueryKey, title: &str) {
    let mut lines = Vec::new();
    let border = if let Some(err) = app.store.error(key) {
        let report = err.report();
        lines.push(Line::from(Span::styled(
            format!(" {}", report.message),
            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
        )));
        if let Some(details) = report.details {
            lines.push(Line::from(""));
            lines.extend(details.lines().map(|l| Line::from(format!(" {}", l))));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" r:retry", app.theme.muted_style())));
        app.theme.critical
    } else {
        lines.push(Line::from(Span::styled(" Loading...", app.theme.muted_style())));
        app.theme.border
    };

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(border));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1-6 Tab     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Astronaut detail"),
        Line::from("  Esc         Close overlay"),
        Line::from(""),
        section(" Alerts"),
        Line::from("  Enter/Esc   Acknowledge"),
        Line::from("  d           View details"),
        Line::from(""),
        section(" Views"),
        Line::from("  /  c        Search, clear search"),
        Line::from("  A  P  M     Run seeds (Seeds)"),
        Line::from("  s  e        Report dates (Reports)"),
        Line::from("  g  x        Generate, export"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Refresh now"),
        Line::from("  a           Toggle auto refresh"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_area = centered_rect(42, 29, area);
    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234), "1.2K");
        assert_eq!(format_count(2_500_000), "2.5M");
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Some(0.456)), "0.46");
        assert_eq!(format_metric(None), "N/A");
    }

    #[test]
    fn test_centered_rect_fits_area() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = centered_rect(42, 29, area);
        assert_eq!(rect.width, 26);
        assert_eq!(rect.height, 8);
        assert_eq!(rect.x, 2);
        assert_eq!(rect.y, 1);
    }
}
