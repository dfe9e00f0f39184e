//! Monitoring view rendering.
//!
//! Live crew status with one state timeline strip per astronaut.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::history::MAX_HISTORY_SIZE;
use crate::gateway::{format_timestamp, CrewMember, CrewStatus, OverallState};
use crate::source::QueryKey;
use crate::ui::common::{filter_info, render_placeholder};
use crate::ui::theme::Theme;

/// Block character per recorded state, newest on the right.
pub fn timeline_spans(theme: &Theme, states: &[OverallState], width: usize) -> Vec<Span<'static>> {
    let skip = states.len().saturating_sub(width);
    states[skip..]
        .iter()
        .map(|s| {
            let glyph = if *s == OverallState::Unknown { "·" } else { "█" };
            Span::styled(glyph, Style::default().fg(theme.state_color(*s)))
        })
        .collect()
}

/// Render the Monitoring view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(crew) = app.store.crew_status() else {
        render_placeholder(frame, app, area, &QueryKey::CrewStatus, "Crew Status");
        return;
    };

    let chunks = Layout::vertical([Constraint::Length(4), Constraint::Min(5)]).split(area);
    render_summary(frame, app, crew, chunks[0]);
    render_crew(frame, app, crew, chunks[1]);
}

fn render_summary(frame: &mut Frame, app: &App, crew: &CrewStatus, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut counts = vec![
        Span::raw(" Crew "),
        Span::styled(crew.total_members.to_string(), bold),
        Span::raw("  "),
        Span::styled(
            format!("OPTIMO {}", crew.optimal_count),
            app.theme.state_style(OverallState::Optimo),
        ),
        Span::raw("  "),
        Span::styled(
            format!("ESTRESADO {}", crew.stressed_count),
            app.theme.state_style(OverallState::Estresado),
        ),
        Span::raw("  "),
        Span::styled(
            format!("CRITICO {}", crew.critical_count),
            app.theme.state_style(OverallState::Critico),
        ),
    ];
    if crew.unknown_count > 0 {
        counts.push(Span::raw(format!("  UNKNOWN {}", crew.unknown_count)));
    }
    counts.push(Span::styled(
        format!("  │ {}", format_timestamp(&crew.timestamp)),
        app.theme.muted_style(),
    ));

    let mut notes: Vec<String> = crew.crew_alerts.clone().unwrap_or_default();
    if let Some(ref text) = crew.crew_notes {
        if !text.is_empty() {
            notes.push(text.clone());
        }
    }
    let notes_line = if notes.is_empty() {
        Line::from(Span::styled(" No crew notes", app.theme.muted_style()))
    } else {
        Line::from(Span::styled(
            format!(" {}", notes.join(" | ")),
            Style::default().fg(app.theme.stressed),
        ))
    };

    let block = Block::default()
        .title(" Crew Status ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(
        Paragraph::new(vec![Line::from(counts), notes_line])
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

fn render_crew(frame: &mut Frame, app: &App, crew: &CrewStatus, area: Rect) {
    let members: Vec<&CrewMember> = crew
        .crew_members
        .iter()
        .filter(|m| app.matches_filter(&m.name) || app.matches_filter(&m.codename))
        .collect();

    let header = Row::new(vec!["Astronaut", "Codename", "Status", "Crit", "Timeline"])
        .height(1)
        .style(app.theme.header);

    // Fixed columns take roughly 48 cells including borders
    let strip_width = (area.width as usize).saturating_sub(48).clamp(8, MAX_HISTORY_SIZE);

    let rows: Vec<Row> = members
        .iter()
        .map(|m| {
            let timeline = app.history.timeline(&m.astronaut_id);
            let critical = app.history.critical_count(&m.astronaut_id);
            let critical_cell = if critical > 0 {
                Cell::from(critical.to_string()).style(app.theme.state_style(OverallState::Critico))
            } else {
                Cell::from("-")
            };
            Row::new(vec![
                Cell::from(m.name.clone()),
                Cell::from(m.codename.clone()),
                Cell::from(m.status.code()).style(app.theme.state_style(m.status)),
                critical_cell,
                Cell::from(Line::from(timeline_spans(&app.theme, &timeline, strip_width))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(5),
        Constraint::Fill(3),
    ];

    let title = format!(
        " Crew Members ({}/{}){} ",
        members.len(),
        crew.crew_members.len(),
        filter_info(app)
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
    if !members.is_empty() {
        state.select(Some(app.selected_index.min(members.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_keeps_newest() {
        let theme = Theme::dark();
        let states = [
            OverallState::Optimo,
            OverallState::Estresado,
            OverallState::Critico,
        ];
        let spans = timeline_spans(&theme, &states, 2);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].style.fg, Some(theme.stressed));
        assert_eq!(spans[1].style.fg, Some(theme.critical));
    }

    #[test]
    fn test_timeline_marks_unknown() {
        let theme = Theme::dark();
        let spans = timeline_spans(&theme, &[OverallState::Unknown], 10);
        assert_eq!(spans[0].content, "·");
    }
}
