//! Reports view rendering.
//!
//! Date range form, summary of the generated report and the first rows of
//! report data.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, InputMode, REPORT_ROW_LIMIT};
use crate::gateway::{format_timestamp, OverallState, ReportRange, ReportRecord, ReportSummary};
use crate::source::QueryKey;
use crate::ui::common::{format_count, format_metric, render_placeholder};

/// Render the Reports view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(8),
        Constraint::Min(5),
    ])
    .split(area);

    render_form(frame, app, chunks[0]);

    let Some(range) = app.report.range else {
        let hint = Paragraph::new(Line::from(Span::styled(
            " Set both dates with s / e, then press g to generate",
            app.theme.muted_style(),
        )))
        .block(
            Block::default()
                .title(" Report ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        );
        frame.render_widget(hint, chunks[1].union(chunks[2]));
        return;
    };

    match app.store.report_summary(&range) {
        Some(summary) => render_summary(frame, app, summary, chunks[1]),
        None => render_placeholder(frame, app, chunks[1], &QueryKey::ReportSummary(range), "Summary"),
    }

    match app.store.report_data(&range) {
        Some(rows) => render_rows(frame, app, range, rows, chunks[2]),
        None => render_placeholder(frame, app, chunks[2], &QueryKey::ReportData(range), "Report Data"),
    }
}

fn date_field<'a>(app: &App, label: &'a str, value: &str, editing: bool) -> Vec<Span<'a>> {
    let shown = if value.is_empty() && !editing {
        "YYYY-MM-DD".to_string()
    } else if editing {
        format!("{}_", value)
    } else {
        value.to_string()
    };
    let style = if editing {
        Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD)
    } else if value.is_empty() {
        app.theme.muted_style()
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    vec![Span::raw(label), Span::styled(format!("{:<11}", shown), style)]
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    spans.extend(date_field(
        app,
        "Start [s]: ",
        &app.report.start,
        app.input_mode == InputMode::ReportStart,
    ));
    spans.push(Span::raw("   "));
    spans.extend(date_field(
        app,
        "End [e]: ",
        &app.report.end,
        app.input_mode == InputMode::ReportEnd,
    ));
    spans.push(Span::raw("   "));

    let ready = !app.report.start.trim().is_empty() && !app.report.end.trim().is_empty();
    spans.push(if ready {
        Span::styled("[g] Generate", Style::default().fg(app.theme.highlight))
    } else {
        Span::styled("[g] Generate", app.theme.muted_style())
    });

    if app.report.range.is_some() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("[x] Export JSON", Style::default().fg(app.theme.highlight)));
    }

    let block = Block::default()
        .title(" Report Range ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_summary(frame: &mut Frame, app: &App, summary: &ReportSummary, area: Rect) {
    let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let info = summary.report_info.clone().unwrap_or_default();
    let days = info
        .duration
        .map(|d| d.days.to_string())
        .unwrap_or_else(|| "0".to_string());

    let mut left = vec![
        Line::from(vec![
            Span::raw(" Total records:      "),
            Span::styled(format_count(info.total_records), bold),
        ]),
        Line::from(vec![
            Span::raw(" Unique astronauts:  "),
            Span::styled(info.unique_astronauts.to_string(), bold),
        ]),
        Line::from(vec![Span::raw(" Days of data:       "), Span::styled(days, bold)]),
        Line::from(""),
    ];

    let stats = summary.statistics.clone().unwrap_or_default();
    for state in [OverallState::Optimo, OverallState::Estresado, OverallState::Critico] {
        let count = stats.state_counts.get(state.code()).copied().unwrap_or(0);
        let pct = stats.state_percentages.get(state.code()).copied().unwrap_or(0.0);
        left.push(Line::from(vec![
            Span::styled(format!(" {:<10}", state.code()), app.theme.state_style(state)),
            Span::raw(format!("{:>6} ({:.1}%)", count, pct)),
        ]));
    }

    let block = Block::default()
        .title(" Summary ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(left).block(block), halves[0]);

    let metrics: Vec<Line> = if stats.average_metrics.is_empty() {
        vec![Line::from(Span::styled(" No metrics", app.theme.muted_style()))]
    } else {
        stats
            .average_metrics
            .iter()
            .map(|(name, value)| Line::from(format!(" {:<22}{:.2}", name, value)))
            .collect()
    };

    let block = Block::default()
        .title(" Average Metrics ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(metrics).block(block), halves[1]);
}

fn render_rows(frame: &mut Frame, app: &App, range: ReportRange, records: &[ReportRecord], area: Rect) {
    let header = Row::new(vec![
        "Astronaut",
        "Timestamp",
        "State",
        "Eyes",
        "Tension",
        "Focus",
        "Concentration",
    ])
    .height(1)
    .style(app.theme.header);

    let shown = &records[..records.len().min(REPORT_ROW_LIMIT)];
    let rows: Vec<Row> = shown
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.display_name().to_string()),
                Cell::from(format_timestamp(&r.timestamp)),
                Cell::from(r.overall_state.code()).style(app.theme.state_style(r.overall_state)),
                Cell::from(format_metric(r.eye_opening)),
                Cell::from(format_metric(r.tension_expressions)),
                Cell::from(format_metric(r.focus)),
                Cell::from(format_metric(r.concentration)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(20),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(13),
    ];

    let title = if records.len() > shown.len() {
        format!(" {} | first {} of {} rows ", range, shown.len(), records.len())
    } else {
        format!(" {} | {} rows ", range, records.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected);

    let mut state = TableState::default();
    if !shown.is_empty() {
        state.select(Some(app.selected_index.min(shown.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
