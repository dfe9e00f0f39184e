//! Alert modal rendering.
//!
//! Drawn above everything else while the detector holds a visible modal.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::{AlertKind, AlertModal};
use crate::ui::common::centered_rect;

/// Title, message and suggested actions for a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertText {
    pub title: &'static str,
    pub message: String,
    pub actions_heading: &'static str,
    pub actions: &'static [&'static str],
}

const CRITICAL_ACTIONS: &[&str] = &[
    "Contactar al equipo médico de emergencia",
    "Activar protocolo de emergencia",
    "Monitorear constantemente los signos vitales",
    "Preparar para posible evacuación",
];

const STRESSED_ACTIONS: &[&str] = &[
    "Hablar con el astronauta para calmarlo",
    "Sugerir técnicas de relajación",
    "Revisar la carga de trabajo",
    "Considerar descanso adicional",
    "Monitorear de cerca su estado",
];

impl AlertText {
    pub fn for_modal(kind: AlertKind, astronaut_name: &str) -> Self {
        match kind {
            AlertKind::Critical => Self {
                title: "ALERTA CRÍTICA",
                message: format!(
                    "El astronauta {} ha entrado en estado crítico. Se requiere intervención médica inmediata.",
                    astronaut_name
                ),
                actions_heading: "Acciones Recomendadas:",
                actions: CRITICAL_ACTIONS,
            },
            AlertKind::Stressed => Self {
                title: "ALERTA DE ESTRÉS",
                message: format!(
                    "El astronauta {} muestra signos de estrés. Se recomienda intervención preventiva.",
                    astronaut_name
                ),
                actions_heading: "Recomendaciones:",
                actions: STRESSED_ACTIONS,
            },
        }
    }
}

/// Render the alert modal if one is visible.
pub fn render_modal(frame: &mut Frame, app: &App, area: Rect) {
    let modal: &AlertModal = app.detector.modal();
    let Some(kind) = modal.kind.filter(|_| modal.is_visible()) else {
        return;
    };

    let text = AlertText::for_modal(kind, &modal.astronaut_name);
    let style = app.theme.alert_style(kind);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(text.message, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(text.actions_heading, style)),
    ];
    lines.extend(text.actions.iter().map(|a| Line::from(format!("  • {}", a))));
    lines.push(Line::from(""));
    lines.push(
        Line::from(vec![
            Span::styled("[Enter] Entendido", style),
            Span::raw("    "),
            Span::styled("[d] Ver Detalles", Style::default().fg(app.theme.highlight)),
        ])
        .alignment(Alignment::Center),
    );

    let block = Block::default()
        .title(format!(" ⚠ {} ", text.title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(style);

    let modal_area = centered_rect(64, 16, area);
    frame.render_widget(Clear, modal_area);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        modal_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_text() {
        let text = AlertText::for_modal(AlertKind::Critical, "Ana Torres");
        assert_eq!(text.title, "ALERTA CRÍTICA");
        assert!(text.message.contains("Ana Torres ha entrado en estado crítico"));
        assert_eq!(text.actions.len(), 4);
    }

    #[test]
    fn test_stressed_text() {
        let text = AlertText::for_modal(AlertKind::Stressed, "Luis Vega");
        assert_eq!(text.title, "ALERTA DE ESTRÉS");
        assert!(text.message.contains("Luis Vega muestra signos de estrés"));
        assert_eq!(text.actions.len(), 5);
    }
}
