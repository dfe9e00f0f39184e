//! Keyboard and mouse handling.
//!
//! Keys are routed by priority: the alert modal, then the help overlay,
//! then the detail overlay, then text input, then the global bindings.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, InputMode, View};
use crate::gateway::SeedKind;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if app.detector.modal().is_visible() {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => app.acknowledge_alert(),
            KeyCode::Char('d') => app.view_alert_details(),
            KeyCode::Char('q') => app.quit(),
            _ => {}
        }
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            KeyCode::Char('r') => app.refresh(),
            KeyCode::Char('?') => app.toggle_help(),
            _ => {}
        }
        return;
    }

    match app.input_mode {
        InputMode::Filter => {
            handle_filter_input(app, key);
            return;
        }
        InputMode::ReportStart | InputMode::ReportEnd => {
            handle_date_input(app, key);
            return;
        }
        InputMode::Normal => {}
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char(c @ '1'..='6') => {
            let index = (c as u8 - b'1') as usize;
            app.set_view(View::ALL[index]);
        }

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('a') => app.toggle_auto_refresh(),
        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        // Seeds view
        KeyCode::Char('A') if app.current_view == View::Seeds => app.run_seed(SeedKind::All),
        KeyCode::Char('P') if app.current_view == View::Seeds => app.run_seed(SeedKind::Profiles),
        KeyCode::Char('M') if app.current_view == View::Seeds => app.run_seed(SeedKind::Monitoring),

        // Reports view
        KeyCode::Char('s') if app.current_view == View::Reports => {
            app.edit_report_date(InputMode::ReportStart)
        }
        KeyCode::Char('e') if app.current_view == View::Reports => {
            app.edit_report_date(InputMode::ReportEnd)
        }
        KeyCode::Char('g') if app.current_view == View::Reports => app.generate_report(),
        KeyCode::Char('x') if app.current_view == View::Reports => app.export_report_here(),

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.finish_input(),

        // Cancel discards the text too
        KeyCode::Esc => app.clear_filter(),

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.input_pop();
            if app.filter_text.is_empty() {
                app.finish_input();
            }
        }

        KeyCode::Char(c) => app.input_push(c),

        _ => {}
    }
}

/// Handle key input while a report date is being edited
fn handle_date_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => app.finish_input(),
        KeyCode::Backspace => app.input_pop(),
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => app.input_push(c),
        _ => {}
    }
}

/// The view whose tab covers `column` on the tab row.
pub fn tab_at(column: u16) -> Option<View> {
    let mut start = 0u16;
    for (i, view) in View::ALL.iter().enumerate() {
        // Title " n:Label " plus one cell of padding on each side
        let width = format!(" {}:{} ", i + 1, view.label()).chars().count() as u16 + 2;
        if column < start + width {
            return Some(*view);
        }
        // Divider
        start += width + 1;
    }
    None
}

/// Screen rows above the first list row of each view, below the tabs.
fn list_offset(view: View) -> u16 {
    match view {
        View::Dashboard | View::Astronauts => 2,
        View::Statistics => 9 + 2,
        View::Monitoring => 4 + 2,
        View::Reports => 3 + 8 + 2,
        View::Seeds => 1,
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    if app.detector.modal().is_visible() {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            if app.show_detail_overlay || app.show_help {
                return;
            }

            // Tab row sits right above the content
            if mouse.row + 1 == content_start_row {
                if let Some(view) = tab_at(mouse.column) {
                    app.set_view(view);
                }
                return;
            }

            let first = content_start_row + list_offset(app.current_view);
            if mouse.row >= first {
                let item = (mouse.row - first) as usize;
                if item < app.list_len() {
                    app.selected_index = item;
                }
            }
        }

        // Right-click closes the overlay
        MouseEventKind::Down(MouseButton::Right) => app.close_overlay(),

        _ => {}
    }
}
