//! Keyboard and mouse event handling.

use crate::app::{App, AppState, Focus, InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Fraction of the view width moved per pan step.
const PAN_STEP: f64 = 0.1;

/// Handle a key event. Returns true if the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.state = AppState::Quit;
        return true;
    }

    match app.input_mode {
        InputMode::Remark => handle_remark_key(app, key),
        InputMode::Normal => handle_normal_key(app, key),
    }
}

/// Handle a mouse event on the map.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.click_map(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => app.controller.viewport_mut().zoom_in(),
        MouseEventKind::ScrollDown => app.controller.viewport_mut().zoom_out(),
        _ => {}
    }
}

fn handle_remark_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => app.submit_remark(),
        KeyCode::Esc => app.cancel_pending(),
        KeyCode::Char(c) => app.remark_input.push(c),
        KeyCode::Backspace => {
            app.remark_input.pop();
        }
        _ => {}
    }
    false
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quit;
            return true;
        }
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Esc => {
            if app.controller.pending().is_some() {
                app.cancel_pending();
            } else if !app.close_card() && app.focus == Focus::Map {
                app.focus = Focus::Sidebar;
            }
        }
        KeyCode::Char('X') => app.clear_pins(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.controller.viewport_mut().zoom_in(),
        KeyCode::Char('-') => app.controller.viewport_mut().zoom_out(),
        _ => match app.focus {
            Focus::Sidebar => handle_sidebar_key(app, key),
            Focus::Map => handle_map_key(app, key),
        },
    }
    false
}

fn handle_sidebar_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Enter => app.center_on_selected(),
        _ => {}
    }
}

fn handle_map_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.move_cursor(-1, 0),
        KeyCode::Char('l') | KeyCode::Right => app.move_cursor(1, 0),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(0, -1),
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(0, 1),
        KeyCode::Char('H') => app.controller.viewport_mut().pan(-PAN_STEP, 0.0),
        KeyCode::Char('L') => app.controller.viewport_mut().pan(PAN_STEP, 0.0),
        KeyCode::Char('K') => app.controller.viewport_mut().pan(0.0, PAN_STEP),
        KeyCode::Char('J') => app.controller.viewport_mut().pan(0.0, -PAN_STEP),
        KeyCode::Enter => {
            let at = app.cursor_coordinate();
            app.drop_pin(at);
        }
        _ => {}
    }
}
