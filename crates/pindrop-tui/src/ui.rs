//! UI rendering with Ratatui.

use crate::app::{App, Focus, InputMode};
use pindrop_core::{MarkerKind, Pin};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution},
        Block, Borders, Clear, List, ListItem, Paragraph, Wrap,
    },
    Frame,
};

const PIN_COLOR: Color = Color::Rgb(41, 128, 185);
const HIGHLIGHT_COLOR: Color = Color::Rgb(243, 156, 18);
const PENDING_COLOR: Color = Color::Rgb(255, 65, 54);

/// Main render function.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let sidebar_pct = app.sidebar_width_percent;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(sidebar_pct),
            Constraint::Percentage(100 - sidebar_pct),
        ])
        .split(rows[0]);

    render_sidebar(frame, app, chunks[0]);
    render_map(frame, app, chunks[1]);
    render_status(frame, app, rows[1]);

    if app.controller.pending().is_some() {
        render_pending_popup(frame, app);
    } else if let Some(index) = app.card_pin() {
        render_pin_popup(frame, app, index);
    }
}

/// Render the saved pin list.
fn render_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Sidebar && app.input_mode == InputMode::Normal;
    let border_color = if is_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .title(" 📍 Saved Pins ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let pins = app.controller.pins();
    if pins.is_empty() {
        let message = Paragraph::new("No pins saved yet.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(message, centered_rect(inner.width, 1, inner));
        app.sidebar_state.select(None);
        return;
    }

    let highlighted = app.controller.highlighted();
    let items: Vec<ListItem> = pins
        .iter()
        .enumerate()
        .map(|(i, pin)| pin_card(pin, highlighted == Some(i), i == app.sidebar_selected_index))
        .collect();

    // Keep the selected card scrolled into view
    app.sidebar_state.select(Some(app.sidebar_selected_index));
    let list = List::new(items);
    frame.render_stateful_widget(list, inner, &mut app.sidebar_state);
}

fn pin_card(pin: &Pin, highlighted: bool, selected: bool) -> ListItem<'_> {
    let (icon, icon_color) = if highlighted {
        ("★ ", HIGHLIGHT_COLOR)
    } else {
        ("● ", PIN_COLOR)
    };

    let remark = if pin.remark.is_empty() {
        Span::styled("(no remark)", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(pin.remark.as_str(), Style::default().add_modifier(Modifier::BOLD))
    };

    let lines = vec![
        Line::from(vec![Span::styled(icon, Style::default().fg(icon_color)), remark]),
        Line::from(Span::raw(format!("  {}", pin.address))),
        Line::from(Span::styled(
            format!("  {}", pin.coordinate()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];

    let style = if selected {
        Style::default().bg(Color::Rgb(60, 60, 80)).fg(Color::White)
    } else {
        Style::default()
    };

    ListItem::new(lines).style(style)
}

/// Render the map with its markers and the keyboard cursor.
fn render_map(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Map && app.input_mode == InputMode::Normal;
    let border_color = if is_focused { Color::Cyan } else { Color::DarkGray };

    let viewport = *app.controller.viewport();
    let block = Block::default()
        .title(" 🗺  PinDrop Maps ")
        .title_bottom(format!(
            " {} · zoom {} · © OpenStreetMap contributors ",
            viewport.center, viewport.zoom
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    app.set_map_area(inner);

    let bounds = viewport.bounds(inner.width, inner.height);
    let markers = app.controller.markers();
    let cursor = app.cursor_coordinate();

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for marker in &markers {
                let (symbol, color) = match marker.kind {
                    MarkerKind::Saved { highlighted: true, .. } => ("★", HIGHLIGHT_COLOR),
                    MarkerKind::Saved { .. } => ("●", PIN_COLOR),
                    MarkerKind::Pending => ("◆", PENDING_COLOR),
                };
                ctx.print(
                    marker.at.lng,
                    marker.at.lat,
                    Span::styled(symbol, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                );
            }

            if is_focused {
                ctx.print(cursor.lng, cursor.lat, Span::styled("+", Style::default().fg(Color::Cyan)));
            }
        });

    frame.render_widget(canvas, area);
}

/// Render the remark prompt for the pending pin.
fn render_pending_popup(frame: &mut Frame, app: &App) {
    let Some(pending) = app.controller.pending() else {
        return;
    };

    let map = app.map_area;
    let dialog_width = 50.min(map.width);
    let dialog_height = 6.min(map.height);
    let dialog_area = centered_rect(dialog_width, dialog_height, map);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Drop Pin ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PENDING_COLOR));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let mut lines = vec![Line::from(Span::styled(
        pending.at.to_string(),
        Style::default().fg(Color::DarkGray),
    ))];

    if app.is_resolving() {
        lines.push(Line::from(Span::styled(
            "Resolving address...",
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(Span::styled(
            "Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Remark: ", Style::default().fg(Color::DarkGray)),
            Span::styled(app.remark_input.as_str(), Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
        ]));
        lines.push(Line::from(Span::styled(
            "Enter: save pin | Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let body = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(body, inner);
}

/// Render the card of a saved pin over the map.
fn render_pin_popup(frame: &mut Frame, app: &App, index: usize) {
    let Some(pin) = app.controller.pins().get(index) else {
        return;
    };

    let map = app.map_area;
    let dialog_width = 50.min(map.width);
    let dialog_height = 5.min(map.height);
    let dialog_area = Rect::new(
        map.x + (map.width.saturating_sub(dialog_width)) / 2,
        map.y,
        dialog_width,
        dialog_height,
    );

    frame.render_widget(Clear, dialog_area);

    let color = if app.controller.highlighted() == Some(index) {
        HIGHLIGHT_COLOR
    } else {
        PIN_COLOR
    };
    let block = Block::default()
        .title(" Pin ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let lines = vec![
        Line::from(Span::styled(
            pin.remark.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(pin.address.as_str()),
        Line::from(Span::styled(
            pin.coordinate().to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

/// Render the status and help line.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let help = match (app.input_mode.clone(), app.focus.clone()) {
        (InputMode::Remark, _) => "Enter: save | Esc: cancel",
        (InputMode::Normal, Focus::Map) => {
            "click/Enter: drop pin | hjkl: cursor | HJKL: pan | +/-: zoom | Tab: pins | q: quit"
        }
        (InputMode::Normal, Focus::Sidebar) => {
            "j/k: select | Enter: center map | X: clear all | Tab: map | q: quit"
        }
    };

    let mut spans = Vec::new();
    if let Some(ref message) = app.status_message {
        spans.push(Span::styled(message.as_str(), Style::default().fg(Color::Yellow)));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(help, Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Helper to create a centered rectangle.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pindrop_core::{Controller, Coordinate, Geocoder, MemoryStorage, PinStore, Viewport};
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    struct NoopGeocoder;

    impl Geocoder for NoopGeocoder {
        fn resolve_address(&self, _at: Coordinate) -> String {
            String::new()
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    /// Text of the given columns, row by row.
    fn columns_text(terminal: &Terminal<TestBackend>, columns: std::ops::Range<u16>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in columns.clone() {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn test_app(contents: &str) -> App {
        let controller = Controller::new(
            PinStore::load(Box::new(MemoryStorage::with_contents(contents))),
            Viewport::default(),
        );
        App::new(controller, Arc::new(NoopGeocoder), 30)
    }

    #[test]
    fn test_empty_sidebar_message() {
        let mut app = test_app("[]");
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("No pins saved yet."));
        assert!(app.map_area.width > 0);
    }

    #[test]
    fn test_sidebar_lists_pins() {
        let mut app = test_app(
            r#"[{"lat":51.505,"lng":-0.09,"remark":"Cafe","address":"10 Downing St"}]"#,
        );
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Cafe"));
        assert!(text.contains("10 Downing St"));
        assert!(text.contains("51.505000, -0.090000"));
    }

    #[test]
    fn test_pending_popup_shows_remark() {
        let mut app = test_app("[]");
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        app.drop_pin(Coordinate::new(51.5, -0.1).unwrap());
        app.remark_input.push_str("Lunch");
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Drop Pin"));
        assert!(text.contains("Lunch"));
    }

    #[test]
    fn test_sidebar_scrolls_to_selected_card() {
        let pins: Vec<String> = (0..12)
            .map(|i| {
                format!(
                    r#"{{"lat":{}.0,"lng":{}.0,"remark":"Remark{:02}","address":"Street {}"}}"#,
                    i, i, i, i
                )
            })
            .collect();
        let mut app = test_app(&format!("[{}]", pins.join(",")));
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let sidebar = columns_text(&terminal, 0..36);
        assert!(sidebar.contains("Remark00"));
        assert!(!sidebar.contains("Remark11"));

        for _ in 0..11 {
            app.move_down();
        }
        app.center_on_selected();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        assert_eq!(app.controller.highlighted(), Some(11));
        let sidebar = columns_text(&terminal, 0..36);
        assert!(sidebar.contains("Remark11"));
        assert!(!sidebar.contains("Remark00"));
    }

    #[test]
    fn test_resolving_popup() {
        let mut app = test_app("[]");
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        app.drop_pin(Coordinate::new(51.5, -0.1).unwrap());
        app.submit_remark();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let map = columns_text(&terminal, 36..120);
        assert!(map.contains("Resolving address..."));
        assert!(map.contains("Esc: cancel"));
        assert!(!map.contains("Remark:"));
    }

    #[test]
    fn test_clicked_marker_shows_card() {
        let mut app = test_app(
            r#"[{"lat":51.505,"lng":-0.09,"remark":"Cafe","address":"10 Downing St"}]"#,
        );
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        app.focus = Focus::Sidebar;
        terminal.draw(|frame| render(frame, &mut app)).unwrap();
        assert!(!columns_text(&terminal, 36..120).contains("10 Downing St"));

        let area = app.map_area;
        let (col, row) = app
            .controller
            .viewport()
            .coordinate_to_cell(app.controller.pins()[0].coordinate(), area.width, area.height)
            .unwrap();
        app.click_map(area.x + col, area.y + row);
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let map = columns_text(&terminal, 36..120);
        assert!(map.contains("Cafe"));
        assert!(map.contains("10 Downing St"));
        assert!(app.controller.pending().is_none());
    }
}
