//! Application state management.

use pindrop_core::{Controller, Coordinate, FlowState, Geocoder, LookupTicket};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Application state.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Running,
    /// Application should quit.
    Quit,
}

/// Input mode for the application.
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Typing a remark for the pending pin.
    Remark,
}

/// Focus area within the main view.
#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    /// Saved pin list is focused.
    Sidebar,
    /// Map is focused.
    Map,
}

/// Address delivered by a background lookup.
#[derive(Debug)]
pub struct GeocodeOutcome {
    pub ticket: u64,
    pub address: String,
}

/// Main application model.
pub struct App {
    /// Current application state.
    pub state: AppState,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Current focus area.
    pub focus: Focus,
    /// Pin flow, saved pins and map view.
    pub controller: Controller,
    /// Percentage of the width given to the sidebar.
    pub sidebar_width_percent: u16,

    // Sidebar state
    /// Index of the selected card.
    pub sidebar_selected_index: usize,
    /// Scroll position of the card list.
    pub sidebar_state: ListState,

    // Map state
    /// Map drawing area from the last frame, for mouse hit testing.
    pub map_area: Rect,
    /// Keyboard cursor, relative to `map_area`.
    pub cursor: (u16, u16),
    /// Saved pin whose card was opened by clicking its marker.
    pub inspected: Option<usize>,

    // Remark entry state
    /// Remark being typed.
    pub remark_input: String,
    /// Message shown in the status line.
    pub status_message: Option<String>,

    geocoder: Arc<dyn Geocoder>,
    lookup_tx: Sender<GeocodeOutcome>,
    lookup_rx: Receiver<GeocodeOutcome>,
}

impl App {
    /// Create a new application instance.
    pub fn new(controller: Controller, geocoder: Arc<dyn Geocoder>, sidebar_width_percent: u16) -> Self {
        let (lookup_tx, lookup_rx) = mpsc::channel();
        let status_message = controller
            .store()
            .last_write_error()
            .map(|e| format!("Could not save pins: {}", e));

        Self {
            state: AppState::Running,
            input_mode: InputMode::Normal,
            focus: Focus::Map,
            controller,
            sidebar_width_percent,
            sidebar_selected_index: 0,
            sidebar_state: ListState::default(),
            map_area: Rect::default(),
            cursor: (0, 0),
            inspected: None,
            remark_input: String::new(),
            status_message,
            geocoder,
            lookup_tx,
            lookup_rx,
        }
    }

    /// Record the map area drawn this frame, keeping the cursor inside it.
    pub fn set_map_area(&mut self, area: Rect) {
        if area.width == 0 || area.height == 0 {
            self.map_area = area;
            return;
        }
        if self.map_area.width != area.width || self.map_area.height != area.height {
            self.cursor = (area.width / 2, area.height / 2);
        }
        self.map_area = area;
    }

    /// Coordinate under the keyboard cursor.
    pub fn cursor_coordinate(&self) -> Coordinate {
        let (col, row) = self.cursor;
        self.controller
            .viewport()
            .cell_to_coordinate(col, row, self.map_area.width, self.map_area.height)
    }

    /// Map cell under an absolute terminal cell, relative to `map_area`.
    pub fn map_cell_at(&self, column: u16, row: u16) -> Option<(u16, u16)> {
        let area = self.map_area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        inside.then(|| (column - area.x, row - area.y))
    }

    /// Coordinate under an absolute terminal cell, if it is on the map.
    pub fn map_coordinate_at(&self, column: u16, row: u16) -> Option<Coordinate> {
        let (col, row) = self.map_cell_at(column, row)?;
        Some(self.controller.viewport().cell_to_coordinate(
            col,
            row,
            self.map_area.width,
            self.map_area.height,
        ))
    }

    /// Saved pin drawn on or next to a map cell, nearest first.
    ///
    /// Marker glyphs can land one cell off the projected position, so
    /// neighbouring cells count as a hit.
    pub fn pin_near_cell(&self, col: u16, row: u16) -> Option<usize> {
        let (width, height) = (self.map_area.width, self.map_area.height);
        let viewport = self.controller.viewport();
        self.controller
            .pins()
            .iter()
            .enumerate()
            .filter_map(|(i, pin)| {
                let (c, r) = viewport.coordinate_to_cell(pin.coordinate(), width, height)?;
                let (dc, dr) = (c.abs_diff(col), r.abs_diff(row));
                (dc <= 1 && dr <= 1).then_some((i, dc + dr))
            })
            .min_by_key(|&(_, distance)| distance)
            .map(|(i, _)| i)
    }

    /// Left click on the map: open a saved pin's card, or start a new pin.
    pub fn click_map(&mut self, column: u16, row: u16) {
        let Some((cell_col, cell_row)) = self.map_cell_at(column, row) else {
            return;
        };
        if self.controller.pending().is_none() {
            if let Some(index) = self.pin_near_cell(cell_col, cell_row) {
                self.inspected = Some(index);
                return;
            }
        }
        if let Some(at) = self.map_coordinate_at(column, row) {
            self.drop_pin(at);
        }
    }

    /// Pin whose card is shown over the map: a clicked marker, or the one under the cursor.
    pub fn card_pin(&self) -> Option<usize> {
        if self.controller.pending().is_some() {
            return None;
        }
        let hovered = || {
            (self.focus == Focus::Map && self.input_mode == InputMode::Normal)
                .then(|| self.pin_near_cell(self.cursor.0, self.cursor.1))
                .flatten()
        };
        self.inspected
            .filter(|&i| i < self.controller.pins().len())
            .or_else(hovered)
    }

    pub fn close_card(&mut self) -> bool {
        self.inspected.take().is_some()
    }

    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let max_col = i32::from(self.map_area.width.saturating_sub(1));
        let max_row = i32::from(self.map_area.height.saturating_sub(1));
        let col = (i32::from(self.cursor.0) + dx).clamp(0, max_col);
        let row = (i32::from(self.cursor.1) + dy).clamp(0, max_row);
        self.cursor = (col as u16, row as u16);
        self.inspected = None;
    }

    /// Start a new pending pin, replacing any existing one.
    pub fn drop_pin(&mut self, at: Coordinate) {
        tracing::info!("Adding pending pin at {}", at);
        self.controller.click(at);
        self.remark_input.clear();
        self.inspected = None;
        self.status_message = None;
        self.input_mode = InputMode::Remark;
        self.focus = Focus::Map;
    }

    /// Submit the typed remark and start the address lookup.
    pub fn submit_remark(&mut self) {
        let remark = std::mem::take(&mut self.remark_input);
        self.input_mode = InputMode::Normal;
        if let Some(ticket) = self.controller.submit(remark) {
            self.spawn_lookup(ticket);
            self.status_message = Some("Resolving address...".to_string());
        }
    }

    /// Abandon the pending pin, whether or not its lookup is running.
    pub fn cancel_pending(&mut self) {
        self.controller.cancel();
        self.remark_input.clear();
        self.input_mode = InputMode::Normal;
        self.status_message = None;
    }

    fn spawn_lookup(&self, ticket: LookupTicket) {
        let geocoder = Arc::clone(&self.geocoder);
        let tx = self.lookup_tx.clone();
        std::thread::spawn(move || {
            let address = geocoder.resolve_address(ticket.at);
            // The receiver is gone only when the app is shutting down
            let _ = tx.send(GeocodeOutcome {
                ticket: ticket.id,
                address,
            });
        });
    }

    /// Apply finished lookups. Returns true when a pin was committed.
    pub fn poll_lookups(&mut self) -> bool {
        let mut committed = false;
        while let Ok(outcome) = self.lookup_rx.try_recv() {
            committed |= self.apply_lookup(outcome);
        }
        committed
    }

    fn apply_lookup(&mut self, outcome: GeocodeOutcome) -> bool {
        let saved = self
            .controller
            .resolved(outcome.ticket, outcome.address)
            .map(|pin| format!("Saved \"{}\" at {}", pin.remark, pin.address));

        let Some(message) = saved else {
            return false;
        };

        self.status_message = match self.controller.store().last_write_error() {
            Some(e) => Some(format!("Could not save pins: {}", e)),
            None => Some(message),
        };
        self.sidebar_selected_index = self.controller.pins().len().saturating_sub(1);
        true
    }

    /// Whether a lookup is outstanding for the pending pin.
    pub fn is_resolving(&self) -> bool {
        matches!(self.controller.flow(), FlowState::Resolving { .. })
    }

    /// Move selection up in the sidebar.
    pub fn move_up(&mut self) {
        if self.sidebar_selected_index > 0 {
            self.sidebar_selected_index -= 1;
        }
    }

    /// Move selection down in the sidebar.
    pub fn move_down(&mut self) {
        if self.sidebar_selected_index + 1 < self.controller.pins().len() {
            self.sidebar_selected_index += 1;
        }
    }

    /// "Center Map" on the selected card.
    pub fn center_on_selected(&mut self) {
        if self.controller.select(self.sidebar_selected_index) {
            self.cursor = (self.map_area.width / 2, self.map_area.height / 2);
        }
    }

    /// "Clear All Pins".
    pub fn clear_pins(&mut self) {
        self.controller.clear_pins();
        self.sidebar_selected_index = 0;
        self.inspected = None;
        self.status_message = match self.controller.store().last_write_error() {
            Some(e) => Some(format!("Could not save pins: {}", e)),
            None => Some("Cleared all pins".to_string()),
        };
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Map,
            Focus::Map => Focus::Sidebar,
        };
    }
}
