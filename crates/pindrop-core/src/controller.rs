//! Pin creation flow, selection and the data the map surface draws.

use crate::models::{Coordinate, PendingPin, Pin};
use crate::store::PinStore;
use crate::viewport::Viewport;

/// Where the pin creation flow currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// No pending pin.
    Idle,
    /// A location was clicked; waiting for a remark.
    Pending(PendingPin),
    /// Remark submitted; waiting for the address of `ticket`.
    Resolving {
        pending: PendingPin,
        remark: String,
        ticket: u64,
    },
}

/// Work order for one reverse geocoding lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupTicket {
    pub id: u64,
    pub at: Coordinate,
}

/// Something to draw on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub at: Coordinate,
    pub kind: MarkerKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerKind {
    Saved { index: usize, highlighted: bool },
    Pending,
}

/// Owns the pin store, the transient pending pin and the map view.
pub struct Controller {
    store: PinStore,
    flow: FlowState,
    viewport: Viewport,
    highlighted: Option<usize>,
    next_ticket: u64,
}

impl Controller {
    pub fn new(store: PinStore, viewport: Viewport) -> Self {
        Self {
            store,
            flow: FlowState::Idle,
            viewport,
            highlighted: None,
            next_ticket: 1,
        }
    }

    pub fn pins(&self) -> &[Pin] {
        self.store.pins()
    }

    pub fn store(&self) -> &PinStore {
        &self.store
    }

    pub fn flow(&self) -> &FlowState {
        &self.flow
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Location of the pending pin, in either pending or resolving state.
    pub fn pending(&self) -> Option<PendingPin> {
        match &self.flow {
            FlowState::Idle => None,
            FlowState::Pending(pending) => Some(*pending),
            FlowState::Resolving { pending, .. } => Some(*pending),
        }
    }

    /// Highlighted pin index, only while it still refers to a saved pin.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted.filter(|&i| i < self.store.len())
    }

    /// Map click. Any existing pending pin is discarded, including one that is resolving.
    pub fn click(&mut self, at: Coordinate) {
        if let FlowState::Resolving { ticket, .. } = self.flow {
            tracing::debug!("Abandoning lookup {} for a new click", ticket);
        }
        self.flow = FlowState::Pending(PendingPin { at });
    }

    /// Drop the pending pin. An outstanding lookup will be ignored when it lands.
    pub fn cancel(&mut self) {
        self.flow = FlowState::Idle;
    }

    /// Submit a remark for the pending pin.
    ///
    /// Returns the lookup to run, or `None` when there is no pending pin or a
    /// lookup for it is already in flight.
    pub fn submit(&mut self, remark: impl Into<String>) -> Option<LookupTicket> {
        let FlowState::Pending(pending) = self.flow else {
            return None;
        };

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.flow = FlowState::Resolving {
            pending,
            remark: remark.into(),
            ticket: id,
        };

        Some(LookupTicket { id, at: pending.at })
    }

    /// Deliver the address for a lookup. Commits the pin only if that lookup is
    /// still the one being waited on.
    pub fn resolved(&mut self, ticket: u64, address: impl Into<String>) -> Option<&Pin> {
        let current = match &self.flow {
            FlowState::Resolving { ticket: t, .. } => *t == ticket,
            _ => false,
        };
        if !current {
            tracing::debug!("Discarding stale lookup result {}", ticket);
            return None;
        }

        let FlowState::Resolving { pending, remark, .. } =
            std::mem::replace(&mut self.flow, FlowState::Idle)
        else {
            return None;
        };

        let pin = Pin::new(pending.at, remark, address);
        tracing::info!("Saved pin \"{}\" at {}", pin.remark, pending.at);
        self.store.append(pin).last()
    }

    /// Recenter on a saved pin and highlight it. Returns false for an unknown index.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(pin) = self.store.get(index) else {
            return false;
        };
        self.viewport.center = pin.coordinate();
        self.highlighted = Some(index);
        true
    }

    /// Remove every saved pin and the highlight.
    pub fn clear_pins(&mut self) {
        self.store.clear();
        self.highlighted = None;
    }

    /// Saved pins in order, then the pending pin.
    pub fn markers(&self) -> Vec<Marker> {
        let highlighted = self.highlighted();
        let mut markers: Vec<Marker> = self
            .store
            .pins()
            .iter()
            .enumerate()
            .map(|(index, pin)| Marker {
                at: pin.coordinate(),
                kind: MarkerKind::Saved {
                    index,
                    highlighted: highlighted == Some(index),
                },
            })
            .collect();

        if let Some(pending) = self.pending() {
            markers.push(Marker {
                at: pending.at,
                kind: MarkerKind::Pending,
            });
        }
        markers
    }
}
