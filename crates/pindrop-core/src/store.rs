//! Ordered pin collection mirrored to a storage slot.

use crate::models::{Coordinate, Pin};
use crate::storage::{PinStorage, StorageError};

/// In-memory pins plus the slot they are persisted to.
///
/// Every mutation rewrites the whole slot. A failed write is logged and
/// reported, but the in-memory collection stays authoritative.
pub struct PinStore {
    pins: Vec<Pin>,
    storage: Box<dyn PinStorage>,
    last_write_error: Option<String>,
}

impl PinStore {
    /// Read the slot once. Missing or malformed contents yield an empty collection.
    pub fn load(storage: Box<dyn PinStorage>) -> Self {
        let pins = match storage.load() {
            Ok(Some(contents)) => match parse_slot(&contents) {
                Ok(pins) => {
                    tracing::info!("Loaded {} saved pins", pins.len());
                    pins
                }
                Err(e) => {
                    tracing::warn!("Discarding malformed pin data: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read saved pins: {}", e);
                Vec::new()
            }
        };

        Self {
            pins,
            storage,
            last_write_error: None,
        }
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn get(&self, index: usize) -> Option<&Pin> {
        self.pins.get(index)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Add a pin at the end and persist.
    pub fn append(&mut self, pin: Pin) -> &[Pin] {
        self.pins.push(pin);
        self.persist();
        &self.pins
    }

    /// Drop every pin and persist.
    pub fn clear(&mut self) -> &[Pin] {
        self.pins.clear();
        self.persist();
        &self.pins
    }

    /// Message from the most recent failed write, reset by the next good one.
    pub fn last_write_error(&self) -> Option<&str> {
        self.last_write_error.as_deref()
    }

    fn persist(&mut self) {
        match self.write_slot() {
            Ok(()) => self.last_write_error = None,
            Err(e) => {
                tracing::warn!("Failed to persist pins: {}", e);
                self.last_write_error = Some(e.to_string());
            }
        }
    }

    fn write_slot(&self) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&self.pins)?;
        self.storage.save(&payload)
    }
}

/// Decode the slot. One pin off the globe rejects the whole payload.
fn parse_slot(contents: &str) -> Result<Vec<Pin>, Box<dyn std::error::Error>> {
    let pins: Vec<Pin> = serde_json::from_str(contents)?;
    for pin in &pins {
        Coordinate::new(pin.lat, pin.lng)?;
    }
    Ok(pins)
}
