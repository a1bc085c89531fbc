//! Core models, persistence and reverse geocoding for pindrop.
//!
//! This crate holds the pin lifecycle independent of any front end: the
//! terminal UI drives a [`Controller`] and renders what it exposes.

pub mod controller;
pub mod geocode;
pub mod models;
pub mod storage;
pub mod store;
pub mod viewport;

pub use controller::{Controller, FlowState, LookupTicket, Marker, MarkerKind};
pub use geocode::{Geocoder, GeocodeError, NominatimClient, ADDRESS_NOT_FOUND, LOOKUP_FAILED};
pub use models::{Coordinate, PendingPin, Pin, PinError};
pub use storage::{JsonFileStorage, MemoryStorage, PinStorage, StorageError};
pub use store::PinStore;
pub use viewport::{Bounds, Viewport};
