//! Map view position and the mapping between screen cells and coordinates.

use crate::models::Coordinate;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;
pub const DEFAULT_ZOOM: u8 = 13;

/// Default center, central London.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 51.505,
    lng: -0.09,
};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

/// Visible extent in degrees. May reach past the poles or the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

/// Equirectangular window onto the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Viewport {
    pub fn new(center: Coordinate, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Degrees of longitude across the view. Zoom 1 shows the whole world.
    pub fn lng_span(&self) -> f64 {
        360.0 / 2f64.powi(i32::from(self.zoom) - 1)
    }

    fn lat_span(&self, width: u16, height: u16) -> f64 {
        if width == 0 {
            return 0.0;
        }
        self.lng_span() * f64::from(height) * CELL_ASPECT / f64::from(width)
    }

    pub fn bounds(&self, width: u16, height: u16) -> Bounds {
        let half_lng = self.lng_span() / 2.0;
        let half_lat = self.lat_span(width, height) / 2.0;
        Bounds {
            west: self.center.lng - half_lng,
            east: self.center.lng + half_lng,
            south: self.center.lat - half_lat,
            north: self.center.lat + half_lat,
        }
    }

    /// Coordinate under the middle of a cell in a `width` x `height` area.
    pub fn cell_to_coordinate(&self, col: u16, row: u16, width: u16, height: u16) -> Coordinate {
        let b = self.bounds(width, height);
        let x = (f64::from(col) + 0.5) / f64::from(width.max(1));
        let y = (f64::from(row) + 0.5) / f64::from(height.max(1));
        Coordinate::normalized(b.north - y * (b.north - b.south), b.west + x * (b.east - b.west))
    }

    /// Cell holding `at`, if it is visible.
    pub fn coordinate_to_cell(&self, at: Coordinate, width: u16, height: u16) -> Option<(u16, u16)> {
        let b = self.bounds(width, height);
        if at.lng < b.west || at.lng >= b.east || at.lat <= b.south || at.lat > b.north {
            return None;
        }
        let col = ((at.lng - b.west) / (b.east - b.west) * f64::from(width)).floor();
        let row = ((b.north - at.lat) / (b.north - b.south) * f64::from(height)).floor();
        Some((
            (col as u16).min(width.saturating_sub(1)),
            (row as u16).min(height.saturating_sub(1)),
        ))
    }

    /// Shift the view by a fraction of its width, east and north positive.
    pub fn pan(&mut self, east: f64, north: f64) {
        let step = self.lng_span();
        self.center = Coordinate::normalized(
            self.center.lat + north * step,
            self.center.lng + east * step,
        );
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }
}
