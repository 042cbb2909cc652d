use crate::prelude::{LatLng, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;

/// The map capability the engine draws markers onto. Tiles, panning and the
/// base layer belong to the implementation.
pub trait MapSurface {
    fn project(&self, coordinates: LatLng) -> Point;
}

/// Spherical Web Mercator view with a fixed center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WebMercatorView {
    pub center: LatLng,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl WebMercatorView {
    pub fn new(center: LatLng, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    pub fn resized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn world_pixels(&self, coordinates: LatLng) -> Point {
        let scale = TILE_SIZE * 2f64.powf(self.zoom);
        let sin_lat = coordinates.lat.to_radians().sin().clamp(-0.9999, 0.9999);
        Point::new(
            scale * (coordinates.lng + 180.0) / 360.0,
            scale * (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)),
        )
    }
}

impl Default for WebMercatorView {
    fn default() -> Self {
        Self::new(LatLng::new(23.7, 121.0), 8.0, 800.0, 600.0)
    }
}

impl MapSurface for WebMercatorView {
    fn project(&self, coordinates: LatLng) -> Point {
        let origin = self.world_pixels(self.center);
        let target = self.world_pixels(coordinates);
        Point::new(
            target.x - origin.x + self.width / 2.0,
            target.y - origin.y + self.height / 2.0,
        )
    }
}
