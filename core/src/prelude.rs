use serde::{Deserialize, Serialize};

/// Pixel geometry of the spectrum chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
}

impl LayoutConfig {
    pub fn inner_height(&self) -> f64 {
        self.height - self.margin_top - self.margin_bottom
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 250.0,
            height: 500.0,
            margin_top: 40.0,
            margin_bottom: 40.0,
            margin_left: 120.0,
            margin_right: 20.0,
        }
    }
}

/// A latitude/longitude pair, treated as a point on a flat plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Euclidean distance in raw degree units.
    pub fn distance(&self, other: &LatLng) -> f64 {
        ((self.lat - other.lat).powi(2) + (self.lng - other.lng).powi(2)).sqrt()
    }
}

/// Screen-space point in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Common error type for ingestion and rendering.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("parse failure: {0}")]
    Parse(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Parse(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Trait describing the render stages that turn devices into view geometry.
///
/// A stage is initialized once per layout, rendered once per full rebuild and
/// cleaned up before the next rebuild. There is no incremental path.
pub trait RenderStage {
    type Output;

    fn initialize(&mut self, config: &LayoutConfig) -> EngineResult<()>;
    fn render(&mut self, input: &RenderInput<'_>) -> EngineResult<Self::Output>;
    fn cleanup(&mut self);
}

/// Everything a render stage reads during one pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub dataset: &'a crate::dataset::Dataset,
    pub catalog: &'a crate::i18n::Catalog,
    pub locale: &'a crate::i18n::Locale,
}
