pub mod collision;
pub mod map;
pub mod spectrum;
pub mod style;
pub mod surface;

pub use collision::PositionResolver;
pub use map::{MapRenderer, MapScene, Marker};
pub use spectrum::{Band, GradientBar, SpectrumRenderer, SpectrumScene, TextAnchor, TextLabel};
pub use style::{BandStyle, MarkerStyle};
pub use surface::{MapSurface, WebMercatorView};
