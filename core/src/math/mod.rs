pub mod color;
pub mod scale;
pub mod stats;

pub use color::Rgb;
pub use scale::{vertical_scale, ColorScale, LinearScale, SqrtScale, UncertaintyScales};
pub use stats::StatsHelper;
