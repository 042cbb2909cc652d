pub mod highlight;
pub mod popup;

pub use highlight::{HighlightCoordinator, HighlightState, ViewEvents};
pub use popup::{placement, Popup, PopupContent, PopupPlacement, VideoLink};
