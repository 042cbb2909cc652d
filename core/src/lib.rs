//! Visualization engine for the linked spectrum chart and device map.
//!
//! Raw records are sanitized and given ids, then each rebuild derives band
//! and marker geometry through the scales and the collision resolver. The
//! highlight coordinator keeps both views in the same emphasis state.

pub mod dataset;
pub mod i18n;
pub mod interaction;
pub mod layout;
pub mod math;
pub mod prelude;
pub mod scene;
pub mod session;
pub mod telemetry;

pub use prelude::{EngineError, EngineResult, LayoutConfig, RenderStage};
pub use scene::Scene;
pub use session::{LoadOutcome, LoadTicket, Session};
