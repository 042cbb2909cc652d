pub mod device;
pub mod raw;
pub mod sanitize;

pub use device::{Dataset, Device, DeviceId, RangeEntry};
pub use raw::{DeviceIds, Interval, Metadata, RangeLabel, RawDataset, RawDevice};
pub use sanitize::{sanitize, sanitize_text};
