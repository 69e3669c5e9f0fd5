// ── Dashboard domain model ──
//
// Canonical client-side types built from backend payloads. Devices are
// rebuilt on every poll; tiles and chart series are pure derivations of a
// device list.

pub mod chart;
pub mod device;
pub mod device_id;
pub mod metric;

pub use chart::ChartSeries;
pub use device::{Device, DeviceStatus};
pub use device_id::DeviceId;
pub use metric::MetricTile;
