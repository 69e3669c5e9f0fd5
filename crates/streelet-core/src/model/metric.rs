// ── Summary tiles ──

use std::sync::Arc;

use serde::Serialize;

use super::device::Device;

/// One summary card on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricTile {
    pub title: String,
    pub value: u64,
    pub subtitle: String,
    pub color_class: String,
}

impl MetricTile {
    fn new(title: &str, value: u64, subtitle: &str, color_class: &str) -> Self {
        Self {
            title: title.into(),
            value,
            subtitle: subtitle.into(),
            color_class: color_class.into(),
        }
    }
}

/// The four dashboard tiles for a device list.
///
/// Only the device count is live. Groups, categories and jobs have no
/// backend source yet and always read zero.
pub fn tiles_for(devices: &[Arc<Device>]) -> Vec<MetricTile> {
    let count = u64::try_from(devices.len()).unwrap_or(u64::MAX);
    vec![
        MetricTile::new("Devices", count, "Connected", "bg-blue"),
        MetricTile::new("Device Groups", 0, "Active Groups", "bg-purple"),
        MetricTile::new("Device Categories", 0, "Categories in use", "bg-orange"),
        MetricTile::new("Device Jobs", 0, "Scheduled Jobs", "bg-red"),
    ]
}
