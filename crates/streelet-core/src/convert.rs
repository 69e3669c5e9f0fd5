// ── API-to-domain conversions ──
//
// Bridges `streelet_api::RawDevice` rows into `model::Device`. The color
// depends on the configured palette, so conversion takes the assigner
// instead of being a plain `From` impl.

use streelet_api::RawDevice;
use tracing::warn;

use crate::model::{Device, DeviceId, DeviceStatus};
use crate::palette::ColorAssigner;

/// Parse the backend's status string. Anything unrecognized counts as
/// offline, since the dashboard can only toggle devices it knows are up.
fn parse_status(id: &DeviceId, raw: &str) -> DeviceStatus {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(device = %id, status = raw, "unknown device status, treating as offline");
        DeviceStatus::Offline
    })
}

pub fn device_from_raw(raw: RawDevice, colors: &ColorAssigner) -> Device {
    let id = DeviceId::from(raw.id);
    let status = parse_status(&id, &raw.status);
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| id.to_string());

    let mut device = Device::new(id, name, status, colors);
    device.last_seen = raw.last_seen.filter(|v| !v.is_null());
    device.ip = raw.ip;
    device.topic = raw.topic;
    device
}

pub fn devices_from_raw(raw: Vec<RawDevice>, colors: &ColorAssigner) -> Vec<Device> {
    raw.into_iter()
        .map(|r| device_from_raw(r, colors))
        .collect()
}
