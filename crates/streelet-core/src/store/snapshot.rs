use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::metric::tiles_for;
use crate::model::{ChartSeries, Device, DeviceId, MetricTile};

/// An immutable view of the device list and everything derived from it.
///
/// Tiles are computed when the snapshot is built, so a published snapshot
/// never pairs a device list with stale tiles.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    devices: Vec<Arc<Device>>,
    tiles: Vec<MetricTile>,
    sequence: u64,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub(crate) fn new(
        devices: Vec<Arc<Device>>,
        sequence: u64,
        refreshed_at: Option<DateTime<Utc>>,
    ) -> Self {
        let tiles = tiles_for(&devices);
        Self {
            devices,
            tiles,
            sequence,
            refreshed_at,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new(Vec::new(), 0, None)
    }

    /// Devices in backend order.
    pub fn devices(&self) -> &[Arc<Device>] {
        &self.devices
    }

    pub fn tiles(&self) -> &[MetricTile] {
        &self.tiles
    }

    /// Sequence number of the refresh that produced this list (`0` before
    /// the first successful refresh).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn device(&self, id: &DeviceId) -> Option<&Arc<Device>> {
        self.devices.iter().find(|d| d.id == *id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn status_chart(&self) -> ChartSeries {
        ChartSeries::status_distribution(&self.devices)
    }

    /// A copy with the device `id` replaced by `f(device)`. `None` if the
    /// device is not in this snapshot.
    pub(crate) fn with_device(
        &self,
        id: &DeviceId,
        f: impl FnOnce(&mut Device),
    ) -> Option<(Self, Arc<Device>)> {
        let index = self.devices.iter().position(|d| d.id == *id)?;
        let mut devices = self.devices.clone();
        let mut updated = Device::clone(&devices[index]);
        f(&mut updated);
        let updated = Arc::new(updated);
        devices[index] = Arc::clone(&updated);
        Some((
            Self::new(devices, self.sequence, self.refreshed_at),
            updated,
        ))
    }
}
