// ── Reactive device store ──
//
// Holds the current `Snapshot` behind a single `watch` channel. Every
// write swaps the whole snapshot, so subscribers see either the old list
// with its tiles or the new one with its tiles, never a mix.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::snapshot::Snapshot;
use crate::model::{Device, DeviceId, MetricTile};
use crate::stream::SnapshotStream;

/// Canonical in-memory device state.
///
/// Reads are open to everyone; writes are crate-private and go through
/// [`DeviceSync`](crate::DeviceSync).
pub struct DeviceStore {
    snapshot: watch::Sender<Arc<Snapshot>>,
}

impl DeviceStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::empty()));
        Self { snapshot }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.snapshot.borrow().devices().to_vec()
    }

    pub fn device_by_id(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.snapshot.borrow().device(id).cloned()
    }

    pub fn device_count(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn tiles(&self) -> Vec<MetricTile> {
        self.snapshot.borrow().tiles().to_vec()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshot.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.snapshot.borrow().refreshed_at()
    }

    /// How long ago the last successful refresh landed, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace the device list with the result of refresh `sequence`.
    ///
    /// Returns `false` and leaves the snapshot alone when a refresh with
    /// an equal or newer sequence has already been applied.
    pub(crate) fn apply_refresh(&self, sequence: u64, devices: Vec<Device>) -> bool {
        self.snapshot.send_if_modified(|current| {
            if sequence <= current.sequence() {
                return false;
            }
            let devices = devices.into_iter().map(Arc::new).collect();
            *current = Arc::new(Snapshot::new(devices, sequence, Some(Utc::now())));
            true
        })
    }

    /// Apply `f` to one device and republish with recomputed tiles.
    ///
    /// Returns the updated device, or `None` if `id` is not in the current
    /// snapshot (nothing is published then).
    pub(crate) fn update_device(
        &self,
        id: &DeviceId,
        f: impl FnOnce(&mut Device),
    ) -> Option<Arc<Device>> {
        let mut updated = None;
        self.snapshot.send_if_modified(|current| {
            let Some((next, device)) = current.with_device(id, f) else {
                return false;
            };
            *current = Arc::new(next);
            updated = Some(device);
            true
        });
        updated
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}
