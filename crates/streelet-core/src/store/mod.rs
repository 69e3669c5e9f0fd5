// ── Device snapshot storage ──

mod device_store;
mod snapshot;

pub use device_store::DeviceStore;
pub use snapshot::Snapshot;
