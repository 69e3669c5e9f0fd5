// streelet-core: Device sync store and provisioning wizard between
// streelet-api and consumers (CLI).

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod palette;
pub mod store;
pub mod stream;
pub mod sync;
pub mod wizard;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DashboardConfig, TlsVerification};
pub use error::CoreError;
pub use palette::{ColorAssigner, ColorHasher, ColorToken, Fnv1aHasher, Palette, SineHasher};
pub use store::{DeviceStore, Snapshot};
pub use stream::SnapshotStream;
pub use sync::{
    Confirm, DeleteOutcome, DeviceSync, PowerChange, RefreshOutcome, SyncEvent,
};
pub use wizard::{Navigator, ProvisioningWizard, WizardDraft, WizardOutcome, WizardStep};

// Re-export model types at the crate root for ergonomics.
pub use model::{ChartSeries, Device, DeviceId, DeviceStatus, MetricTile};

// API types that appear in core signatures.
pub use streelet_api::{DashboardClient, NewDevice, PowerAction};
