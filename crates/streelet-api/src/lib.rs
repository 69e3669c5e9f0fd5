// streelet-api: Async Rust client for the device dashboard backend

pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod provisioning;
pub mod transport;

pub use client::DashboardClient;
pub use error::Error;
pub use models::{Ack, ConfigureRequest, NewDevice, PowerAction, RawDevice, RawId};
pub use transport::{TlsMode, TransportConfig};
