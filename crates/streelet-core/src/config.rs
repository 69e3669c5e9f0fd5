// ── Runtime dashboard configuration ──
//
// These types describe how to reach a dashboard backend and how often to
// poll it. They never touch disk: the CLI builds a `DashboardConfig` from
// its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use streelet_api::transport::{TlsMode, TransportConfig};
use streelet_api::DashboardClient;
use url::Url;

use crate::error::CoreError;

/// Poll interval used by the dashboard device list.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
/// Delay between a successful provisioning submit and the redirect.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(8);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Where the wizard sends the user after provisioning.
pub const DEFAULT_REDIRECT_TARGET: &str = "/";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs on the dashboard host).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single dashboard backend.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Dashboard root URL (e.g., `http://192.168.4.1:5000`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How often the sync store refreshes while polling.
    pub poll_interval: Duration,
    pub redirect_delay: Duration,
    pub redirect_target: String,
}

impl DashboardConfig {
    /// A config for `url` with every other setting at its default.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            redirect_target: DEFAULT_REDIRECT_TARGET.into(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }

    /// Build the HTTP client for this dashboard.
    pub fn client(&self) -> Result<DashboardClient, CoreError> {
        Ok(DashboardClient::new(self.url.clone(), &self.transport())?)
    }
}
