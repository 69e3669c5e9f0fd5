// ── Core error types ──
//
// User-facing errors from streelet-core. Consumers never match on reqwest
// or serde failures directly; the `From<streelet_api::Error>` impl folds
// transport-layer errors into the variants below.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to dashboard at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Dashboard request timed out ({url})")]
    Timeout { url: String },

    #[error("Dashboard has no WiFi credentials yet; run `streelet wifi set` first")]
    WifiSetupRequired,

    // ── Backend answers ──────────────────────────────────────────────
    #[error("Dashboard returned HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Backend { status: u16, message: Option<String> },

    #[error("Operation rejected by dashboard: {message}")]
    Rejected { message: String },

    #[error("Unexpected response from dashboard: {message}")]
    Decode { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Another {operation} is already in progress")]
    Busy { operation: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The text the dashboard itself sent with a failure, if any.
    ///
    /// UIs prefer this over the formatted error so users see the
    /// backend's own wording.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Backend { message, .. } => message.as_deref(),
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<streelet_api::Error> for CoreError {
    fn from(err: streelet_api::Error) -> Self {
        match err {
            streelet_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else if let Some(status) = e.status() {
                    CoreError::Backend {
                        status: status.as_u16(),
                        message: None,
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            streelet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            streelet_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            streelet_api::Error::Backend { status, message } => {
                CoreError::Backend { status, message }
            }
            streelet_api::Error::Rejected { message } => CoreError::Rejected { message },
            streelet_api::Error::WifiSetupRequired => CoreError::WifiSetupRequired,
            streelet_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}
