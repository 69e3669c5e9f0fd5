//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use streelet_config::ConfigError;
use streelet_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to dashboard at {url}")]
    #[diagnostic(
        code(streelet::connection_failed),
        help(
            "Check that the dashboard is running and reachable.\n\
             URL: {url}\n\
             Self-signed certificate? Try: streelet devices list --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out ({url})")]
    #[diagnostic(
        code(streelet::timeout),
        help("Increase timeout with --timeout or check dashboard responsiveness.")
    )]
    Timeout { url: String },

    #[error("The dashboard host has no WiFi credentials yet")]
    #[diagnostic(
        code(streelet::wifi_setup_required),
        help("Run: streelet wifi set --ssid <SSID>")
    )]
    WifiSetupRequired,

    // ── Resources ────────────────────────────────────────────────────
    #[error("Device '{identifier}' not found")]
    #[diagnostic(
        code(streelet::not_found),
        help("Run: streelet devices list to see available devices")
    )]
    NotFound { identifier: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Dashboard error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(code(streelet::api_error))]
    ApiError { status: Option<u16>, message: String },

    #[error("{operation} is already in progress")]
    #[diagnostic(code(streelet::busy))]
    Busy { operation: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(streelet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(streelet::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: streelet config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No dashboard configured")]
    #[diagnostic(
        code(streelet::no_config),
        help(
            "Create a profile with: streelet config init\n\
             Or pass --server / set STREELET_SERVER.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("No WiFi password configured for profile '{profile}'")]
    #[diagnostic(
        code(streelet::no_credentials),
        help(
            "Pass --password-env <VAR>, set wifi_password_env in the profile,\n\
             or store it with: streelet config init"
        )
    )]
    NoCredentials { profile: String },

    #[error(transparent)]
    #[diagnostic(code(streelet::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(streelet::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("{action} cancelled")]
    #[diagnostic(code(streelet::cancelled))]
    Cancelled { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(streelet::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::WifiSetupRequired => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Cancelled { .. } => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout { url } => CliError::Timeout { url },

            CoreError::WifiSetupRequired => CliError::WifiSetupRequired,

            CoreError::DeviceNotFound { identifier } => CliError::NotFound { identifier },

            CoreError::Backend { status, message } => CliError::ApiError {
                status: Some(status),
                message: message.unwrap_or_else(|| "no message".into()),
            },

            CoreError::Rejected { message } | CoreError::Decode { message } => {
                CliError::ApiError {
                    status: None,
                    message,
                }
            }

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Busy { operation } => CliError::Busy { operation },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let not_found = CliError::from(CoreError::DeviceNotFound {
            identifier: "7".into(),
        });
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);

        let timeout = CliError::from(CoreError::Timeout {
            url: "http://dash".into(),
        });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let refused = CliError::from(CoreError::ConnectionFailed {
            url: "http://dash".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(refused.exit_code(), exit_code::CONNECTION);

        let invalid = CliError::from(ConfigError::Validation {
            field: "server".into(),
            reason: "invalid URL".into(),
        });
        assert_eq!(invalid.exit_code(), exit_code::USAGE);

        let cancelled = CliError::Cancelled {
            action: "delete".into(),
        };
        assert_eq!(cancelled.exit_code(), exit_code::CANCELLED);
    }

    #[test]
    fn backend_message_is_kept() {
        let err = CliError::from(CoreError::Backend {
            status: 404,
            message: Some("Device with id \"3\" not found.".into()),
        });
        assert_eq!(
            err.to_string(),
            "Dashboard error (HTTP 404): Device with id \"3\" not found."
        );
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
