use thiserror::Error;

/// Top-level error type for the `streelet-api` crate.
///
/// Covers every failure mode of the dashboard backend boundary:
/// transport, non-2xx application errors, explicit rejections in a 2xx
/// body, and response decoding. `streelet-core` maps these into
/// user-facing variants.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or construction error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Application ─────────────────────────────────────────────────
    /// Non-2xx response. `message` is lifted from the `{error}` or
    /// `{message}` field of the body when the backend sent one.
    #[error("Backend error (HTTP {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Backend { status: u16, message: Option<String> },

    /// 2xx response whose body carries `{error}` instead of `{message}`.
    #[error("Request rejected by backend: {message}")]
    Rejected { message: String },

    /// The backend redirected to its WiFi setup page. Every endpoint does
    /// this until credentials have been provided via `POST /wifi`.
    #[error("Backend WiFi credentials are not configured")]
    WifiSetupRequired,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Backend { status: 404, .. })
    }

    /// The message the backend itself provided, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Backend { message, .. } => message.as_deref(),
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }

    /// HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display_includes_message() {
        let err = Error::Backend {
            status: 404,
            message: Some("Device with id \"7\" not found.".into()),
        };
        assert_eq!(
            err.to_string(),
            "Backend error (HTTP 404): Device with id \"7\" not found."
        );
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn backend_error_without_message() {
        let err = Error::Backend {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "Backend error (HTTP 502): no message");
        assert!(err.is_transient());
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn rejected_exposes_server_message() {
        let err = Error::Rejected {
            message: "broker offline".into(),
        };
        assert_eq!(err.server_message(), Some("broker offline"));
        assert_eq!(err.status(), None);
    }
}
