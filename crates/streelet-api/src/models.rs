// Dashboard backend request/response types
//
// The backend is a small JSON service; its payloads are loosely typed, so
// optional fields use `#[serde(default)]` and unknown fields land in
// `extra` rather than failing the decode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ── Identifiers ──────────────────────────────────────────────────────

/// A device identifier as the backend sends it: a JSON number for rows
/// inserted by tests or tooling, a string for ids reported by the devices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RawId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for RawId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

// ── Device ───────────────────────────────────────────────────────────

/// One row of `GET /devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDevice {
    pub id: RawId,
    #[serde(default)]
    pub name: Option<String>,
    /// `"online"` or `"offline"`.
    pub status: String,
    /// Opaque timestamp; not interpreted by the client.
    #[serde(default)]
    pub last_seen: Option<serde_json::Value>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    /// Catch-all for fields the client does not model (`device_id`,
    /// the backend's own `device_status` column, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Power command path segment for `POST /devices/{id}/power/{action}`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PowerAction {
    On,
    Off,
}

impl PowerAction {
    /// The opposite command.
    pub fn inverse(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

/// Body of `POST /devices` (manual registration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDevice {
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

// ── Provisioning ─────────────────────────────────────────────────────

/// Body of `POST /configure`. The backend expects the group under `grupo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureRequest {
    #[serde(rename = "grupo")]
    pub group: String,
    pub name: String,
}

// ── Acknowledgments ──────────────────────────────────────────────────

/// The `{message}` / `{error}` body every write endpoint answers with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Ack {
    /// Require a `message`; an `error` (or nothing at all) is a rejection.
    pub fn into_message(self) -> Result<String, Error> {
        match (self.message, self.error) {
            (Some(message), _) => Ok(message),
            (None, Some(message)) => Err(Error::Rejected { message }),
            (None, None) => Err(Error::Rejected {
                message: "backend acknowledged without a message".into(),
            }),
        }
    }

    /// The error or message text, whichever the backend provided.
    pub(crate) fn any_text(self) -> Option<String> {
        self.error.or(self.message)
    }
}
