// ── Device domain types ──

use serde::{Deserialize, Serialize};
use streelet_api::PowerAction;

use super::device_id::DeviceId;
use crate::palette::{ColorAssigner, ColorToken};

/// Connectivity as reported by the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    /// Binary projection used by the dashboard toggle (`1` = online).
    pub fn flag(self) -> u8 {
        match self {
            Self::Online => 1,
            Self::Offline => 0,
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }

    /// Status a device ends up in once `action` has been acknowledged.
    pub fn after(action: PowerAction) -> Self {
        match action {
            PowerAction::On => Self::Online,
            PowerAction::Off => Self::Offline,
        }
    }
}

/// A device in the dashboard.
///
/// `status`, `device_status` and `color` are kept private: the flag and
/// the color are derived from the status and only change together with
/// it, through [`Device::set_status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    status: DeviceStatus,
    device_status: u8,
    /// Opaque timestamp, passed through as the backend sent it.
    pub last_seen: Option<serde_json::Value>,
    pub ip: Option<String>,
    pub topic: Option<String>,
    color: ColorToken,
}

impl Device {
    pub fn new(
        id: DeviceId,
        name: impl Into<String>,
        status: DeviceStatus,
        colors: &ColorAssigner,
    ) -> Self {
        let color = colors.color_for(status, &id);
        Self {
            id,
            name: name.into(),
            status,
            device_status: status.flag(),
            last_seen: None,
            ip: None,
            topic: None,
            color,
        }
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    /// `1` when online, `0` when offline.
    pub fn device_status(&self) -> u8 {
        self.device_status
    }

    pub fn is_online(&self) -> bool {
        self.status.is_online()
    }

    /// Gradient tag derived from `(status, id)`.
    pub fn color(&self) -> &ColorToken {
        &self.color
    }

    /// The command a toggle sends: the complement of the current flag.
    pub fn toggle_action(&self) -> PowerAction {
        if self.device_status == 1 {
            PowerAction::Off
        } else {
            PowerAction::On
        }
    }

    pub(crate) fn set_status(&mut self, status: DeviceStatus, colors: &ColorAssigner) {
        self.status = status;
        self.device_status = status.flag();
        self.color = colors.color_for(status, &self.id);
    }
}
