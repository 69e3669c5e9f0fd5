// ── Device identity ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use streelet_api::RawId;

/// Opaque, stable device identifier.
///
/// The backend sends ids as JSON numbers or strings; both collapse to the
/// same canonical string form, so `1` and `"1"` name the same device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id read as a finite number, when it is one (`"42"`, `"7.5"`).
    pub fn as_number(&self) -> Option<f64> {
        self.0
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<RawId> for DeviceId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        }
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_ids_share_a_form() {
        assert_eq!(DeviceId::from(RawId::from(12)), DeviceId::from("12"));
        assert_eq!(DeviceId::from(RawId::from("esp-3")).as_str(), "esp-3");
    }

    #[test]
    fn numeric_view() {
        assert_eq!(DeviceId::from("42").as_number(), Some(42.0));
        assert_eq!(DeviceId::from("esp-3").as_number(), None);
        assert_eq!(DeviceId::from("NaN").as_number(), None);
        assert_eq!(DeviceId::from("inf").as_number(), None);
    }
}
