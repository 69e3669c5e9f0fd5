// ── Deterministic device colors ──
//
// Every device gets a gradient picked from a per-status palette by hashing
// its id. The same `(status, id)` always lands on the same gradient, so a
// card keeps its color across polls and switches palette when its status
// flips.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{DeviceId, DeviceStatus};

/// Multiplier applied to the numeric id before the sine step.
pub const SEED_MULTIPLIER: f64 = 99_991.0;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

const ONLINE_GRADIENTS: [&str; 5] = [
    "linear-gradient(135deg, #1abc9c 0%, #16a085 100%)",
    "linear-gradient(135deg, #3498db 0%, #2980b9 100%)",
    "linear-gradient(135deg, #2ecc71 0%, #27ae60 100%)",
    "linear-gradient(135deg, #00c6ff 0%, #0072ff 100%)",
    "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
];

const OFFLINE_GRADIENTS: [&str; 5] = [
    "linear-gradient(135deg, #e74c3c 0%, #c0392b 100%)",
    "linear-gradient(135deg, #ff4e50 0%, #f80759 100%)",
    "linear-gradient(135deg, #ff6a00 0%, #ee0979 100%)",
    "linear-gradient(135deg, #ff3e3e 0%, #ff0000 100%)",
    "linear-gradient(135deg, #ff5f6d 0%, #ff3c41 100%)",
];

// ── ColorToken ───────────────────────────────────────────────────────

/// An opaque presentation tag (a CSS gradient for the web dashboard).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ColorToken(Arc<str>);

impl ColorToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColorToken {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for ColorToken {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

// ── Palette ──────────────────────────────────────────────────────────

/// Two ordered, non-empty color lists: one per status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    online: Vec<ColorToken>,
    offline: Vec<ColorToken>,
}

impl Palette {
    pub fn new<I, J, T, U>(online: I, offline: J) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = T>,
        J: IntoIterator<Item = U>,
        T: Into<ColorToken>,
        U: Into<ColorToken>,
    {
        let online: Vec<ColorToken> = online.into_iter().map(Into::into).collect();
        let offline: Vec<ColorToken> = offline.into_iter().map(Into::into).collect();
        if online.is_empty() || offline.is_empty() {
            return Err(CoreError::Config {
                message: "color palettes must not be empty".into(),
            });
        }
        Ok(Self { online, offline })
    }

    pub fn for_status(&self, status: DeviceStatus) -> &[ColorToken] {
        match status {
            DeviceStatus::Online => &self.online,
            DeviceStatus::Offline => &self.offline,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            online: ONLINE_GRADIENTS.iter().copied().map(ColorToken::from).collect(),
            offline: OFFLINE_GRADIENTS.iter().copied().map(ColorToken::from).collect(),
        }
    }
}

// ── Hashers ──────────────────────────────────────────────────────────

/// Maps a device id to a fraction in `[0, 1)`.
///
/// Implementations must be pure: equal ids always give equal fractions.
pub trait ColorHasher: fmt::Debug + Send + Sync {
    fn fraction(&self, id: &DeviceId) -> f64;
}

/// `frac(sin(seed * 99991) * 10000)`, matching the colors the web
/// dashboard has always shown.
///
/// Non-numeric ids are folded to a seed with FNV-1a first. The result
/// depends on the platform's `sin`; use [`Fnv1aHasher`] when colors must
/// agree bit-for-bit across platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct SineHasher;

impl ColorHasher for SineHasher {
    fn fraction(&self, id: &DeviceId) -> f64 {
        let numeric = id
            .as_number()
            .unwrap_or_else(|| f64::from(fnv1a(id.as_str().as_bytes())));
        let x = (numeric * SEED_MULTIPLIER).sin() * 10_000.0;
        x - x.floor()
    }
}

/// Integer-only hash of the id's string form.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv1aHasher;

impl ColorHasher for Fnv1aHasher {
    fn fraction(&self, id: &DeviceId) -> f64 {
        f64::from(fnv1a(id.as_str().as_bytes())) / (f64::from(u32::MAX) + 1.0)
    }
}

fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, b| {
        (hash ^ u32::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::as_conversions
)]
fn index_for(fraction: f64, len: usize) -> usize {
    if !fraction.is_finite() || fraction <= 0.0 {
        return 0;
    }
    ((fraction * len as f64).floor() as usize).min(len.saturating_sub(1))
}

// ── ColorAssigner ────────────────────────────────────────────────────

/// A palette plus the hash that indexes it.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    palette: Palette,
    hasher: Arc<dyn ColorHasher>,
}

impl ColorAssigner {
    pub fn new(palette: Palette, hasher: impl ColorHasher + 'static) -> Self {
        Self {
            palette,
            hasher: Arc::new(hasher),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The gradient for a device in `status`.
    pub fn color_for(&self, status: DeviceStatus, id: &DeviceId) -> ColorToken {
        let colors = self.palette.for_status(status);
        let index = index_for(self.hasher.fraction(id), colors.len());
        colors
            .get(index)
            .cloned()
            .unwrap_or_else(|| ColorToken::from(""))
    }
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::new(Palette::default(), SineHasher)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn index_of(status: DeviceStatus, id: &str) -> usize {
        let palette = Palette::default();
        let color = ColorAssigner::default().color_for(status, &DeviceId::from(id));
        palette
            .for_status(status)
            .iter()
            .position(|c| *c == color)
            .unwrap()
    }

    #[test]
    fn sine_hash_matches_dashboard_indices() {
        assert_eq!(index_of(DeviceStatus::Online, "1"), 4);
        assert_eq!(index_of(DeviceStatus::Online, "3"), 0);
        assert_eq!(index_of(DeviceStatus::Online, "10"), 3);
        assert_eq!(index_of(DeviceStatus::Offline, "6"), 1);
    }

    #[test]
    fn default_palette_gives_dashboard_gradients() {
        let colors = ColorAssigner::default();
        assert_eq!(
            colors
                .color_for(DeviceStatus::Online, &DeviceId::from("1"))
                .as_str(),
            "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)"
        );
        assert_eq!(
            colors
                .color_for(DeviceStatus::Offline, &DeviceId::from("6"))
                .as_str(),
            "linear-gradient(135deg, #ff4e50 0%, #f80759 100%)"
        );
    }

    #[test]
    fn same_id_same_color() {
        let colors = ColorAssigner::default();
        for id in ["1", "2", "esp-a1", "x y z", ""] {
            let id = DeviceId::from(id);
            for status in [DeviceStatus::Online, DeviceStatus::Offline] {
                assert_eq!(colors.color_for(status, &id), colors.color_for(status, &id));
            }
        }
    }

    #[test]
    fn status_flip_switches_palette() {
        let colors = ColorAssigner::default();
        let id = DeviceId::from("7");
        let online = colors.color_for(DeviceStatus::Online, &id);
        let offline = colors.color_for(DeviceStatus::Offline, &id);
        assert!(colors.palette().for_status(DeviceStatus::Online).contains(&online));
        assert!(colors.palette().for_status(DeviceStatus::Offline).contains(&offline));
        assert_ne!(online, offline);
    }

    #[test]
    fn fractions_stay_in_unit_range() {
        for hasher in [&SineHasher as &dyn ColorHasher, &Fnv1aHasher] {
            for n in 0..500 {
                let f = hasher.fraction(&DeviceId::from(n.to_string()));
                assert!((0.0..1.0).contains(&f), "{hasher:?} gave {f} for {n}");
            }
        }
    }

    #[test]
    fn single_color_palette() {
        let palette = Palette::new(["green"], ["red"]).unwrap();
        let colors = ColorAssigner::new(palette, Fnv1aHasher);
        assert_eq!(
            colors.color_for(DeviceStatus::Online, &DeviceId::from("99")).as_str(),
            "green"
        );
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(Palette::new(Vec::<&str>::new(), ["red"]).is_err());
    }

    #[test]
    fn fnv1a_reference_values() {
        assert_eq!(fnv1a(b""), 0x811c_9dc5);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
    }

    #[test]
    fn index_clamps() {
        assert_eq!(index_for(0.999_999_999, 5), 4);
        assert_eq!(index_for(f64::NAN, 5), 0);
    }
}
