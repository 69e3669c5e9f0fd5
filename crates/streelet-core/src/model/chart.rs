// ── Chart series ──
//
// Label/value pairs handed to whatever renders charts. Rendering itself
// is out of this crate's hands.

use std::sync::Arc;

use serde::Serialize;

use super::device::{Device, DeviceStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl ChartSeries {
    pub fn push(&mut self, label: impl Into<String>, value: u64) {
        self.labels.push(label.into());
        self.values.push(value);
    }

    /// Online/offline counts, always in that order.
    pub fn status_distribution(devices: &[Arc<Device>]) -> Self {
        let online = devices
            .iter()
            .filter(|d| d.status() == DeviceStatus::Online)
            .count();
        let offline = devices.len() - online;

        let mut series = Self::default();
        series.push("Online", u64::try_from(online).unwrap_or(u64::MAX));
        series.push("Offline", u64::try_from(offline).unwrap_or(u64::MAX));
        series
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}
