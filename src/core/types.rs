//! Core data types for the positioning system

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single access point observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiReading {
    /// Stable hardware identifier of the access point radio
    pub bssid: String,
    /// Human-readable network name, may be empty
    pub ssid: String,
    /// Received signal strength (dBm)
    pub level: i32,
    /// Channel frequency (MHz)
    pub frequency: u32,
}

impl WifiReading {
    pub fn new(bssid: impl Into<String>, ssid: impl Into<String>, level: i32, frequency: u32) -> Self {
        Self {
            bssid: bssid.into(),
            ssid: ssid.into(),
            level,
            frequency,
        }
    }
}

/// Set of readings keyed by bssid, at most one reading per access point.
///
/// Iteration is in ascending bssid order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fingerprint {
    readings: BTreeMap<String, WifiReading>,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reading, replacing any prior reading for the same bssid
    pub fn insert(&mut self, reading: WifiReading) -> Option<WifiReading> {
        self.readings.insert(reading.bssid.clone(), reading)
    }

    pub fn get(&self, bssid: &str) -> Option<&WifiReading> {
        self.readings.get(bssid)
    }

    pub fn contains(&self, bssid: &str) -> bool {
        self.readings.contains_key(bssid)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WifiReading> {
        self.readings.values()
    }

    pub fn bssids(&self) -> impl Iterator<Item = &str> {
        self.readings.keys().map(String::as_str)
    }
}

impl FromIterator<WifiReading> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = WifiReading>>(iter: I) -> Self {
        let mut fingerprint = Fingerprint::new();
        for reading in iter {
            fingerprint.insert(reading);
        }
        fingerprint
    }
}

impl IntoIterator for Fingerprint {
    type Item = WifiReading;
    type IntoIter = std::collections::btree_map::IntoValues<String, WifiReading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.into_values()
    }
}

/// Labeled calibration location with its recorded fingerprint
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePoint {
    pub id: String,
    pub name: String,
    /// Horizontal map coordinate, percent of map width
    pub x: f64,
    /// Vertical map coordinate, percent of map height
    pub y: f64,
    pub timestamp: DateTime<Utc>,
    pub fingerprint: Fingerprint,
}

impl ReferencePoint {
    /// Create a point stamped with the current time
    pub fn new(id: impl Into<String>, name: impl Into<String>, x: f64, y: f64, fingerprint: Fingerprint) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x,
            y,
            timestamp: now_millis(),
            fingerprint,
        }
    }

    /// Set the recording time, truncated to millisecond precision
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = truncate_to_millis(timestamp);
        self
    }
}

/// Result of a position estimate. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPosition {
    pub x: f64,
    pub y: f64,
    /// Confidence in the estimate (0.0 to 1.0)
    pub accuracy: f64,
    /// Ids of the neighbor set in rank order
    pub neighbor_ids: Vec<String>,
}

impl CurrentPosition {
    pub fn neighbor_count(&self) -> usize {
        self.neighbor_ids.len()
    }
}

/// Map the caller is currently working on. Used only to tag results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapContext {
    pub map_id: String,
    pub name: String,
}

/// Current time truncated to millisecond precision, matching the interchange format
/// Drop sub-millisecond precision, which the interchange format cannot carry
pub(crate) fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(3)
}

pub(crate) fn now_millis() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_replaces_duplicate_bssid() {
        let mut fingerprint = Fingerprint::new();
        fingerprint.insert(WifiReading::new("aa:bb", "lab", -60, 2412));
        let previous = fingerprint.insert(WifiReading::new("aa:bb", "lab", -48, 2412));

        assert_eq!(previous.map(|r| r.level), Some(-60));
        assert_eq!(fingerprint.len(), 1);
        assert_eq!(fingerprint.get("aa:bb").map(|r| r.level), Some(-48));
    }

    #[test]
    fn test_fingerprint_iterates_in_bssid_order() {
        let fingerprint: Fingerprint = vec![
            WifiReading::new("c", "", -70, 5180),
            WifiReading::new("a", "", -50, 2412),
            WifiReading::new("b", "", -60, 2437),
        ]
        .into_iter()
        .collect();

        let order: Vec<&str> = fingerprint.bssids().collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reference_point_timestamp_has_millisecond_precision() {
        let point = ReferencePoint::new("p1", "Lobby", 10.0, 20.0, Fingerprint::new());
        assert_eq!(point.timestamp.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_with_timestamp_truncates_to_millis() {
        let precise = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let point = ReferencePoint::new("p1", "Lobby", 10.0, 20.0, Fingerprint::new()).with_timestamp(precise);

        assert_eq!(point.timestamp.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(point.timestamp.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_truncation_before_epoch_matches_millis() {
        let precise = DateTime::from_timestamp(-5, 999_999_999).unwrap();
        let truncated = truncate_to_millis(precise);

        assert_eq!(DateTime::from_timestamp_millis(truncated.timestamp_millis()), Some(truncated));
    }
}
