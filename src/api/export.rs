//! JSON interchange format for reference point backups
//!
//! The payload is an array of point records:
//!
//! ```json
//! [{"id": "p1", "name": "Lobby", "x": 12.5, "y": 40.0, "timestamp": 1723111199986,
//!   "wifiReadings": [{"bssid": "aa:bb:cc:dd:ee:ff", "ssid": "corp", "level": -52, "frequency": 2412}]}]
//! ```
//!
//! Every field is required. Unknown fields are ignored so newer writers stay
//! readable.

use crate::core::{Fingerprint, ReferencePoint, WifiReading};
use crate::validation::{PointValidator, PositioningError, PositioningResult};
use chrono::DateTime;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Wire representation of one access point reading
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReadingRecord {
    bssid: String,
    ssid: String,
    level: i32,
    frequency: u32,
}

/// Wire representation of one reference point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointRecord {
    id: String,
    name: String,
    x: f64,
    y: f64,
    /// Epoch milliseconds
    timestamp: i64,
    wifi_readings: Vec<ReadingRecord>,
}

impl From<&WifiReading> for ReadingRecord {
    fn from(reading: &WifiReading) -> Self {
        Self {
            bssid: reading.bssid.clone(),
            ssid: reading.ssid.clone(),
            level: reading.level,
            frequency: reading.frequency,
        }
    }
}

impl From<ReadingRecord> for WifiReading {
    fn from(record: ReadingRecord) -> Self {
        WifiReading {
            bssid: record.bssid,
            ssid: record.ssid,
            level: record.level,
            frequency: record.frequency,
        }
    }
}

impl From<&ReferencePoint> for PointRecord {
    fn from(point: &ReferencePoint) -> Self {
        Self {
            id: point.id.clone(),
            name: point.name.clone(),
            x: point.x,
            y: point.y,
            timestamp: point.timestamp.timestamp_millis(),
            wifi_readings: point.fingerprint.iter().map(ReadingRecord::from).collect(),
        }
    }
}

impl PointRecord {
    fn into_point(self, index: usize) -> PositioningResult<ReferencePoint> {
        let timestamp = DateTime::from_timestamp_millis(self.timestamp).ok_or_else(|| {
            PositioningError::serialization(format!(
                "record {}: timestamp {} is out of range",
                index, self.timestamp
            ))
        })?;

        // Later duplicates of a bssid overwrite earlier ones
        let fingerprint: Fingerprint = self.wifi_readings.into_iter().map(WifiReading::from).collect();

        Ok(ReferencePoint {
            id: self.id,
            name: self.name,
            x: self.x,
            y: self.y,
            timestamp,
            fingerprint,
        })
    }
}

/// Serializes reference points to and from the interchange format
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    /// Pretty print JSON output
    pub pretty: bool,
    validator: PointValidator,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pretty-printing exporter
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    /// Validate imported records against `validator` instead of the map defaults
    pub fn with_validator(mut self, validator: PointValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn export(&self, points: &[ReferencePoint]) -> PositioningResult<String> {
        let records: Vec<PointRecord> = points.iter().map(PointRecord::from).collect();
        let json = if self.pretty {
            serde_json::to_string_pretty(&records)?
        } else {
            serde_json::to_string(&records)?
        };
        debug!("exported {} reference points ({} bytes)", records.len(), json.len());
        Ok(json)
    }

    /// Parse and validate a payload. Any bad record fails the whole import.
    pub fn import(&self, data: &str) -> PositioningResult<Vec<ReferencePoint>> {
        let records: Vec<PointRecord> = serde_json::from_str(data).map_err(|e| {
            warn!("rejected import payload: {}", e);
            PositioningError::from(e)
        })?;

        let mut seen = HashSet::with_capacity(records.len());
        let mut points = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            if !seen.insert(record.id.clone()) {
                return Err(PositioningError::serialization(format!(
                    "record {}: duplicate id '{}'",
                    index, record.id
                )));
            }

            let point = record.into_point(index)?;
            self.validator.validate_point(&point).map_err(|e| {
                PositioningError::serialization(format!("record {} ('{}'): {}", index, point.id, e))
            })?;
            points.push(point);
        }

        Ok(points)
    }

    pub fn export_to_file<P: AsRef<Path>>(&self, points: &[ReferencePoint], path: P) -> PositioningResult<()> {
        let json = self.export(points)?;
        fs::write(&path, json).map_err(|e| PositioningError::Io {
            message: format!("failed to write '{}': {}", path.as_ref().display(), e),
        })
    }

    pub fn import_from_file<P: AsRef<Path>>(&self, path: P) -> PositioningResult<Vec<ReferencePoint>> {
        let content = fs::read_to_string(&path).map_err(|e| PositioningError::Io {
            message: format!("failed to read '{}': {}", path.as_ref().display(), e),
        })?;
        self.import(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_points() -> Vec<ReferencePoint> {
        let lobby: Fingerprint = vec![
            WifiReading::new("00:11:22:33:44:55", "corp", -48, 2412),
            WifiReading::new("66:77:88:99:aa:bb", "", -81, 5745),
        ]
        .into_iter()
        .collect();
        let stairs: Fingerprint = vec![WifiReading::new("00:11:22:33:44:55", "corp", -73, 2412)]
            .into_iter()
            .collect();

        vec![
            ReferencePoint::new("lobby", "Lobby", 12.5, 40.0, lobby),
            ReferencePoint::new("stairs", "Stairs", 88.0, 3.25, stairs),
        ]
    }

    #[test]
    fn test_round_trip() {
        let exporter = Exporter::new();
        let points = sample_points();

        let json = exporter.export(&points).unwrap();
        let restored = exporter.import(&json).unwrap();

        assert_eq!(restored, points);
    }

    #[test]
    fn test_schema_field_names() {
        let json = Exporter::new().export(&sample_points()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let first = &value[0];
        assert_eq!(first["id"], "lobby");
        assert!(first["timestamp"].is_i64());
        assert!(first["wifiReadings"].is_array());
        assert_eq!(first["wifiReadings"][0]["level"], -48);
        assert_eq!(first["wifiReadings"][0]["frequency"], 2412);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let payload = r#"[{"id": "p1", "name": "Desk", "x": 10, "y": 10, "timestamp": 0,
            "wifiReadings": [{"bssid": "a", "ssid": "x", "level": -50}]}]"#;

        let result = Exporter::new().import(payload);
        assert!(matches!(result, Err(PositioningError::Serialization { .. })));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let payload = r#"[{"id": "p1", "name": "Desk", "x": 10, "y": 10, "timestamp": 1700000000000,
            "floor": 3, "wifiReadings": [{"bssid": "a", "ssid": "x", "level": -50, "frequency": 2412,
            "capabilities": "[WPA2]"}]}]"#;

        let points = Exporter::new().import(payload).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].timestamp.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_wrong_type_rejected() {
        let payload = r#"[{"id": "p1", "name": "Desk", "x": "ten", "y": 10, "timestamp": 0, "wifiReadings": []}]"#;
        assert!(Exporter::new().import(payload).is_err());
    }

    #[test]
    fn test_out_of_range_record_rejected() {
        let payload = r#"[{"id": "p1", "name": "Desk", "x": 101, "y": 10, "timestamp": 0, "wifiReadings": []}]"#;

        match Exporter::new().import(payload) {
            Err(PositioningError::Serialization { message }) => assert!(message.contains("record 0")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let payload = r#"[
            {"id": "p1", "name": "A", "x": 1, "y": 1, "timestamp": 0, "wifiReadings": []},
            {"id": "p1", "name": "B", "x": 2, "y": 2, "timestamp": 0, "wifiReadings": []}
        ]"#;
        assert!(Exporter::new().import(payload).is_err());
    }

    #[test]
    fn test_duplicate_bssid_in_record_collapses() {
        let payload = r#"[{"id": "p1", "name": "Desk", "x": 1, "y": 1, "timestamp": 0, "wifiReadings": [
            {"bssid": "a", "ssid": "", "level": -40, "frequency": 2412},
            {"bssid": "a", "ssid": "", "level": -65, "frequency": 2412}]}]"#;

        let points = Exporter::new().import(payload).unwrap();
        assert_eq!(points[0].fingerprint.len(), 1);
        assert_eq!(points[0].fingerprint.get("a").map(|r| r.level), Some(-65));
    }

    #[test]
    fn test_file_round_trip() {
        let exporter = Exporter::pretty();
        let points = sample_points();
        let file = NamedTempFile::new().unwrap();

        exporter.export_to_file(&points, file.path()).unwrap();
        let restored = exporter.import_from_file(file.path()).unwrap();
        assert_eq!(restored, points);
        assert!(fs::read_to_string(file.path()).unwrap().contains("\n  {"));
    }

    #[test]
    fn test_import_uses_configured_validator() {
        let json = Exporter::new().export(&sample_points()).unwrap();
        let west_wing = Exporter::new().with_validator(PointValidator::with_bounds(0.0, 50.0).unwrap());

        match west_wing.import(&json) {
            Err(PositioningError::Serialization { message }) => assert!(message.contains("stairs")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_implausible_level_rejected() {
        let payload = r#"[{"id": "p1", "name": "Desk", "x": 1, "y": 1, "timestamp": 0, "wifiReadings": [
            {"bssid": "a", "ssid": "", "level": 4000, "frequency": 2412}]}]"#;

        assert!(matches!(
            Exporter::new().import(payload),
            Err(PositioningError::Serialization { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Exporter::new().import_from_file("/nonexistent/fingerprints.json");
        assert!(matches!(result, Err(PositioningError::Io { .. })));
    }
}
