use crate::core::{ReferencePoint, WifiReading, MAP_EXTENT, MAX_SIGNAL_LEVEL, MIN_SIGNAL_LEVEL};
use crate::validation::error::{PositioningError, PositioningResult};

/// Checks reference points against the data-model invariants before they reach the store
#[derive(Debug, Clone)]
pub struct PointValidator {
    min_coordinate: f64,
    max_coordinate: f64,
}

impl Default for PointValidator {
    fn default() -> Self {
        Self {
            min_coordinate: 0.0,
            max_coordinate: MAP_EXTENT,
        }
    }
}

impl PointValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict coordinates to a sub-range of the map, e.g. one wing of a building
    pub fn with_bounds(min_coordinate: f64, max_coordinate: f64) -> PositioningResult<Self> {
        let map = 0.0..=MAP_EXTENT;
        if !(map.contains(&min_coordinate) && map.contains(&max_coordinate) && min_coordinate <= max_coordinate) {
            return Err(PositioningError::validation(
                "bounds",
                format!("[{}, {}] is not a range within [0, {}]", min_coordinate, max_coordinate, MAP_EXTENT),
            ));
        }
        Ok(Self {
            min_coordinate,
            max_coordinate,
        })
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min_coordinate, self.max_coordinate)
    }

    /// Validate a point, returning the first violation found
    pub fn validate_point(&self, point: &ReferencePoint) -> PositioningResult<()> {
        if point.id.trim().is_empty() {
            return Err(PositioningError::validation("id", "must not be empty"));
        }
        if point.name.trim().is_empty() {
            return Err(PositioningError::validation("name", "must not be empty"));
        }
        self.validate_coordinate("x", point.x)?;
        self.validate_coordinate("y", point.y)?;

        for reading in point.fingerprint.iter() {
            self.validate_reading(reading)?;
        }
        Ok(())
    }

    pub fn validate_reading(&self, reading: &WifiReading) -> PositioningResult<()> {
        if reading.bssid.trim().is_empty() {
            return Err(PositioningError::validation("bssid", "must not be empty"));
        }
        if !(MIN_SIGNAL_LEVEL..=MAX_SIGNAL_LEVEL).contains(&reading.level) {
            return Err(PositioningError::validation(
                "level",
                format!(
                    "{} dBm for '{}' is outside [{}, {}]",
                    reading.level, reading.bssid, MIN_SIGNAL_LEVEL, MAX_SIGNAL_LEVEL
                ),
            ));
        }
        Ok(())
    }

    fn validate_coordinate(&self, field: &str, value: f64) -> PositioningResult<()> {
        // NaN fails the range check
        if !(self.min_coordinate..=self.max_coordinate).contains(&value) {
            return Err(PositioningError::validation(
                field,
                format!(
                    "{} is outside [{}, {}]",
                    value, self.min_coordinate, self.max_coordinate
                ),
            ));
        }
        Ok(())
    }
}
