//! Calibration scan aggregation
//!
//! A calibration walk records several scans while standing at one location.
//! The aggregator folds them into a single fingerprint: each access point's
//! level is the mean of its observations, while ssid and frequency come from
//! the most recent scan that saw it.

use crate::core::{Fingerprint, ReferencePoint, WifiReading};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct AccessPointSamples {
    latest: WifiReading,
    level_sum: i64,
    observations: u32,
}

/// Accumulates calibration scans into one fingerprint
#[derive(Debug, Clone)]
pub struct ScanAggregator {
    samples: BTreeMap<String, AccessPointSamples>,
    scan_count: u32,
    /// Access points seen in fewer scans than this are dropped
    min_observations: u32,
}

impl Default for ScanAggregator {
    fn default() -> Self {
        Self {
            samples: BTreeMap::new(),
            scan_count: 0,
            min_observations: 1,
        }
    }
}

impl ScanAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_observations(min_observations: u32) -> Self {
        Self {
            min_observations: min_observations.max(1),
            ..Self::default()
        }
    }

    /// Add one scan. Duplicate bssids inside a single scan count once, last wins.
    pub fn add_scan(&mut self, scan: &[WifiReading]) {
        let deduplicated: Fingerprint = scan.iter().cloned().collect();

        for reading in deduplicated {
            match self.samples.get_mut(&reading.bssid) {
                Some(entry) => {
                    entry.level_sum += i64::from(reading.level);
                    entry.observations += 1;
                    entry.latest = reading;
                }
                None => {
                    self.samples.insert(
                        reading.bssid.clone(),
                        AccessPointSamples {
                            level_sum: i64::from(reading.level),
                            observations: 1,
                            latest: reading,
                        },
                    );
                }
            }
        }
        self.scan_count += 1;
    }

    pub fn scan_count(&self) -> u32 {
        self.scan_count
    }

    pub fn is_empty(&self) -> bool {
        self.scan_count == 0
    }

    /// Produce the aggregated fingerprint
    pub fn finish(&self) -> Fingerprint {
        self.samples
            .values()
            .filter(|s| s.observations >= self.min_observations)
            .map(|s| {
                let mean = (s.level_sum as f64 / f64::from(s.observations)).round() as i32;
                WifiReading {
                    level: mean,
                    ..s.latest.clone()
                }
            })
            .collect()
    }
}

impl ReferencePoint {
    /// Build a reference point from a finished calibration walk
    pub fn from_calibration(
        id: impl Into<String>,
        name: impl Into<String>,
        x: f64,
        y: f64,
        aggregator: &ScanAggregator,
    ) -> Self {
        ReferencePoint::new(id, name, x, y, aggregator.finish())
    }
}
