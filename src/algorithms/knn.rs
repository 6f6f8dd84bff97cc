//! Weighted k-nearest-neighbor estimation in signal space
//!
//! Each reference point is scored by a signal-weighted RMS difference over the
//! access points it shares with the live scan:
//!
//! ```text
//! d²       = Σ w(scan[b]) · (scan[b] − point[b])²    for b in common
//! w(level) = 10^(level / 10)
//! distance = sqrt(d² / |common|)
//! ```
//!
//! Points with no shared access point carry no information and are dropped,
//! as are points whose distance is not finite.
//! The `k` closest survivors are combined with inverse-distance weights.
//! The estimator is pure: it owns only its configuration and may be shared
//! freely across threads.

use crate::algorithms::confidence;
use crate::core::{CurrentPosition, Fingerprint, ReferencePoint, WifiReading, MAP_EXTENT, MAX_SIGNAL_LEVEL, MIN_SIGNAL_LEVEL};
use crate::utils::config::EstimatorConfig;
use crate::validation::{PositioningError, PositioningResult};
use log::{debug, trace};
use nalgebra::{Point2, Vector2};

/// A reference point that shares at least one access point with the scan
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub point: &'a ReferencePoint,
    /// Signal-space distance to the live scan
    pub distance: f64,
    /// Number of access points shared with the live scan
    pub common_aps: usize,
}

/// Linear weight of a signal level in dBm. Stronger signals weigh more.
pub fn signal_weight(level: i32) -> f64 {
    10f64.powf(f64::from(level) / 10.0)
}

/// Signal-space distance between a scan and a fingerprint.
///
/// Returns `None` when they share no access point, otherwise
/// `(distance, shared_count)`.
pub fn signal_distance(scan: &Fingerprint, fingerprint: &Fingerprint) -> Option<(f64, usize)> {
    let mut sum = 0.0;
    let mut common = 0usize;

    for observed in scan.iter() {
        if let Some(recorded) = fingerprint.get(&observed.bssid) {
            let diff = f64::from(observed.level) - f64::from(recorded.level);
            sum += signal_weight(observed.level) * diff * diff;
            common += 1;
        }
    }

    if common == 0 {
        None
    } else {
        Some(((sum / common as f64).sqrt(), common))
    }
}

/// Stateless fingerprint position estimator
#[derive(Debug, Clone, Default)]
pub struct PositionEstimator {
    config: EstimatorConfig,
}

impl PositionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate using the configured default `k`
    pub fn estimate_default(
        &self,
        live_scan: &[WifiReading],
        reference: &[ReferencePoint],
    ) -> PositioningResult<CurrentPosition> {
        self.estimate(live_scan, reference, self.config.k)
    }

    /// Estimate the device position from a live scan and a reference snapshot.
    ///
    /// Duplicate bssids in `live_scan` collapse, the later reading wins.
    pub fn estimate(
        &self,
        live_scan: &[WifiReading],
        reference: &[ReferencePoint],
        k: usize,
    ) -> PositioningResult<CurrentPosition> {
        if k == 0 {
            return Err(PositioningError::validation("k", "must be at least 1"));
        }
        if live_scan.is_empty() {
            return Err(PositioningError::EmptyScan);
        }
        if let Some(reading) = live_scan
            .iter()
            .find(|r| !(MIN_SIGNAL_LEVEL..=MAX_SIGNAL_LEVEL).contains(&r.level))
        {
            return Err(PositioningError::validation(
                "level",
                format!("scan reports {} dBm for '{}'", reading.level, reading.bssid),
            ));
        }
        if reference.is_empty() {
            return Err(PositioningError::NoReferenceData);
        }

        let scan: Fingerprint = live_scan.iter().cloned().collect();
        let candidates = self.rank(&scan, reference);
        if candidates.is_empty() {
            debug!(
                "no reference point shares an access point with the {}-AP scan",
                scan.len()
            );
            return Err(PositioningError::NoMatch {
                reference_points: reference.len(),
            });
        }

        let neighbors = &candidates[..k.min(candidates.len())];
        let position = self.aggregate(neighbors);

        debug!(
            "estimated ({:.2}, {:.2}) accuracy {:.3} from {} of {} candidates",
            position.x,
            position.y,
            position.accuracy,
            neighbors.len(),
            candidates.len()
        );
        Ok(position)
    }

    /// Score and order every reference point sharing an access point with the scan.
    ///
    /// Ascending distance; ties go to the lower id.
    pub fn rank<'a>(&self, scan: &Fingerprint, reference: &'a [ReferencePoint]) -> Vec<Candidate<'a>> {
        let mut candidates: Vec<Candidate<'a>> = reference
            .iter()
            .filter_map(|point| {
                signal_distance(scan, &point.fingerprint)
                    .filter(|(distance, _)| distance.is_finite())
                    .map(|(distance, common_aps)| Candidate {
                        point,
                        distance,
                        common_aps,
                    })
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.point.id.cmp(&b.point.id))
        });

        for candidate in &candidates {
            trace!(
                "candidate '{}' distance {:.6e} over {} shared APs",
                candidate.point.id,
                candidate.distance,
                candidate.common_aps
            );
        }
        candidates
    }

    /// Inverse-distance-weighted centroid plus confidence for a non-empty neighbor set
    fn aggregate(&self, neighbors: &[Candidate<'_>]) -> CurrentPosition {
        let mut weighted_sum = Vector2::<f64>::zeros();
        let mut weight_total = 0.0;
        let mut coordinates = Vec::with_capacity(neighbors.len());
        let mut common_counts = Vec::with_capacity(neighbors.len());

        for neighbor in neighbors {
            let coordinate = Point2::new(neighbor.point.x, neighbor.point.y);
            let weight = 1.0 / (neighbor.distance + self.config.epsilon);

            weighted_sum += coordinate.coords * weight;
            weight_total += weight;
            coordinates.push(coordinate);
            common_counts.push(neighbor.common_aps);
        }

        let centroid = weighted_sum / weight_total;
        let accuracy = confidence::score(&coordinates, &common_counts, &self.config);

        // A convex combination stays in range up to rounding
        CurrentPosition {
            x: centroid.x.clamp(0.0, MAP_EXTENT),
            y: centroid.y.clamp(0.0, MAP_EXTENT),
            accuracy,
            neighbor_ids: neighbors.iter().map(|n| n.point.id.clone()).collect(),
        }
    }
}
