//! Confidence scoring for k-NN estimates
//!
//! Two signals feed the score: how tightly the neighbor set agrees on a
//! location, and how many access points each neighbor shares with the live
//! scan. A single neighbor cannot show agreement, so it gets a fixed value.

use crate::core::MAP_EXTENT;
use crate::utils::config::EstimatorConfig;
use nalgebra::{distance, Point2};
use serde::{Deserialize, Serialize};

/// Qualitative confidence band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// accuracy >= 0.8
    High,
    /// accuracy >= 0.5
    Medium,
    /// accuracy >= 0.2
    Low,
    Unreliable,
}

impl ConfidenceLevel {
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 0.8 {
            ConfidenceLevel::High
        } else if accuracy >= 0.5 {
            ConfidenceLevel::Medium
        } else if accuracy >= 0.2 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::Unreliable
        }
    }
}

/// Largest pairwise distance among the coordinates, as a fraction of the map extent (capped at 1)
pub fn geographic_spread(coordinates: &[Point2<f64>]) -> f64 {
    let mut max_distance: f64 = 0.0;
    for (i, a) in coordinates.iter().enumerate() {
        for b in &coordinates[i + 1..] {
            max_distance = max_distance.max(distance(a, b));
        }
    }
    (max_distance / MAP_EXTENT).min(1.0)
}

/// Mean shortfall of shared access points relative to `full_confidence_aps`
pub fn common_ap_penalty(common_counts: &[usize], full_confidence_aps: usize) -> f64 {
    if common_counts.is_empty() || full_confidence_aps == 0 {
        return 0.0;
    }
    let total: f64 = common_counts
        .iter()
        .map(|&count| (1.0 - count as f64 / full_confidence_aps as f64).max(0.0))
        .sum();
    total / common_counts.len() as f64
}

/// Score a neighbor set given its coordinates and shared-AP counts
pub fn score(coordinates: &[Point2<f64>], common_counts: &[usize], config: &EstimatorConfig) -> f64 {
    if coordinates.len() <= 1 {
        return config.single_neighbor_confidence.clamp(0.0, 1.0);
    }

    let spread = geographic_spread(coordinates);
    let penalty = common_ap_penalty(common_counts, config.full_confidence_common_aps);
    let normalized_spread = config.spread_weight * spread + (1.0 - config.spread_weight) * penalty;

    (1.0 - normalized_spread).clamp(0.0, 1.0)
}
