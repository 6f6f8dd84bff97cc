//! Algorithm constants and system parameters

/// Extent of the normalized map coordinate space (percent)
pub const MAP_EXTENT: f64 = 100.0;

/// Default neighbor count for k-NN estimation
pub const DEFAULT_K: usize = 3;

/// Added to signal distances before inversion so an exact match stays finite
pub const DISTANCE_EPSILON: f64 = 1e-12;

/// Confidence reported when only one neighbor contributes to an estimate
pub const SINGLE_NEIGHBOR_CONFIDENCE: f64 = 0.6;

/// Shared access point count at which the common-AP penalty vanishes
pub const FULL_CONFIDENCE_COMMON_APS: usize = 5;

/// Weakest signal level accepted, in dBm
pub const MIN_SIGNAL_LEVEL: i32 = -150;

/// Strongest signal level accepted, in dBm
pub const MAX_SIGNAL_LEVEL: i32 = 0;

/// Share of geographic spread in the combined confidence penalty
pub const SPREAD_WEIGHT: f64 = 0.7;
