//! Position estimation algorithms

pub mod confidence;
pub mod knn;

pub use confidence::ConfidenceLevel;
pub use knn::{Candidate, PositionEstimator};
