//! Wi-Fi Fingerprint Indoor Positioning
//!
//! Estimates a device's location on a building map by comparing the access
//! points it currently observes against previously recorded reference point
//! fingerprints, using weighted k-nearest-neighbor matching in signal space.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod store;
pub mod utils;
pub mod hardware;
pub mod api;

// Re-export commonly used types
pub use crate::core::{CurrentPosition, Fingerprint, MapContext, ReferencePoint, WifiReading, MAP_EXTENT};
pub use algorithms::{ConfidenceLevel, PositionEstimator};
pub use processing::ScanAggregator;
pub use validation::{PointValidator, PositioningError, PositioningResult, RecoveryAction};
pub use store::{FingerprintStore, Snapshot};
pub use utils::{ConfigError, ConfigurationManager, EstimatorConfig, SystemConfig};
pub use hardware::{MapContextProvider, MockScanSource, ScanSource, StaticMapContext};
pub use api::{Exporter, FixFormatter, OutputFormat, PositionFix, PositioningSession};
