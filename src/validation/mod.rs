//! Data validation and error classification

pub mod data;
pub mod error;

pub use data::PointValidator;
pub use error::{PositioningError, PositioningResult, RecoveryAction};
