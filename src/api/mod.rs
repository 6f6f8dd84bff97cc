//! Public positioning API
//!
//! - [`export`]: JSON interchange for backup and restore
//! - [`session`]: injected composition of store, estimator and collaborators
//! - [`formatting`]: text, JSON and CSV rendering of position fixes

pub mod export;
pub mod formatting;
pub mod session;

pub use export::Exporter;
pub use formatting::{FixFormatter, FormattedFix, OutputFormat};
pub use session::{PositionFix, PositioningSession};
