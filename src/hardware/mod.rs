//! Platform collaborator interfaces
//!
//! The core never triggers scans or reads map files itself. The platform's
//! wireless subsystem and map UI plug in through these traits.

pub mod scanner;
pub mod mock;

pub use scanner::{MapContextProvider, ScanSource, StaticMapContext};
pub use mock::MockScanSource;
