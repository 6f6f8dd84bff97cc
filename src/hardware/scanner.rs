//! Scan source and map context traits

use crate::core::{MapContext, WifiReading};
use crate::validation::PositioningResult;

/// Supplies already-materialized live scans.
///
/// Implementations wrap the platform's wireless subsystem. Scheduling and
/// timeouts are their concern, not the core's.
pub trait ScanSource {
    /// Return the most recent complete scan
    fn acquire_live_scan(&mut self) -> PositioningResult<Vec<WifiReading>>;

    /// Human-readable name for logs
    fn name(&self) -> &str {
        "scan-source"
    }
}

/// Reports which map the caller is currently viewing
pub trait MapContextProvider {
    fn current_map_context(&self) -> Option<MapContext>;
}

/// Fixed map context, for callers that position on a single map
#[derive(Debug, Clone)]
pub struct StaticMapContext(pub MapContext);

impl MapContextProvider for StaticMapContext {
    fn current_map_context(&self) -> Option<MapContext> {
        Some(self.0.clone())
    }
}
