//! Mock scan source for testing and development

use crate::core::WifiReading;
use crate::hardware::ScanSource;
use crate::validation::{PositioningError, PositioningResult};
use std::collections::VecDeque;

/// Replays queued scans. When the queue runs dry the last scan repeats.
#[derive(Debug, Default)]
pub struct MockScanSource {
    queue: VecDeque<Vec<WifiReading>>,
    last_scan: Option<Vec<WifiReading>>,
    connected: bool,
    scans_delivered: u32,
}

impl MockScanSource {
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Create a source that always returns `scan`
    pub fn with_scan(scan: Vec<WifiReading>) -> Self {
        let mut source = Self::new();
        source.push_scan(scan);
        source
    }

    pub fn push_scan(&mut self, scan: Vec<WifiReading>) {
        self.queue.push_back(scan);
    }

    /// Simulate the wireless subsystem becoming unavailable
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn reconnect(&mut self) {
        self.connected = true;
    }

    pub fn scans_delivered(&self) -> u32 {
        self.scans_delivered
    }
}

impl ScanSource for MockScanSource {
    fn acquire_live_scan(&mut self) -> PositioningResult<Vec<WifiReading>> {
        if !self.connected {
            return Err(PositioningError::ScanSource {
                message: "mock scanner disconnected".to_string(),
            });
        }

        if let Some(scan) = self.queue.pop_front() {
            self.last_scan = Some(scan);
        }
        self.scans_delivered += 1;
        Ok(self.last_scan.clone().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_queue_then_repeats_last() {
        let mut source = MockScanSource::new();
        source.push_scan(vec![WifiReading::new("a", "", -50, 2412)]);
        source.push_scan(vec![WifiReading::new("b", "", -60, 2412)]);

        assert_eq!(source.acquire_live_scan().unwrap()[0].bssid, "a");
        assert_eq!(source.acquire_live_scan().unwrap()[0].bssid, "b");
        assert_eq!(source.acquire_live_scan().unwrap()[0].bssid, "b");
        assert_eq!(source.scans_delivered(), 3);
    }

    #[test]
    fn test_empty_source_returns_empty_scan() {
        let mut source = MockScanSource::new();
        assert!(source.acquire_live_scan().unwrap().is_empty());
    }

    #[test]
    fn test_disconnect() {
        let mut source = MockScanSource::with_scan(vec![WifiReading::new("a", "", -50, 2412)]);
        source.disconnect();
        assert!(matches!(
            source.acquire_live_scan(),
            Err(PositioningError::ScanSource { .. })
        ));

        source.reconnect();
        assert_eq!(source.acquire_live_scan().unwrap().len(), 1);
    }
}
