//! Positioning session
//!
//! Composes an injected store, an estimator and the platform collaborators.
//! Whoever constructs the session owns the store's lifecycle; several sessions
//! may share one store through `Arc`.

use crate::algorithms::{ConfidenceLevel, PositionEstimator};
use crate::core::{CurrentPosition, MapContext, ReferencePoint};
use crate::hardware::{MapContextProvider, ScanSource};
use crate::processing::ScanAggregator;
use crate::store::FingerprintStore;
use crate::utils::config::EstimatorConfig;
use crate::validation::{PositioningError, PositioningResult};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;

/// A position estimate tagged for display
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    pub position: CurrentPosition,
    pub confidence: ConfidenceLevel,
    pub map: Option<MapContext>,
    pub timestamp: DateTime<Utc>,
    /// Reference points in the snapshot the fix was computed from
    pub reference_count: usize,
}

pub struct PositioningSession {
    store: Arc<FingerprintStore>,
    estimator: PositionEstimator,
    scan_source: Box<dyn ScanSource>,
    map_provider: Option<Box<dyn MapContextProvider>>,
    fixes_computed: u32,
}

impl PositioningSession {
    pub fn new(store: Arc<FingerprintStore>, scan_source: Box<dyn ScanSource>) -> Self {
        Self::with_config(store, scan_source, EstimatorConfig::default())
    }

    pub fn with_config(store: Arc<FingerprintStore>, scan_source: Box<dyn ScanSource>, config: EstimatorConfig) -> Self {
        Self {
            store,
            estimator: PositionEstimator::with_config(config),
            scan_source,
            map_provider: None,
            fixes_computed: 0,
        }
    }

    pub fn with_map_provider(mut self, provider: Box<dyn MapContextProvider>) -> Self {
        self.map_provider = Some(provider);
        self
    }

    pub fn store(&self) -> &Arc<FingerprintStore> {
        &self.store
    }

    pub fn estimator(&self) -> &PositionEstimator {
        &self.estimator
    }

    pub fn fixes_computed(&self) -> u32 {
        self.fixes_computed
    }

    /// Acquire a scan and estimate with the configured `k`
    pub fn locate(&mut self) -> PositioningResult<PositionFix> {
        let k = self.estimator.config().k;
        self.locate_with_k(k)
    }

    pub fn locate_with_k(&mut self, k: usize) -> PositioningResult<PositionFix> {
        let scan = self.scan_source.acquire_live_scan()?;
        let snapshot = self.store.list_points();

        let position = self.estimator.estimate(&scan, &snapshot, k).map_err(|e| {
            warn!("estimation failed ({}): {}", self.scan_source.name(), e);
            e
        })?;
        self.fixes_computed += 1;

        Ok(PositionFix {
            confidence: ConfidenceLevel::from_accuracy(position.accuracy),
            position,
            map: self.map_provider.as_ref().and_then(|p| p.current_map_context()),
            timestamp: Utc::now(),
            reference_count: snapshot.len(),
        })
    }

    /// Record a calibration walk: aggregate `scan_count` scans and store the point
    pub fn record_reference_point(
        &mut self,
        id: &str,
        name: &str,
        x: f64,
        y: f64,
        scan_count: u32,
    ) -> PositioningResult<ReferencePoint> {
        if scan_count == 0 {
            return Err(PositioningError::validation("scan_count", "at least one scan is required"));
        }

        let mut aggregator = ScanAggregator::new();
        for _ in 0..scan_count {
            let scan = self.scan_source.acquire_live_scan()?;
            aggregator.add_scan(&scan);
        }

        let point = ReferencePoint::from_calibration(id, name, x, y, &aggregator);
        if point.fingerprint.is_empty() {
            warn!("reference point '{}' recorded with no access points", id);
        }
        self.store.upsert_point(point.clone())?;

        info!(
            "recorded reference point '{}' at ({:.1}, {:.1}) from {} scans, {} APs",
            id,
            x,
            y,
            scan_count,
            point.fingerprint.len()
        );
        Ok(point)
    }
}
