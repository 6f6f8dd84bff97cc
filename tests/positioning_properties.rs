//! Property tests for the store and estimator laws
//!
//! - Upsert is idempotent and round-trips field values
//! - Delete leaves no point and no orphaned readings behind
//! - Export then import reproduces the point set, whatever the timestamp precision
//! - Out-of-range coordinates are never stored
//! - Estimation is deterministic and lands inside the neighbors' bounding box

use fingerprint_positioning::{
    FingerprintStore, PositionEstimator, PositioningError, ReferencePoint, WifiReading,
};
use chrono::DateTime;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn reading_strategy() -> impl Strategy<Value = WifiReading> {
    ("[a-f]{1,2}", "[a-z]{0,6}", -100i32..=0, prop_oneof![Just(2412u32), Just(2437), Just(5180)])
        .prop_map(|(bssid, ssid, level, frequency)| WifiReading::new(bssid, ssid, level, frequency))
}

fn point_strategy() -> impl Strategy<Value = ReferencePoint> {
    (
        "p[0-9]{1,2}",
        "[A-Z][a-z]{1,8}",
        0.0f64..=100.0,
        0.0f64..=100.0,
        prop::collection::vec(reading_strategy(), 0..8),
    )
        .prop_map(|(id, name, x, y, readings)| {
            ReferencePoint::new(id, name, x, y, readings.into_iter().collect())
        })
}

fn unique_points(max: usize) -> impl Strategy<Value = Vec<ReferencePoint>> {
    prop::collection::vec(point_strategy(), 1..max).prop_map(|points| {
        let mut seen = BTreeSet::new();
        points.into_iter().filter(|p| seen.insert(p.id.clone())).collect()
    })
}

proptest! {
    #[test]
    fn upsert_then_list_contains_exactly_one(point in point_strategy()) {
        let store = FingerprintStore::new();
        store.upsert_point(point.clone()).unwrap();
        store.upsert_point(point.clone()).unwrap();

        let snapshot = store.list_points();
        let matching: Vec<&ReferencePoint> = snapshot.iter().filter(|p| p.id == point.id).collect();
        prop_assert_eq!(matching.len(), 1);
        prop_assert_eq!(matching[0], &point);
    }

    #[test]
    fn delete_leaves_no_orphans(points in unique_points(8), victim in 0usize..8) {
        let store = FingerprintStore::new();
        for point in &points {
            store.upsert_point(point.clone()).unwrap();
        }
        let victim = &points[victim % points.len()];
        let expected_readings = store.reading_count() - victim.fingerprint.len();

        store.delete_point(&victim.id);

        prop_assert!(store.list_points().iter().all(|p| p.id != victim.id));
        prop_assert_eq!(store.readings_for(&victim.id), 0);
        prop_assert_eq!(store.reading_count(), expected_readings);
    }

    #[test]
    fn export_import_round_trip(points in unique_points(10)) {
        let source = FingerprintStore::new();
        for point in &points {
            source.upsert_point(point.clone()).unwrap();
        }

        let data = source.export_snapshot().unwrap();
        let target = FingerprintStore::new();
        target.import_snapshot(&data).unwrap();

        prop_assert_eq!(target.list_points(), source.list_points());
    }

    #[test]
    fn export_import_round_trip_with_nanosecond_timestamps(
        points in unique_points(6),
        stamps in prop::collection::vec((-2_000_000_000i64..4_000_000_000, 0u32..1_000_000_000), 6),
        via_builder in any::<bool>(),
    ) {
        let source = FingerprintStore::new();
        for (point, &(secs, nanos)) in points.iter().zip(&stamps) {
            let timestamp = DateTime::from_timestamp(secs, nanos).unwrap();
            let point = if via_builder {
                point.clone().with_timestamp(timestamp)
            } else {
                let mut point = point.clone();
                point.timestamp = timestamp;
                point
            };
            source.upsert_point(point).unwrap();
        }

        let target = FingerprintStore::new();
        target.import_snapshot(&source.export_snapshot().unwrap()).unwrap();

        prop_assert_eq!(target.list_points(), source.list_points());
    }

    #[test]
    fn out_of_range_coordinates_rejected(
        point in point_strategy(),
        bad in prop_oneof![-1000.0f64..-0.0001, 100.0001f64..1000.0],
        on_x in any::<bool>(),
    ) {
        let mut point = point;
        if on_x { point.x = bad; } else { point.y = bad; }

        let store = FingerprintStore::new();
        let result = store.upsert_point(point.clone());

        let is_validation_error = matches!(result, Err(PositioningError::Validation { .. }));
        prop_assert!(is_validation_error);
        prop_assert!(!store.contains(&point.id));
        prop_assert_eq!(store.reading_count(), 0);
    }

    #[test]
    fn estimate_is_deterministic_and_bounded(
        points in unique_points(10),
        scan in prop::collection::vec(reading_strategy(), 1..8),
        k in 1usize..6,
    ) {
        let estimator = PositionEstimator::new();

        match estimator.estimate(&scan, &points, k) {
            Ok(position) => {
                prop_assert_eq!(estimator.estimate(&scan, &points, k).unwrap(), position.clone());
                prop_assert!((0.0..=1.0).contains(&position.accuracy));
                prop_assert!(position.neighbor_count() >= 1 && position.neighbor_count() <= k);

                let neighbors: Vec<&ReferencePoint> = position
                    .neighbor_ids
                    .iter()
                    .filter_map(|id| points.iter().find(|p| &p.id == id))
                    .collect();
                let min_x = neighbors.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
                let max_x = neighbors.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
                let min_y = neighbors.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
                let max_y = neighbors.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(position.x >= min_x - 1e-9 && position.x <= max_x + 1e-9);
                prop_assert!(position.y >= min_y - 1e-9 && position.y <= max_y + 1e-9);
            }
            Err(error) => {
                let is_no_match = matches!(error, PositioningError::NoMatch { .. });
                prop_assert!(is_no_match);
                prop_assert_eq!(estimator.estimate(&scan, &points, k).unwrap_err(), error);
            }
        }
    }
}
