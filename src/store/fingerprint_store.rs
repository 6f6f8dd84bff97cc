//! Reference point repository
//!
//! Points and their readings live in two tables, mirroring a relational
//! layout: a point table keyed by id and a readings table keyed by
//! `(point_id, bssid)`. Both tables sit behind one `Arc` that is replaced
//! copy-on-write under the write lock, so a reader that cloned the `Arc`
//! keeps a consistent view no matter what writers do afterwards.

use crate::api::export::Exporter;
use crate::core::types::truncate_to_millis;
use crate::core::{Fingerprint, ReferencePoint, WifiReading};
use crate::validation::{PointValidator, PositioningError, PositioningResult};
use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct PointRow {
    name: String,
    x: f64,
    y: f64,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    points: BTreeMap<String, PointRow>,
    readings: BTreeMap<(String, String), WifiReading>,
}

impl Tables {
    fn from_points(points: Vec<ReferencePoint>) -> Self {
        let mut tables = Tables::default();
        for point in points {
            tables.insert_point(point);
        }
        tables
    }

    fn insert_point(&mut self, point: ReferencePoint) {
        let ReferencePoint { id, name, x, y, timestamp, fingerprint } = point;
        for reading in fingerprint {
            self.readings.insert((id.clone(), reading.bssid.clone()), reading);
        }
        // Stored at interchange precision so export and import agree
        let timestamp = truncate_to_millis(timestamp);
        self.points.insert(id, PointRow { name, x, y, timestamp });
    }

    /// Remove a point row and every reading that references it
    fn remove_point(&mut self, id: &str) -> bool {
        let removed = self.points.remove(id).is_some();

        let orphaned: Vec<(String, String)> = self
            .readings
            .range((id.to_string(), String::new())..)
            .take_while(|((point_id, _), _)| point_id == id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in orphaned {
            self.readings.remove(&key);
        }

        removed
    }

    fn assemble(&self, id: &str, row: &PointRow) -> ReferencePoint {
        let fingerprint: Fingerprint = self
            .readings
            .range((id.to_string(), String::new())..)
            .take_while(|((point_id, _), _)| point_id == id)
            .map(|(_, reading)| reading.clone())
            .collect();

        ReferencePoint {
            id: id.to_string(),
            name: row.name.clone(),
            x: row.x,
            y: row.y,
            timestamp: row.timestamp,
            fingerprint,
        }
    }
}

/// Immutable point-in-time view of the store, ordered by ascending id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    points: Vec<ReferencePoint>,
}

impl Snapshot {
    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<ReferencePoint> {
        self.points
    }

    pub fn get(&self, id: &str) -> Option<&ReferencePoint> {
        self.points
            .binary_search_by(|p| p.id.as_str().cmp(id))
            .ok()
            .map(|index| &self.points[index])
    }
}

impl Deref for Snapshot {
    type Target = [ReferencePoint];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

/// Durable repository of reference points and their fingerprints.
///
/// Mutations are serialized per instance. Share it across threads with `Arc`.
#[derive(Debug, Default)]
pub struct FingerprintStore {
    tables: RwLock<Arc<Tables>>,
    validator: PointValidator,
}

impl FingerprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: PointValidator) -> Self {
        Self {
            tables: RwLock::new(Arc::new(Tables::default())),
            validator,
        }
    }

    pub fn validator(&self) -> &PointValidator {
        &self.validator
    }

    /// Insert or wholly replace a point and its fingerprint.
    ///
    /// The timestamp is kept at millisecond precision.
    pub fn upsert_point(&self, point: ReferencePoint) -> PositioningResult<()> {
        self.validator.validate_point(&point)?;

        let id = point.id.clone();
        let reading_count = point.fingerprint.len();

        let mut guard = self.tables.write();
        let tables = Arc::make_mut(&mut *guard);
        let replaced = tables.remove_point(&id);
        tables.insert_point(point);
        drop(guard);

        debug!(
            "{} reference point '{}' with {} readings",
            if replaced { "replaced" } else { "inserted" },
            id,
            reading_count
        );
        Ok(())
    }

    /// Delete a point and its readings. Deleting an unknown id is a no-op.
    pub fn delete_point(&self, id: &str) -> bool {
        let mut guard = self.tables.write();
        if !guard.points.contains_key(id) {
            return false;
        }
        let removed = Arc::make_mut(&mut *guard).remove_point(id);
        drop(guard);

        debug!("deleted reference point '{}'", id);
        removed
    }

    /// Take a consistent snapshot of every stored point
    pub fn list_points(&self) -> Snapshot {
        let tables = Arc::clone(&*self.tables.read());

        let points = tables
            .points
            .iter()
            .map(|(id, row)| tables.assemble(id, row))
            .collect();
        Snapshot { points }
    }

    pub fn get_point(&self, id: &str) -> PositioningResult<ReferencePoint> {
        let tables = Arc::clone(&*self.tables.read());
        tables
            .points
            .get(id)
            .map(|row| tables.assemble(id, row))
            .ok_or_else(|| PositioningError::NotFound { id: id.to_string() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tables.read().points.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tables.read().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().points.is_empty()
    }

    /// Total readings across all points
    pub fn reading_count(&self) -> usize {
        self.tables.read().readings.len()
    }

    /// Number of readings that reference the given id
    pub fn readings_for(&self, id: &str) -> usize {
        self.tables
            .read()
            .readings
            .keys()
            .filter(|(point_id, _)| point_id == id)
            .count()
    }

    pub fn clear(&self) {
        *self.tables.write() = Arc::new(Tables::default());
        info!("cleared fingerprint store");
    }

    /// Serialize the current contents to the compact interchange format
    pub fn export_snapshot(&self) -> PositioningResult<String> {
        self.export_with(&Exporter::new())
    }

    pub fn export_with(&self, exporter: &Exporter) -> PositioningResult<String> {
        let snapshot = self.list_points();
        exporter.export(&snapshot)
    }

    /// Replace the store contents with the points in `data`.
    ///
    /// Records are checked with the store's own validator. All-or-nothing:
    /// on any malformed record the store is left unchanged.
    pub fn import_snapshot(&self, data: &str) -> PositioningResult<usize> {
        let points = Exporter::new()
            .with_validator(self.validator.clone())
            .import(data)?;
        let count = points.len();
        let tables = Tables::from_points(points);

        *self.tables.write() = Arc::new(tables);
        info!("imported {} reference points", count);
        Ok(count)
    }
}
