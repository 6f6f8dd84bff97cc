//! Scan processing

pub mod aggregation;

pub use aggregation::ScanAggregator;
