//! Fingerprint storage

pub mod fingerprint_store;

pub use fingerprint_store::{FingerprintStore, Snapshot};
