use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the positioning core
pub type PositioningResult<T> = Result<T, PositioningError>;

/// Error classification for the positioning core.
///
/// None of these are fatal to the process; every variant is reported to the
/// caller, which decides whether to surface it or retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositioningError {
    /// Out-of-range coordinates or missing required fields. Raised before any mutation.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// An operation that requires an existing point did not find it
    #[error("reference point '{id}' not found")]
    NotFound { id: String },

    #[error("live scan contains no access points")]
    EmptyScan,

    #[error("no reference points available for estimation")]
    NoReferenceData,

    /// The live environment shares no access point with any stored fingerprint
    #[error("live scan shares no access point with any of {reference_points} reference points")]
    NoMatch { reference_points: usize },

    /// Malformed interchange payload. Import aborts with no partial state.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// The platform scan collaborator failed to deliver a scan
    #[error("scan source error: {message}")]
    ScanSource { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

/// What a caller can do to recover from an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryAction {
    /// Correct the rejected input and retry
    FixInput,
    /// Record additional reference points in the current area
    RecordCalibrationData,
    /// Acquire a fresh live scan
    Rescan,
    /// Refresh the caller's view of the store
    RefreshSnapshot,
    /// Retry the operation once the underlying resource is available
    Retry,
}

impl PositioningError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PositioningError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        PositioningError::Serialization {
            message: message.into(),
        }
    }

    /// Whether the caller can reasonably expect a retry or new input to succeed
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PositioningError::Serialization { .. } | PositioningError::Io { .. })
    }

    /// Suggested recovery for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            PositioningError::Validation { .. } => RecoveryAction::FixInput,
            PositioningError::NotFound { .. } => RecoveryAction::RefreshSnapshot,
            PositioningError::EmptyScan => RecoveryAction::Rescan,
            PositioningError::NoReferenceData => RecoveryAction::RecordCalibrationData,
            PositioningError::NoMatch { .. } => RecoveryAction::RecordCalibrationData,
            PositioningError::Serialization { .. } => RecoveryAction::FixInput,
            PositioningError::ScanSource { .. } => RecoveryAction::Rescan,
            PositioningError::Io { .. } => RecoveryAction::Retry,
        }
    }
}

impl From<serde_json::Error> for PositioningError {
    fn from(error: serde_json::Error) -> Self {
        PositioningError::serialization(error.to_string())
    }
}

impl From<std::io::Error> for PositioningError {
    fn from(error: std::io::Error) -> Self {
        PositioningError::Io {
            message: error.to_string(),
        }
    }
}
