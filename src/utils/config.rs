use crate::core::{
    DEFAULT_K, DISTANCE_EPSILON, FULL_CONFIDENCE_COMMON_APS, SINGLE_NEIGHBOR_CONFIDENCE, SPREAD_WEIGHT,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// System-wide configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Tunable constants of the k-NN estimator
    pub estimator: EstimatorConfig,
    /// Pretty print exported JSON
    pub pretty_export: bool,
    /// Enable debug logging in the command-line driver
    pub debug_logging: bool,
}

/// Estimator tuning. These are engineering choices, calibrate against real hardware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Neighbor count used when the caller does not pass one
    pub k: usize,
    /// Added to signal distances before inverse-distance weighting
    pub epsilon: f64,
    /// Confidence reported when a single neighbor contributes (0.0 to 1.0)
    pub single_neighbor_confidence: f64,
    /// Shared access point count at which the common-AP penalty vanishes
    pub full_confidence_common_aps: usize,
    /// Share of geographic spread in the confidence penalty (0.0 to 1.0)
    pub spread_weight: f64,
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },

    #[error("I/O error: {message}")]
    IoError { message: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Configuration validation result
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            pretty_export: true,
            debug_logging: false,
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            epsilon: DISTANCE_EPSILON,
            single_neighbor_confidence: SINGLE_NEIGHBOR_CONFIDENCE,
            full_confidence_common_aps: FULL_CONFIDENCE_COMMON_APS,
            spread_weight: SPREAD_WEIGHT,
        }
    }
}

impl EstimatorConfig {
    /// Validate estimator parameters
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.k == 0 {
            errors.push(invalid("estimator.k", self.k, "k must be at least 1"));
        } else if self.k > 20 {
            warnings.push("Large k averages over distant fingerprints and blurs the estimate".to_string());
        }

        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            errors.push(invalid("estimator.epsilon", self.epsilon, "epsilon must be a small positive number"));
        } else if self.epsilon > 1e-6 {
            warnings.push("Large epsilon lets near matches outweigh exact matches".to_string());
        }

        if !(0.0..=1.0).contains(&self.single_neighbor_confidence) {
            errors.push(invalid(
                "estimator.single_neighbor_confidence",
                self.single_neighbor_confidence,
                "confidence must be between 0.0 and 1.0",
            ));
        }

        if self.full_confidence_common_aps == 0 {
            errors.push(invalid(
                "estimator.full_confidence_common_aps",
                self.full_confidence_common_aps,
                "at least one shared access point is required",
            ));
        }

        if !(0.0..=1.0).contains(&self.spread_weight) {
            errors.push(invalid(
                "estimator.spread_weight",
                self.spread_weight,
                "weight must be between 0.0 and 1.0",
            ));
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Main configuration manager
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    system_config: SystemConfig,
    /// Configuration file path
    config_file_path: Option<String>,
    /// Whether configuration has been modified since the last load or save
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a new configuration manager with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn get_system_config(&self) -> &SystemConfig {
        &self.system_config
    }

    pub fn estimator_config(&self) -> &EstimatorConfig {
        &self.system_config.estimator
    }

    /// Replace the system configuration after validation
    pub fn update_system_config(&mut self, config: SystemConfig) -> Result<(), ConfigError> {
        Self::ensure_valid(&config)?;
        self.system_config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from JSON file. Missing fields take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: SystemConfig = serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to parse config file '{}': {}", path_str, e),
        })?;

        Self::ensure_valid(&config)?;

        info!("loaded configuration from '{}'", path_str);
        self.system_config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.system_config).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            }),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Update the default neighbor count, returning the previous value
    pub fn set_k(&mut self, k: usize) -> Result<usize, ConfigError> {
        if k == 0 {
            return Err(invalid("estimator.k", k, "k must be at least 1"));
        }
        let old_value = std::mem::replace(&mut self.system_config.estimator.k, k);
        self.is_modified = true;
        Ok(old_value)
    }

    /// Update the single-neighbor confidence, returning the previous value
    pub fn set_single_neighbor_confidence(&mut self, confidence: f64) -> Result<f64, ConfigError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(invalid(
                "estimator.single_neighbor_confidence",
                confidence,
                "confidence must be between 0.0 and 1.0",
            ));
        }
        let old_value = std::mem::replace(&mut self.system_config.estimator.single_neighbor_confidence, confidence);
        self.is_modified = true;
        Ok(old_value)
    }

    /// Validate a system configuration without applying it
    pub fn validate_system_config(config: &SystemConfig) -> ValidationResult {
        config.estimator.validate()
    }

    fn ensure_valid(config: &SystemConfig) -> Result<(), ConfigError> {
        let validation = Self::validate_system_config(config);
        for warning in &validation.warnings {
            warn!("configuration warning: {}", warning);
        }
        match validation.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
