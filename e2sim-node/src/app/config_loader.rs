//! Configuration Loading for the E2 Node
//!
//! Wraps [`E2NodeConfig`] from `e2sim-common` with the validation the node
//! needs before it can build its identity and reach the RIC.
//!
//! # Example
//!
//! ```rust,ignore
//! use e2sim_node::app::{load_e2node_config, validate_e2node_config};
//!
//! let config = load_e2node_config("config/e2sim.yaml")?;
//! validate_e2node_config(&config)?;
//! ```

use std::collections::HashSet;
use std::path::Path;

use e2sim_common::config::E2NodeConfig;
use e2sim_common::{Plmn, CELL_ID_BITS, GNB_ID_LIMIT};
use e2sim_e2ap::ies::{MAX_RAN_FUNCTION_ID, MAX_RAN_FUNCTION_REVISION};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Invalid PLMN
    #[error("Invalid PLMN: {0}")]
    InvalidPlmn(String),

    /// gNB ID does not fit in 29 bits
    #[error("Invalid gNB ID: {0}")]
    InvalidGnbId(String),

    /// Cell ID does not fit in 7 bits
    #[error("Invalid cell ID: {0}")]
    InvalidCellId(String),

    /// Invalid RIC endpoint
    #[error("Invalid RIC configuration: {0}")]
    InvalidRicConfig(String),

    /// No RAN function configured
    #[error("No RAN function configured: at least one RAN function must be specified")]
    NoRanFunction,

    /// Invalid RAN function entry
    #[error("Invalid RAN function: {0}")]
    InvalidRanFunction(String),

    /// Invalid setup timing
    #[error("Invalid setup configuration: {0}")]
    InvalidSetupConfig(String),
}

/// Loads an E2 node configuration from a YAML file.
///
/// This function reads and parses the file only. Call
/// [`validate_e2node_config`] afterwards, or use
/// [`load_and_validate_e2node_config`].
///
/// # Arguments
///
/// * `path` - Path to the YAML configuration file
///
/// # Returns
///
/// * `Ok(E2NodeConfig)` - Successfully loaded and parsed configuration
/// * `Err(ConfigError)` - Loading or parsing failed
pub fn load_e2node_config<P: AsRef<Path>>(path: P) -> Result<E2NodeConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    load_e2node_config_from_str(&contents)
}

/// Loads an E2 node configuration from a YAML string.
pub fn load_e2node_config_from_str(yaml: &str) -> Result<E2NodeConfig, ConfigError> {
    let config: E2NodeConfig =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    Ok(config)
}

/// Validates an E2 node configuration.
///
/// # Validation Rules
///
/// - MCC must be 3 digits, MNC 2 or 3 digits
/// - gNB ID must fit in 29 bits and the cell ID in 7 bits
/// - The RIC address must be set and the port non-zero
/// - At least one RAN function, with IDs and revisions in 0..=4095 and no
///   duplicate IDs
/// - Setup retries, intervals and timeouts must be non-zero
pub fn validate_e2node_config(config: &E2NodeConfig) -> Result<(), ConfigValidationError> {
    Plmn::from_digits(&config.mcc, &config.mnc)
        .map_err(|e| ConfigValidationError::InvalidPlmn(e.to_string()))?;

    if config.gnb_id >= GNB_ID_LIMIT {
        return Err(ConfigValidationError::InvalidGnbId(format!(
            "gNB ID {} exceeds the 29-bit maximum ({})",
            config.gnb_id,
            GNB_ID_LIMIT - 1
        )));
    }

    if u32::from(config.cell_id) >= 1 << CELL_ID_BITS {
        return Err(ConfigValidationError::InvalidCellId(format!(
            "cell ID {} exceeds the 7-bit maximum",
            config.cell_id
        )));
    }

    if config.ric.address.trim().is_empty() {
        return Err(ConfigValidationError::InvalidRicConfig(
            "RIC address cannot be empty".to_string(),
        ));
    }
    if config.ric.port == 0 {
        return Err(ConfigValidationError::InvalidRicConfig(
            "RIC port cannot be 0".to_string(),
        ));
    }

    validate_ran_functions(config)?;

    let setup = &config.setup;
    if setup.retries == 0 {
        return Err(ConfigValidationError::InvalidSetupConfig(
            "at least one setup attempt is required".to_string(),
        ));
    }
    if setup.retry_interval_ms == 0 || setup.recv_timeout_ms == 0 || setup.connect_timeout_s == 0 {
        return Err(ConfigValidationError::InvalidSetupConfig(
            "retry interval, receive timeout and connect timeout must be non-zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_ran_functions(config: &E2NodeConfig) -> Result<(), ConfigValidationError> {
    if config.ran_functions.is_empty() {
        return Err(ConfigValidationError::NoRanFunction);
    }

    let mut seen = HashSet::new();
    for function in &config.ran_functions {
        if function.id > MAX_RAN_FUNCTION_ID {
            return Err(ConfigValidationError::InvalidRanFunction(format!(
                "ID {} exceeds {}",
                function.id, MAX_RAN_FUNCTION_ID
            )));
        }
        if function.revision > MAX_RAN_FUNCTION_REVISION {
            return Err(ConfigValidationError::InvalidRanFunction(format!(
                "revision {} of function {} exceeds {}",
                function.revision, function.id, MAX_RAN_FUNCTION_REVISION
            )));
        }
        if !seen.insert(function.id) {
            return Err(ConfigValidationError::InvalidRanFunction(format!(
                "ID {} configured twice",
                function.id
            )));
        }
    }
    Ok(())
}

/// Loads and validates an E2 node configuration in one step.
pub fn load_and_validate_e2node_config<P: AsRef<Path>>(
    path: P,
) -> Result<E2NodeConfig, ConfigError> {
    let config = load_e2node_config(path)?;
    validate_e2node_config(&config)?;
    Ok(config)
}
