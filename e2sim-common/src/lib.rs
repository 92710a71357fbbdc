//! Common types and utilities for e2sim
//!
//! Shared identity types, configuration structures, errors and logging
//! helpers used across the e2sim crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{E2NodeConfig, RanFunctionConfig, RicConfig, SetupConfig, DEFAULT_E2_PORT};
pub use error::{Error, Result};
pub use logging::{
    format_hex_compact, init_logging, log_e2ap_message, log_e2sm_message, log_protocol_message,
    Direction, HexDump, LogLevel,
};
pub use types::*;
