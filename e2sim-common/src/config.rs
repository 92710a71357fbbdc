//! Configuration structures for the E2 node
//!
//! The node is configured from YAML. Identity fields are kept as digit
//! strings so that a two-digit MNC such as "01" is not confused with "001".

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::LogLevel;
use crate::types::GlobalE2NodeId;

/// SCTP port of the RIC E2 termination.
pub const DEFAULT_E2_PORT: u16 = 36421;

/// RAN function ID the RC service model registers under by default.
pub const DEFAULT_RC_RAN_FUNCTION_ID: u16 = 1;

/// RIC (E2 termination) endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RicConfig {
    /// Address or host name of the E2 termination
    pub address: String,
    /// SCTP port of the E2 termination
    #[serde(default = "default_e2_port")]
    pub port: u16,
}

impl RicConfig {
    /// Creates a new RIC endpoint configuration.
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl Default for RicConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_E2_PORT)
    }
}

fn default_e2_port() -> u16 {
    DEFAULT_E2_PORT
}

/// One RAN function the node advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RanFunctionConfig {
    /// RAN function ID (0..4095)
    pub id: u16,
    /// RAN function revision (0..4095)
    #[serde(default = "default_revision")]
    pub revision: u16,
}

fn default_revision() -> u16 {
    1
}

/// Timing of the E2 setup handshake and the receive loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Number of E2 SETUP REQUEST attempts before giving up
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Wait between attempts, in milliseconds
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Socket receive timeout, in milliseconds
    #[serde(default = "default_recv_timeout_ms")]
    pub recv_timeout_ms: u64,
    /// Per-address connect timeout, in seconds
    #[serde(default = "default_connect_timeout_s")]
    pub connect_timeout_s: u64,
}

fn default_retries() -> u32 {
    3
}

fn default_retry_interval_ms() -> u64 {
    10_000
}

fn default_recv_timeout_ms() -> u64 {
    2_000
}

fn default_connect_timeout_s() -> u64 {
    10
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            retry_interval_ms: default_retry_interval_ms(),
            recv_timeout_ms: default_recv_timeout_ms(),
            connect_timeout_s: default_connect_timeout_s(),
        }
    }
}

/// E2 node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct E2NodeConfig {
    /// Mobile Country Code (3 digits)
    pub mcc: String,
    /// Mobile Network Code (2 or 3 digits)
    pub mnc: String,
    /// gNB ID (29 bits)
    pub gnb_id: u32,
    /// Cell number inside the gNB (7 bits)
    #[serde(default = "default_cell_id")]
    pub cell_id: u8,
    /// Local address to bind before connecting, if any
    #[serde(default)]
    pub local_address: Option<IpAddr>,
    /// RIC endpoint
    #[serde(default)]
    pub ric: RicConfig,
    /// Advertised RAN functions
    #[serde(default = "default_ran_functions")]
    pub ran_functions: Vec<RanFunctionConfig>,
    /// Setup handshake timing
    #[serde(default)]
    pub setup: SetupConfig,
    /// Initial transmit reference level, in dB
    #[serde(default)]
    pub tx_gain: f64,
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_cell_id() -> u8 {
    1
}

fn default_ran_functions() -> Vec<RanFunctionConfig> {
    vec![RanFunctionConfig {
        id: DEFAULT_RC_RAN_FUNCTION_ID,
        revision: default_revision(),
    }]
}

impl Default for E2NodeConfig {
    fn default() -> Self {
        Self {
            mcc: "001".to_string(),
            mnc: "01".to_string(),
            gnb_id: 1,
            cell_id: default_cell_id(),
            local_address: None,
            ric: RicConfig::default(),
            ran_functions: default_ran_functions(),
            setup: SetupConfig::default(),
            tx_gain: 0.0,
            log_level: LogLevel::default(),
        }
    }
}

impl E2NodeConfig {
    /// Builds the node identity from the configured PLMN and gNB ID.
    pub fn global_e2node_id(&self) -> Result<GlobalE2NodeId> {
        GlobalE2NodeId::new(&self.mcc, &self.mnc, self.gnb_id)
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Serializes the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }
}
