//! O1 management state
//!
//! The node exposes two pieces of O1 state: the transmit reference level
//! (gain) and the E2 termination handover request. Request and response
//! bodies are JSON:
//!
//! ```text
//! POST tx-gain   {"gain": 3.5}                                        -> 204
//! GET  tx-gain                                                        -> {"gain": 3.5}
//! POST handover  {"e2term": {"from": {"addr": "..", "port": 36421},
//!                            "to":   {"addr": "..", "port": 36422}}}  -> 204
//! ```

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::lock;

/// O1 request errors
#[derive(Debug, Error)]
pub enum O1Error {
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Transmit reference level, guarded by its own lock
#[derive(Debug, Default)]
pub struct TxReferenceLevel {
    gain: Mutex<f64>,
}

impl TxReferenceLevel {
    pub fn new(gain: f64) -> Self {
        Self {
            gain: Mutex::new(gain),
        }
    }

    pub fn gain(&self) -> f64 {
        *lock(&self.gain)
    }

    pub fn set_gain(&self, gain: f64) {
        *lock(&self.gain) = gain;
        info!("Tx reference level set to {} dB", gain);
    }
}

/// Body of the tx-gain resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TxGainBody {
    pub gain: f64,
}

/// E2 termination endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub addr: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.addr.contains(':') {
            write!(f, "[{}]:{}", self.addr, self.port)
        } else {
            write!(f, "{}:{}", self.addr, self.port)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct E2TermHandover {
    pub from: Endpoint,
    pub to: Endpoint,
}

/// Body of the handover resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRequest {
    pub e2term: E2TermHandover,
}

/// Applies a tx-gain POST body.
pub fn apply_tx_gain(level: &TxReferenceLevel, body: &str) -> Result<(), O1Error> {
    let request: TxGainBody = serde_json::from_str(body)?;
    if !request.gain.is_finite() {
        return Err(O1Error::InvalidValue(format!("gain {} is not finite", request.gain)));
    }
    level.set_gain(request.gain);
    Ok(())
}

/// Renders the tx-gain GET body.
pub fn render_tx_gain(level: &TxReferenceLevel) -> Result<String, O1Error> {
    Ok(serde_json::to_string(&TxGainBody { gain: level.gain() })?)
}

/// Parses a handover POST body.
pub fn parse_handover_request(body: &str) -> Result<HandoverRequest, O1Error> {
    let request: HandoverRequest = serde_json::from_str(body)?;
    for endpoint in [&request.e2term.from, &request.e2term.to] {
        if endpoint.addr.is_empty() || endpoint.port == 0 {
            return Err(O1Error::InvalidValue(format!("invalid E2 termination {endpoint}")));
        }
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_roundtrip_through_json() {
        let level = TxReferenceLevel::new(0.0);
        apply_tx_gain(&level, r#"{"gain": 3.5}"#).unwrap();
        assert_eq!(level.gain(), 3.5);
        assert_eq!(render_tx_gain(&level).unwrap(), r#"{"gain":3.5}"#);
    }

    #[test]
    fn test_gain_malformed_body() {
        let level = TxReferenceLevel::new(1.0);
        assert!(matches!(
            apply_tx_gain(&level, r#"{"gain": "high"}"#),
            Err(O1Error::MalformedBody(_))
        ));
        assert_eq!(level.gain(), 1.0);
    }

    #[test]
    fn test_parse_handover_request() {
        let body = r#"{"e2term": {"from": {"addr": "10.0.2.10", "port": 36421},
                                  "to": {"addr": "10.0.2.11", "port": 36422}}}"#;
        let request = parse_handover_request(body).unwrap();
        assert_eq!(request.e2term.from, Endpoint::new("10.0.2.10", 36421));
        assert_eq!(request.e2term.to.to_string(), "10.0.2.11:36422");
    }

    #[test]
    fn test_parse_handover_request_port_zero() {
        let body = r#"{"e2term": {"from": {"addr": "10.0.2.10", "port": 36421},
                                  "to": {"addr": "10.0.2.11", "port": 0}}}"#;
        assert!(matches!(parse_handover_request(body), Err(O1Error::InvalidValue(_))));
    }

    #[test]
    fn test_endpoint_display_v6() {
        assert_eq!(Endpoint::new("2001:db8::1", 36421).to_string(), "[2001:db8::1]:36421");
    }
}
