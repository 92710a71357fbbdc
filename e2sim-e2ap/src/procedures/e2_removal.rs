//! E2 Removal Procedure
//!
//! O-RAN E2AP Section 8.3.6. The node asks the RIC to remove the E2
//! connection; the response ends the association.

use thiserror::Error;

use super::{checked, describe};
use crate::codec::CodecError;
use crate::ies::Cause;
use crate::messages::{E2RemovalFailure, E2RemovalRequest, E2RemovalResponse};
use crate::pdu::{encode_e2ap_pdu, E2apPdu, InitiatingMessage, SuccessfulOutcome, UnsuccessfulOutcome};

/// Errors that can occur during E2 Removal procedures
#[derive(Debug, Error)]
pub enum E2RemovalError {
    #[error("Codec error: {0}")]
    CodecError(#[from] CodecError),

    #[error("Invalid message type: expected {expected}, got {actual}")]
    InvalidMessageType { expected: String, actual: String },
}

/// Build an E2 Removal Request
pub fn build_e2_removal_request(transaction_id: u8) -> E2apPdu {
    checked(E2apPdu::InitiatingMessage(InitiatingMessage::E2Removal(
        E2RemovalRequest { transaction_id },
    )))
}

/// Build and encode an E2 Removal Request
pub fn encode_e2_removal_request(transaction_id: u8) -> Result<Vec<u8>, E2RemovalError> {
    Ok(encode_e2ap_pdu(&build_e2_removal_request(transaction_id))?)
}

/// Build an E2 Removal Response (RIC side)
pub fn build_e2_removal_response(transaction_id: u8) -> E2apPdu {
    checked(E2apPdu::SuccessfulOutcome(SuccessfulOutcome::E2Removal(
        E2RemovalResponse {
            transaction_id,
            criticality_diagnostics: None,
        },
    )))
}

/// Build an E2 Removal Failure (RIC side)
pub fn build_e2_removal_failure(transaction_id: u8, cause: Cause) -> E2apPdu {
    checked(E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::E2Removal(
        E2RemovalFailure {
            transaction_id,
            cause,
            criticality_diagnostics: None,
        },
    )))
}

/// Extract the E2 Removal Request from a PDU
pub fn parse_e2_removal_request(pdu: &E2apPdu) -> Result<E2RemovalRequest, E2RemovalError> {
    match pdu {
        E2apPdu::InitiatingMessage(InitiatingMessage::E2Removal(request)) => Ok(*request),
        other => Err(E2RemovalError::InvalidMessageType {
            expected: "E2RemovalRequest".to_string(),
            actual: describe(other),
        }),
    }
}

/// Check if a PDU is an E2 Removal Response
pub fn is_e2_removal_response(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::SuccessfulOutcome(SuccessfulOutcome::E2Removal(_)))
}
