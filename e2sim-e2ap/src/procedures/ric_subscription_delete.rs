//! RIC Subscription Delete Procedure
//!
//! O-RAN E2AP Section 8.2.2.

use thiserror::Error;

use super::{checked, describe};
use crate::codec::CodecError;
use crate::ies::*;
use crate::messages::{
    RicSubscriptionDeleteFailure, RicSubscriptionDeleteRequest, RicSubscriptionDeleteResponse,
};
use crate::pdu::{decode_e2ap_pdu, E2apPdu, InitiatingMessage, SuccessfulOutcome, UnsuccessfulOutcome};

/// Errors that can occur during RIC Subscription Delete procedures
#[derive(Debug, Error)]
pub enum RicSubscriptionDeleteError {
    #[error("Codec error: {0}")]
    CodecError(#[from] CodecError),

    #[error("Invalid message type: expected {expected}, got {actual}")]
    InvalidMessageType { expected: String, actual: String },
}

/// Build a RIC Subscription Delete Request (RIC side)
pub fn build_ric_subscription_delete_request(
    ric_request_id: RicRequestId,
    ran_function_id: RanFunctionId,
) -> E2apPdu {
    checked(E2apPdu::InitiatingMessage(InitiatingMessage::RicSubscriptionDelete(
        RicSubscriptionDeleteRequest {
            ric_request_id,
            ran_function_id,
        },
    )))
}

/// Build a RIC Subscription Delete Response
pub fn build_ric_subscription_delete_response(
    ric_request_id: RicRequestId,
    ran_function_id: RanFunctionId,
) -> E2apPdu {
    checked(E2apPdu::SuccessfulOutcome(SuccessfulOutcome::RicSubscriptionDelete(
        RicSubscriptionDeleteResponse {
            ric_request_id,
            ran_function_id,
        },
    )))
}

/// Build a RIC Subscription Delete Failure
pub fn build_ric_subscription_delete_failure(
    ric_request_id: RicRequestId,
    ran_function_id: RanFunctionId,
    cause: Cause,
    criticality_diagnostics: Option<CriticalityDiagnostics>,
) -> E2apPdu {
    checked(E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicSubscriptionDelete(
        RicSubscriptionDeleteFailure {
            ric_request_id,
            ran_function_id,
            cause,
            criticality_diagnostics,
        },
    )))
}

/// Extract the RIC Subscription Delete Request from a PDU
pub fn parse_ric_subscription_delete_request(
    pdu: &E2apPdu,
) -> Result<RicSubscriptionDeleteRequest, RicSubscriptionDeleteError> {
    match pdu {
        E2apPdu::InitiatingMessage(InitiatingMessage::RicSubscriptionDelete(request)) => Ok(*request),
        other => Err(RicSubscriptionDeleteError::InvalidMessageType {
            expected: "RICsubscriptionDeleteRequest".to_string(),
            actual: describe(other),
        }),
    }
}

/// Extract the RIC Subscription Delete Failure from a PDU
pub fn parse_ric_subscription_delete_failure(
    pdu: &E2apPdu,
) -> Result<RicSubscriptionDeleteFailure, RicSubscriptionDeleteError> {
    match pdu {
        E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicSubscriptionDelete(failure)) => {
            Ok(failure.clone())
        }
        other => Err(RicSubscriptionDeleteError::InvalidMessageType {
            expected: "RICsubscriptionDeleteFailure".to_string(),
            actual: describe(other),
        }),
    }
}

/// Decode and parse a RIC Subscription Delete Request
pub fn decode_ric_subscription_delete_request(
    bytes: &[u8],
) -> Result<RicSubscriptionDeleteRequest, RicSubscriptionDeleteError> {
    parse_ric_subscription_delete_request(&decode_e2ap_pdu(bytes)?)
}

/// Check if a PDU is a RIC Subscription Delete Response
pub fn is_ric_subscription_delete_response(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::SuccessfulOutcome(SuccessfulOutcome::RicSubscriptionDelete(_)))
}

/// Check if a PDU is a RIC Subscription Delete Failure
pub fn is_ric_subscription_delete_failure(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicSubscriptionDelete(_)))
}
