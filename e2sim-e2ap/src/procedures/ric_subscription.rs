//! RIC Subscription Procedure
//!
//! O-RAN E2AP Section 8.2.1. The RIC asks the node to start reporting (or
//! inserting/policy) actions under an event trigger; the node answers with
//! the admitted and not-admitted action lists, or a failure.

use thiserror::Error;

use super::{checked, describe};
use crate::codec::CodecError;
use crate::ies::*;
use crate::messages::{
    RicSubscriptionDetails, RicSubscriptionFailure, RicSubscriptionRequest,
    RicSubscriptionResponse,
};
use crate::pdu::{decode_e2ap_pdu, E2apPdu, InitiatingMessage, SuccessfulOutcome, UnsuccessfulOutcome};

/// Errors that can occur during RIC Subscription procedures
#[derive(Debug, Error)]
pub enum RicSubscriptionError {
    /// Codec error during encoding/decoding
    #[error("Codec error: {0}")]
    CodecError(#[from] CodecError),

    /// Invalid message type received
    #[error("Invalid message type: expected {expected}, got {actual}")]
    InvalidMessageType { expected: String, actual: String },
}

/// Build a RIC Subscription Request (RIC side)
pub fn build_ric_subscription_request(
    ric_request_id: RicRequestId,
    ran_function_id: RanFunctionId,
    event_trigger_definition: Vec<u8>,
    actions: Vec<RicActionToBeSetupItem>,
) -> E2apPdu {
    checked(E2apPdu::InitiatingMessage(InitiatingMessage::RicSubscription(
        RicSubscriptionRequest {
            ric_request_id,
            ran_function_id,
            subscription_details: RicSubscriptionDetails {
                event_trigger_definition,
                actions,
            },
        },
    )))
}

/// Build a RIC Subscription Response listing admitted and not-admitted actions
pub fn build_ric_subscription_response(
    ric_request_id: RicRequestId,
    ran_function_id: RanFunctionId,
    admitted: &[RicActionId],
    not_admitted: &[RicActionNotAdmittedItem],
) -> E2apPdu {
    checked(E2apPdu::SuccessfulOutcome(SuccessfulOutcome::RicSubscription(
        RicSubscriptionResponse {
            ric_request_id,
            ran_function_id,
            actions_admitted: admitted.to_vec(),
            actions_not_admitted: not_admitted.to_vec(),
        },
    )))
}

/// Build a RIC Subscription Failure
pub fn build_ric_subscription_failure(
    ric_request_id: RicRequestId,
    ran_function_id: RanFunctionId,
    cause: Cause,
    criticality_diagnostics: Option<CriticalityDiagnostics>,
) -> E2apPdu {
    checked(E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicSubscription(
        RicSubscriptionFailure {
            ric_request_id,
            ran_function_id,
            cause,
            criticality_diagnostics,
        },
    )))
}

/// Extract the RIC Subscription Request from a PDU
pub fn parse_ric_subscription_request(
    pdu: &E2apPdu,
) -> Result<RicSubscriptionRequest, RicSubscriptionError> {
    match pdu {
        E2apPdu::InitiatingMessage(InitiatingMessage::RicSubscription(request)) => {
            Ok(request.clone())
        }
        other => Err(RicSubscriptionError::InvalidMessageType {
            expected: "RICsubscriptionRequest".to_string(),
            actual: describe(other),
        }),
    }
}

/// Extract the RIC Subscription Response from a PDU
pub fn parse_ric_subscription_response(
    pdu: &E2apPdu,
) -> Result<RicSubscriptionResponse, RicSubscriptionError> {
    match pdu {
        E2apPdu::SuccessfulOutcome(SuccessfulOutcome::RicSubscription(response)) => {
            Ok(response.clone())
        }
        other => Err(RicSubscriptionError::InvalidMessageType {
            expected: "RICsubscriptionResponse".to_string(),
            actual: describe(other),
        }),
    }
}

/// Extract the RIC Subscription Failure from a PDU
pub fn parse_ric_subscription_failure(
    pdu: &E2apPdu,
) -> Result<RicSubscriptionFailure, RicSubscriptionError> {
    match pdu {
        E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicSubscription(failure)) => {
            Ok(failure.clone())
        }
        other => Err(RicSubscriptionError::InvalidMessageType {
            expected: "RICsubscriptionFailure".to_string(),
            actual: describe(other),
        }),
    }
}

/// Decode and parse a RIC Subscription Request
pub fn decode_ric_subscription_request(
    bytes: &[u8],
) -> Result<RicSubscriptionRequest, RicSubscriptionError> {
    parse_ric_subscription_request(&decode_e2ap_pdu(bytes)?)
}

/// Check if a PDU is a RIC Subscription Response
pub fn is_ric_subscription_response(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::SuccessfulOutcome(SuccessfulOutcome::RicSubscription(_)))
}

/// Check if a PDU is a RIC Subscription Failure
pub fn is_ric_subscription_failure(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicSubscription(_)))
}
