//! RIC Control Procedure
//!
//! O-RAN E2AP Section 8.2.4.

use thiserror::Error;

use super::{checked, describe};
use crate::codec::CodecError;
use crate::ies::*;
use crate::messages::{RicControlAcknowledge, RicControlFailure, RicControlRequest};
use crate::pdu::{decode_e2ap_pdu, E2apPdu, InitiatingMessage, SuccessfulOutcome, UnsuccessfulOutcome};

/// Errors that can occur during RIC Control procedures
#[derive(Debug, Error)]
pub enum RicControlError {
    #[error("Codec error: {0}")]
    CodecError(#[from] CodecError),

    #[error("Invalid message type: expected {expected}, got {actual}")]
    InvalidMessageType { expected: String, actual: String },
}

/// Build a RIC Control Request (RIC side)
pub fn build_ric_control_request(
    ric_request_id: RicRequestId,
    ran_function_id: RanFunctionId,
    header: Vec<u8>,
    message: Vec<u8>,
    ack_request: Option<RicControlAckRequest>,
) -> E2apPdu {
    checked(E2apPdu::InitiatingMessage(InitiatingMessage::RicControl(
        RicControlRequest {
            ric_request_id,
            ran_function_id,
            call_process_id: None,
            header,
            message,
            ack_request,
        },
    )))
}

/// Build a RIC Control Acknowledge
pub fn build_ric_control_acknowledge(
    ric_request_id: RicRequestId,
    ran_function_id: RanFunctionId,
    call_process_id: Option<Vec<u8>>,
    outcome: Option<Vec<u8>>,
) -> E2apPdu {
    checked(E2apPdu::SuccessfulOutcome(SuccessfulOutcome::RicControl(
        RicControlAcknowledge {
            ric_request_id,
            ran_function_id,
            call_process_id,
            outcome,
        },
    )))
}

/// Build a RIC Control Failure
pub fn build_ric_control_failure(
    ric_request_id: RicRequestId,
    ran_function_id: RanFunctionId,
    call_process_id: Option<Vec<u8>>,
    cause: Cause,
    outcome: Option<Vec<u8>>,
) -> E2apPdu {
    checked(E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicControl(
        RicControlFailure {
            ric_request_id,
            ran_function_id,
            call_process_id,
            cause,
            outcome,
        },
    )))
}

/// Extract the RIC Control Request from a PDU
pub fn parse_ric_control_request(pdu: &E2apPdu) -> Result<RicControlRequest, RicControlError> {
    match pdu {
        E2apPdu::InitiatingMessage(InitiatingMessage::RicControl(request)) => Ok(request.clone()),
        other => Err(RicControlError::InvalidMessageType {
            expected: "RICcontrolRequest".to_string(),
            actual: describe(other),
        }),
    }
}

/// Extract the RIC Control Failure from a PDU
pub fn parse_ric_control_failure(pdu: &E2apPdu) -> Result<RicControlFailure, RicControlError> {
    match pdu {
        E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicControl(failure)) => Ok(failure.clone()),
        other => Err(RicControlError::InvalidMessageType {
            expected: "RICcontrolFailure".to_string(),
            actual: describe(other),
        }),
    }
}

/// Decode and parse a RIC Control Request
pub fn decode_ric_control_request(bytes: &[u8]) -> Result<RicControlRequest, RicControlError> {
    parse_ric_control_request(&decode_e2ap_pdu(bytes)?)
}

/// Whether the requester wants an acknowledge on success.
///
/// An absent ack request counts as `ack`.
pub fn wants_control_ack(request: &RicControlRequest) -> bool {
    matches!(request.ack_request, None | Some(RicControlAckRequest::Ack))
}

/// Check if a PDU is a RIC Control Acknowledge
pub fn is_ric_control_acknowledge(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::SuccessfulOutcome(SuccessfulOutcome::RicControl(_)))
}

/// Check if a PDU is a RIC Control Failure
pub fn is_ric_control_failure(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::RicControl(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::encode_e2ap_pdu;

    #[test]
    fn test_control_request_roundtrip() {
        let pdu = build_ric_control_request(
            RicRequestId::new(10, 1),
            1,
            vec![0x01, 0x02],
            vec![0x03],
            Some(RicControlAckRequest::NoAck),
        );
        let request = decode_ric_control_request(&encode_e2ap_pdu(&pdu).unwrap()).unwrap();
        assert_eq!(request.header, vec![0x01, 0x02]);
        assert_eq!(request.message, vec![0x03]);
        assert!(!wants_control_ack(&request));
    }

    #[test]
    fn test_wants_ack_when_absent() {
        let request = RicControlRequest {
            ric_request_id: RicRequestId::new(1, 1),
            ran_function_id: 1,
            call_process_id: None,
            header: vec![],
            message: vec![],
            ack_request: None,
        };
        assert!(wants_control_ack(&request));
    }

    #[test]
    fn test_control_failure_roundtrip() {
        let pdu = build_ric_control_failure(
            RicRequestId::new(10, 1),
            1,
            Some(vec![0xCA]),
            Cause::RicRequest(CauseRicRequest::ControlMessageInvalid),
            None,
        );
        let decoded = decode_e2ap_pdu(&encode_e2ap_pdu(&pdu).unwrap()).unwrap();
        assert!(is_ric_control_failure(&decoded));
        let failure = parse_ric_control_failure(&decoded).unwrap();
        assert_eq!(failure.call_process_id, Some(vec![0xCA]));
        assert_eq!(failure.cause, Cause::RicRequest(CauseRicRequest::ControlMessageInvalid));
    }

    #[test]
    fn test_control_acknowledge() {
        let pdu = build_ric_control_acknowledge(RicRequestId::new(10, 1), 1, None, None);
        let decoded = decode_e2ap_pdu(&encode_e2ap_pdu(&pdu).unwrap()).unwrap();
        assert!(is_ric_control_acknowledge(&decoded));
    }
}
