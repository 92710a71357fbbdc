//! RIC Indication Procedure
//!
//! O-RAN E2AP Section 8.2.3. Sent by the node for every report produced by a
//! running subscription action.

use thiserror::Error;

use super::{checked, describe};
use crate::codec::CodecError;
use crate::ies::*;
use crate::messages::RicIndication;
use crate::pdu::{decode_e2ap_pdu, encode_e2ap_pdu, E2apPdu, InitiatingMessage};

/// Errors that can occur during RIC Indication procedures
#[derive(Debug, Error)]
pub enum RicIndicationError {
    #[error("Codec error: {0}")]
    CodecError(#[from] CodecError),

    #[error("Invalid message type: expected {expected}, got {actual}")]
    InvalidMessageType { expected: String, actual: String },
}

/// Parameters for building a RIC Indication
#[derive(Debug, Clone)]
pub struct RicIndicationParams {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub action_id: RicActionId,
    pub sequence_number: Option<u16>,
    pub indication_type: RicIndicationType,
    /// Encoded service-model indication header
    pub header: Vec<u8>,
    /// Encoded service-model indication message
    pub message: Vec<u8>,
    pub call_process_id: Option<Vec<u8>>,
}

/// Build a RIC Indication PDU
pub fn build_ric_indication(params: RicIndicationParams) -> E2apPdu {
    checked(E2apPdu::InitiatingMessage(InitiatingMessage::RicIndication(
        RicIndication {
            ric_request_id: params.ric_request_id,
            ran_function_id: params.ran_function_id,
            action_id: params.action_id,
            sequence_number: params.sequence_number,
            indication_type: params.indication_type,
            header: params.header,
            message: params.message,
            call_process_id: params.call_process_id,
        },
    )))
}

/// Build and encode a RIC Indication
pub fn encode_ric_indication(params: RicIndicationParams) -> Result<Vec<u8>, RicIndicationError> {
    Ok(encode_e2ap_pdu(&build_ric_indication(params))?)
}

/// Extract the RIC Indication from a PDU
pub fn parse_ric_indication(pdu: &E2apPdu) -> Result<RicIndication, RicIndicationError> {
    match pdu {
        E2apPdu::InitiatingMessage(InitiatingMessage::RicIndication(indication)) => {
            Ok(indication.clone())
        }
        other => Err(RicIndicationError::InvalidMessageType {
            expected: "RICindication".to_string(),
            actual: describe(other),
        }),
    }
}

/// Decode and parse a RIC Indication
pub fn decode_ric_indication(bytes: &[u8]) -> Result<RicIndication, RicIndicationError> {
    parse_ric_indication(&decode_e2ap_pdu(bytes)?)
}

/// Check if a PDU is a RIC Indication
pub fn is_ric_indication(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::InitiatingMessage(InitiatingMessage::RicIndication(_)))
}
