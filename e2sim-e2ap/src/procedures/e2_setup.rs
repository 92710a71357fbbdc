//! E2 Setup Procedure
//!
//! Implements the E2 Setup procedure (O-RAN E2AP Section 8.3.1). The E2 node
//! initiates it right after the SCTP association comes up, advertising its
//! identity, its RAN functions and its NG interface component.

use e2sim_common::{GlobalE2NodeId, GnbId, Plmn, GNB_ID_BITS};
use thiserror::Error;

use super::{checked, describe};
use crate::codec::CodecError;
use crate::ies::*;
use crate::messages::{E2SetupFailure, E2SetupRequest, E2SetupResponse};
use crate::pdu::{
    decode_e2ap_pdu, encode_e2ap_pdu, E2apPdu, InitiatingMessage, SuccessfulOutcome,
    UnsuccessfulOutcome,
};

/// AMF name advertised in the NG component configuration item
pub const NG_COMPONENT_AMF_NAME: &str = "nginterf";

/// Errors that can occur during E2 Setup procedures
#[derive(Debug, Error)]
pub enum E2SetupError {
    /// Codec error during encoding/decoding
    #[error("Codec error: {0}")]
    CodecError(#[from] CodecError),

    /// Invalid message type received
    #[error("Invalid message type: expected {expected}, got {actual}")]
    InvalidMessageType { expected: String, actual: String },

    /// Invalid IE value
    #[error("Invalid IE value: {0}")]
    InvalidIeValue(String),
}

/// Parameters for building an E2 Setup Request
#[derive(Debug, Clone)]
pub struct E2SetupRequestParams {
    pub transaction_id: u8,
    /// Node identity; copied into the request
    pub global_e2node_id: GlobalE2NodeId,
    /// Advertised RAN functions
    pub ran_functions: Vec<RanFunctionItem>,
}

/// Parsed E2 Setup Response data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2SetupResponseData {
    pub transaction_id: u8,
    pub global_ric_id: GlobalRicId,
    pub accepted: Vec<RanFunctionIdItem>,
    pub rejected: Vec<RanFunctionIdCauseItem>,
}

/// Parsed E2 Setup Failure data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2SetupFailureData {
    pub transaction_id: u8,
    pub cause: Cause,
    pub time_to_wait: Option<TimeToWait>,
}

/// Wire form of the node identity: 29-bit gNB ID bit string.
pub fn global_e2node_id_ie(id: &GlobalE2NodeId) -> GlobalE2NodeIdIe {
    GlobalE2NodeIdIe::gnb(id.plmn().encode(), id.gnb_id().value(), GNB_ID_BITS as u8)
}

/// Recovers the node identity from its wire form.
pub fn parse_global_e2node_id(ie: &GlobalE2NodeIdIe) -> Result<GlobalE2NodeId, E2SetupError> {
    let GlobalE2NodeIdIe::Gnb(gnb) = ie;
    let bits = gnb.global_gnb_id.gnb_id;
    if u32::from(bits.length) != GNB_ID_BITS {
        return Err(E2SetupError::InvalidIeValue(format!(
            "gNB ID is {} bits, expected {}",
            bits.length, GNB_ID_BITS
        )));
    }
    let gnb_id = GnbId::new(bits.value).map_err(|e| E2SetupError::InvalidIeValue(e.to_string()))?;
    Ok(GlobalE2NodeId::from_parts(
        Plmn::decode(gnb.global_gnb_id.plmn),
        gnb_id,
    ))
}

/// The fixed NG interface component every setup request carries
fn ng_component_config_item() -> E2NodeComponentConfigAdditionItem {
    E2NodeComponentConfigAdditionItem {
        interface_type: E2NodeComponentInterfaceType::Ng,
        component_id: E2NodeComponentId::Ng {
            amf_name: NG_COMPONENT_AMF_NAME.to_string(),
        },
        configuration: E2NodeComponentConfiguration {
            request_part: b"ngapsetuprequest".to_vec(),
            response_part: b"ngapsetupresponse".to_vec(),
        },
    }
}

/// Build an E2 Setup Request PDU
pub fn build_e2_setup_request(params: &E2SetupRequestParams) -> E2apPdu {
    let request = E2SetupRequest {
        transaction_id: params.transaction_id,
        global_e2node_id: global_e2node_id_ie(&params.global_e2node_id),
        ran_functions_added: params.ran_functions.clone(),
        component_config_addition: vec![ng_component_config_item()],
    };
    checked(E2apPdu::InitiatingMessage(InitiatingMessage::E2Setup(request)))
}

/// Build and encode an E2 Setup Request
pub fn encode_e2_setup_request(params: &E2SetupRequestParams) -> Result<Vec<u8>, E2SetupError> {
    Ok(encode_e2ap_pdu(&build_e2_setup_request(params))?)
}

/// Build an E2 Setup Response accepting the given RAN functions (RIC side)
pub fn build_e2_setup_response(
    request: &E2SetupRequest,
    global_ric_id: GlobalRicId,
) -> E2apPdu {
    let accepted = request
        .ran_functions_added
        .iter()
        .map(|f| RanFunctionIdItem {
            ran_function_id: f.ran_function_id,
            revision: f.revision,
        })
        .collect();
    let acks = request
        .component_config_addition
        .iter()
        .map(|item| E2NodeComponentConfigAdditionAckItem {
            interface_type: item.interface_type,
            component_id: item.component_id.clone(),
            ack: E2NodeComponentConfigurationAck {
                outcome: UpdateOutcome::Success,
                failure_cause: None,
            },
        })
        .collect();
    checked(E2apPdu::SuccessfulOutcome(SuccessfulOutcome::E2Setup(
        E2SetupResponse {
            transaction_id: request.transaction_id,
            global_ric_id,
            ran_functions_accepted: accepted,
            ran_functions_rejected: Vec::new(),
            component_config_addition_ack: acks,
        },
    )))
}

/// Build an E2 Setup Failure (RIC side)
pub fn build_e2_setup_failure(
    transaction_id: u8,
    cause: Cause,
    time_to_wait: Option<TimeToWait>,
) -> E2apPdu {
    checked(E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::E2Setup(
        E2SetupFailure {
            transaction_id,
            cause,
            time_to_wait,
            criticality_diagnostics: None,
        },
    )))
}

/// Extract the E2 Setup Request from a PDU
pub fn parse_e2_setup_request(pdu: &E2apPdu) -> Result<E2SetupRequest, E2SetupError> {
    match pdu {
        E2apPdu::InitiatingMessage(InitiatingMessage::E2Setup(request)) => Ok(request.clone()),
        other => Err(E2SetupError::InvalidMessageType {
            expected: "E2setupRequest".to_string(),
            actual: describe(other),
        }),
    }
}

/// Parse an E2 Setup Response
pub fn parse_e2_setup_response(pdu: &E2apPdu) -> Result<E2SetupResponseData, E2SetupError> {
    match pdu {
        E2apPdu::SuccessfulOutcome(SuccessfulOutcome::E2Setup(response)) => {
            Ok(E2SetupResponseData {
                transaction_id: response.transaction_id,
                global_ric_id: response.global_ric_id,
                accepted: response.ran_functions_accepted.clone(),
                rejected: response.ran_functions_rejected.clone(),
            })
        }
        other => Err(E2SetupError::InvalidMessageType {
            expected: "E2setupResponse".to_string(),
            actual: describe(other),
        }),
    }
}

/// Parse an E2 Setup Failure
pub fn parse_e2_setup_failure(pdu: &E2apPdu) -> Result<E2SetupFailureData, E2SetupError> {
    match pdu {
        E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::E2Setup(failure)) => {
            Ok(E2SetupFailureData {
                transaction_id: failure.transaction_id,
                cause: failure.cause,
                time_to_wait: failure.time_to_wait,
            })
        }
        other => Err(E2SetupError::InvalidMessageType {
            expected: "E2setupFailure".to_string(),
            actual: describe(other),
        }),
    }
}

/// Decode and parse an E2 Setup Response
pub fn decode_e2_setup_response(bytes: &[u8]) -> Result<E2SetupResponseData, E2SetupError> {
    parse_e2_setup_response(&decode_e2ap_pdu(bytes)?)
}

/// Check if a PDU is an E2 Setup Response
pub fn is_e2_setup_response(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::SuccessfulOutcome(SuccessfulOutcome::E2Setup(_)))
}

/// Check if a PDU is an E2 Setup Failure
pub fn is_e2_setup_failure(pdu: &E2apPdu) -> bool {
    matches!(pdu, E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::E2Setup(_)))
}
