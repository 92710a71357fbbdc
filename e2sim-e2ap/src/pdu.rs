//! E2AP-PDU
//!
//! `E2AP-PDU ::= CHOICE { initiatingMessage, successfulOutcome, unsuccessfulOutcome, ... }`
//! where each branch is `{ procedureCode, criticality, value }` and the value
//! is an open type selected by the procedure code.

use std::fmt;

use crate::codec::AsnType;
use crate::ies::Criticality;
use crate::messages::*;
use crate::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};

const PROCEDURE_CODE: Constraint = Constraint::new(0, 255);

/// E2AP procedure code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcedureCode(pub u8);

impl ProcedureCode {
    pub const E2_SETUP: Self = Self(1);
    pub const ERROR_INDICATION: Self = Self(2);
    pub const RESET: Self = Self(3);
    pub const RIC_CONTROL: Self = Self(4);
    pub const RIC_INDICATION: Self = Self(5);
    pub const RIC_SERVICE_QUERY: Self = Self(6);
    pub const RIC_SERVICE_UPDATE: Self = Self(7);
    pub const RIC_SUBSCRIPTION: Self = Self(8);
    pub const RIC_SUBSCRIPTION_DELETE: Self = Self(9);
    pub const E2_NODE_CONFIGURATION_UPDATE: Self = Self(10);
    pub const E2_CONNECTION_UPDATE: Self = Self(11);
    pub const RIC_SUBSCRIPTION_DELETE_REQUIRED: Self = Self(12);
    pub const E2_REMOVAL: Self = Self(13);

    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "E2setup",
            2 => "ErrorIndication",
            3 => "Reset",
            4 => "RICcontrol",
            5 => "RICindication",
            6 => "RICserviceQuery",
            7 => "RICserviceUpdate",
            8 => "RICsubscription",
            9 => "RICsubscriptionDelete",
            10 => "E2nodeConfigurationUpdate",
            11 => "E2connectionUpdate",
            12 => "RICsubscriptionDeleteRequired",
            13 => "E2removal",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ProcedureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

/// Top-level PDU branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Initiating,
    Successful,
    Unsuccessful,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutcomeKind::Initiating => "initiatingMessage",
            OutcomeKind::Successful => "successfulOutcome",
            OutcomeKind::Unsuccessful => "unsuccessfulOutcome",
        };
        f.write_str(name)
    }
}

/// Message of a procedure this crate does not model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueMessage {
    pub procedure_code: ProcedureCode,
    pub criticality: Criticality,
    /// Raw open-type value
    pub value: Vec<u8>,
}

/// initiatingMessage values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitiatingMessage {
    E2Setup(E2SetupRequest),
    RicSubscription(RicSubscriptionRequest),
    RicSubscriptionDelete(RicSubscriptionDeleteRequest),
    RicIndication(RicIndication),
    RicControl(RicControlRequest),
    E2Removal(E2RemovalRequest),
    ErrorIndication(ErrorIndication),
    Other(OpaqueMessage),
}

/// successfulOutcome values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessfulOutcome {
    E2Setup(E2SetupResponse),
    RicSubscription(RicSubscriptionResponse),
    RicSubscriptionDelete(RicSubscriptionDeleteResponse),
    RicControl(RicControlAcknowledge),
    E2Removal(E2RemovalResponse),
    Other(OpaqueMessage),
}

/// unsuccessfulOutcome values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsuccessfulOutcome {
    E2Setup(E2SetupFailure),
    RicSubscription(RicSubscriptionFailure),
    RicSubscriptionDelete(RicSubscriptionDeleteFailure),
    RicControl(RicControlFailure),
    E2Removal(E2RemovalFailure),
    Other(OpaqueMessage),
}

/// E2AP-PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum E2apPdu {
    InitiatingMessage(InitiatingMessage),
    SuccessfulOutcome(SuccessfulOutcome),
    UnsuccessfulOutcome(UnsuccessfulOutcome),
}

impl E2apPdu {
    pub fn outcome(&self) -> OutcomeKind {
        match self {
            E2apPdu::InitiatingMessage(_) => OutcomeKind::Initiating,
            E2apPdu::SuccessfulOutcome(_) => OutcomeKind::Successful,
            E2apPdu::UnsuccessfulOutcome(_) => OutcomeKind::Unsuccessful,
        }
    }

    pub fn procedure_code(&self) -> ProcedureCode {
        match self {
            E2apPdu::InitiatingMessage(msg) => match msg {
                InitiatingMessage::E2Setup(_) => ProcedureCode::E2_SETUP,
                InitiatingMessage::RicSubscription(_) => ProcedureCode::RIC_SUBSCRIPTION,
                InitiatingMessage::RicSubscriptionDelete(_) => ProcedureCode::RIC_SUBSCRIPTION_DELETE,
                InitiatingMessage::RicIndication(_) => ProcedureCode::RIC_INDICATION,
                InitiatingMessage::RicControl(_) => ProcedureCode::RIC_CONTROL,
                InitiatingMessage::E2Removal(_) => ProcedureCode::E2_REMOVAL,
                InitiatingMessage::ErrorIndication(_) => ProcedureCode::ERROR_INDICATION,
                InitiatingMessage::Other(o) => o.procedure_code,
            },
            E2apPdu::SuccessfulOutcome(msg) => match msg {
                SuccessfulOutcome::E2Setup(_) => ProcedureCode::E2_SETUP,
                SuccessfulOutcome::RicSubscription(_) => ProcedureCode::RIC_SUBSCRIPTION,
                SuccessfulOutcome::RicSubscriptionDelete(_) => ProcedureCode::RIC_SUBSCRIPTION_DELETE,
                SuccessfulOutcome::RicControl(_) => ProcedureCode::RIC_CONTROL,
                SuccessfulOutcome::E2Removal(_) => ProcedureCode::E2_REMOVAL,
                SuccessfulOutcome::Other(o) => o.procedure_code,
            },
            E2apPdu::UnsuccessfulOutcome(msg) => match msg {
                UnsuccessfulOutcome::E2Setup(_) => ProcedureCode::E2_SETUP,
                UnsuccessfulOutcome::RicSubscription(_) => ProcedureCode::RIC_SUBSCRIPTION,
                UnsuccessfulOutcome::RicSubscriptionDelete(_) => ProcedureCode::RIC_SUBSCRIPTION_DELETE,
                UnsuccessfulOutcome::RicControl(_) => ProcedureCode::RIC_CONTROL,
                UnsuccessfulOutcome::E2Removal(_) => ProcedureCode::E2_REMOVAL,
                UnsuccessfulOutcome::Other(o) => o.procedure_code,
            },
        }
    }

    /// Procedure criticality sent with this PDU
    fn criticality(&self) -> Criticality {
        let opaque = match self {
            E2apPdu::InitiatingMessage(InitiatingMessage::Other(o))
            | E2apPdu::SuccessfulOutcome(SuccessfulOutcome::Other(o))
            | E2apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::Other(o)) => Some(o.criticality),
            _ => None,
        };
        opaque.unwrap_or(match self.procedure_code() {
            ProcedureCode::RIC_INDICATION | ProcedureCode::ERROR_INDICATION => Criticality::Ignore,
            _ => Criticality::Reject,
        })
    }

    /// Message name for logging
    pub fn message_name(&self) -> &'static str {
        match self {
            E2apPdu::InitiatingMessage(msg) => match msg {
                InitiatingMessage::E2Setup(_) => E2SetupRequest::NAME,
                InitiatingMessage::RicSubscription(_) => RicSubscriptionRequest::NAME,
                InitiatingMessage::RicSubscriptionDelete(_) => RicSubscriptionDeleteRequest::NAME,
                InitiatingMessage::RicIndication(_) => RicIndication::NAME,
                InitiatingMessage::RicControl(_) => RicControlRequest::NAME,
                InitiatingMessage::E2Removal(_) => E2RemovalRequest::NAME,
                InitiatingMessage::ErrorIndication(_) => ErrorIndication::NAME,
                InitiatingMessage::Other(_) => "initiatingMessage",
            },
            E2apPdu::SuccessfulOutcome(msg) => match msg {
                SuccessfulOutcome::E2Setup(_) => E2SetupResponse::NAME,
                SuccessfulOutcome::RicSubscription(_) => RicSubscriptionResponse::NAME,
                SuccessfulOutcome::RicSubscriptionDelete(_) => RicSubscriptionDeleteResponse::NAME,
                SuccessfulOutcome::RicControl(_) => RicControlAcknowledge::NAME,
                SuccessfulOutcome::E2Removal(_) => E2RemovalResponse::NAME,
                SuccessfulOutcome::Other(_) => "successfulOutcome",
            },
            E2apPdu::UnsuccessfulOutcome(msg) => match msg {
                UnsuccessfulOutcome::E2Setup(_) => E2SetupFailure::NAME,
                UnsuccessfulOutcome::RicSubscription(_) => RicSubscriptionFailure::NAME,
                UnsuccessfulOutcome::RicSubscriptionDelete(_) => RicSubscriptionDeleteFailure::NAME,
                UnsuccessfulOutcome::RicControl(_) => RicControlFailure::NAME,
                UnsuccessfulOutcome::E2Removal(_) => E2RemovalFailure::NAME,
                UnsuccessfulOutcome::Other(_) => "unsuccessfulOutcome",
            },
        }
    }

    fn encode_value(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            E2apPdu::InitiatingMessage(msg) => match msg {
                InitiatingMessage::E2Setup(m) => encode_message(encoder, m),
                InitiatingMessage::RicSubscription(m) => encode_message(encoder, m),
                InitiatingMessage::RicSubscriptionDelete(m) => encode_message(encoder, m),
                InitiatingMessage::RicIndication(m) => encode_message(encoder, m),
                InitiatingMessage::RicControl(m) => encode_message(encoder, m),
                InitiatingMessage::E2Removal(m) => encode_message(encoder, m),
                InitiatingMessage::ErrorIndication(m) => encode_message(encoder, m),
                InitiatingMessage::Other(o) => write_raw(encoder, &o.value),
            },
            E2apPdu::SuccessfulOutcome(msg) => match msg {
                SuccessfulOutcome::E2Setup(m) => encode_message(encoder, m),
                SuccessfulOutcome::RicSubscription(m) => encode_message(encoder, m),
                SuccessfulOutcome::RicSubscriptionDelete(m) => encode_message(encoder, m),
                SuccessfulOutcome::RicControl(m) => encode_message(encoder, m),
                SuccessfulOutcome::E2Removal(m) => encode_message(encoder, m),
                SuccessfulOutcome::Other(o) => write_raw(encoder, &o.value),
            },
            E2apPdu::UnsuccessfulOutcome(msg) => match msg {
                UnsuccessfulOutcome::E2Setup(m) => encode_message(encoder, m),
                UnsuccessfulOutcome::RicSubscription(m) => encode_message(encoder, m),
                UnsuccessfulOutcome::RicSubscriptionDelete(m) => encode_message(encoder, m),
                UnsuccessfulOutcome::RicControl(m) => encode_message(encoder, m),
                UnsuccessfulOutcome::E2Removal(m) => encode_message(encoder, m),
                UnsuccessfulOutcome::Other(o) => write_raw(encoder, &o.value),
            },
        }
    }

    fn decode_value(
        kind: OutcomeKind,
        procedure_code: ProcedureCode,
        criticality: Criticality,
        value: Vec<u8>,
    ) -> PerResult<Self> {
        let mut decoder = AperDecoder::new(&value);
        let d = &mut decoder;
        let pdu = match kind {
            OutcomeKind::Initiating => E2apPdu::InitiatingMessage(match procedure_code {
                ProcedureCode::E2_SETUP => InitiatingMessage::E2Setup(decode_message(d)?),
                ProcedureCode::RIC_SUBSCRIPTION => InitiatingMessage::RicSubscription(decode_message(d)?),
                ProcedureCode::RIC_SUBSCRIPTION_DELETE => {
                    InitiatingMessage::RicSubscriptionDelete(decode_message(d)?)
                }
                ProcedureCode::RIC_INDICATION => InitiatingMessage::RicIndication(decode_message(d)?),
                ProcedureCode::RIC_CONTROL => InitiatingMessage::RicControl(decode_message(d)?),
                ProcedureCode::E2_REMOVAL => InitiatingMessage::E2Removal(decode_message(d)?),
                ProcedureCode::ERROR_INDICATION => InitiatingMessage::ErrorIndication(decode_message(d)?),
                _ => InitiatingMessage::Other(OpaqueMessage {
                    procedure_code,
                    criticality,
                    value: value.clone(),
                }),
            }),
            OutcomeKind::Successful => E2apPdu::SuccessfulOutcome(match procedure_code {
                ProcedureCode::E2_SETUP => SuccessfulOutcome::E2Setup(decode_message(d)?),
                ProcedureCode::RIC_SUBSCRIPTION => SuccessfulOutcome::RicSubscription(decode_message(d)?),
                ProcedureCode::RIC_SUBSCRIPTION_DELETE => {
                    SuccessfulOutcome::RicSubscriptionDelete(decode_message(d)?)
                }
                ProcedureCode::RIC_CONTROL => SuccessfulOutcome::RicControl(decode_message(d)?),
                ProcedureCode::E2_REMOVAL => SuccessfulOutcome::E2Removal(decode_message(d)?),
                _ => SuccessfulOutcome::Other(OpaqueMessage {
                    procedure_code,
                    criticality,
                    value: value.clone(),
                }),
            }),
            OutcomeKind::Unsuccessful => E2apPdu::UnsuccessfulOutcome(match procedure_code {
                ProcedureCode::E2_SETUP => UnsuccessfulOutcome::E2Setup(decode_message(d)?),
                ProcedureCode::RIC_SUBSCRIPTION => UnsuccessfulOutcome::RicSubscription(decode_message(d)?),
                ProcedureCode::RIC_SUBSCRIPTION_DELETE => {
                    UnsuccessfulOutcome::RicSubscriptionDelete(decode_message(d)?)
                }
                ProcedureCode::RIC_CONTROL => UnsuccessfulOutcome::RicControl(decode_message(d)?),
                ProcedureCode::E2_REMOVAL => UnsuccessfulOutcome::E2Removal(decode_message(d)?),
                _ => UnsuccessfulOutcome::Other(OpaqueMessage {
                    procedure_code,
                    criticality,
                    value: value.clone(),
                }),
            }),
        };
        Ok(pdu)
    }
}

fn write_raw(encoder: &mut AperEncoder, value: &[u8]) -> PerResult<()> {
    encoder.write_bytes(value);
    Ok(())
}

impl AperEncode for E2apPdu {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        let index = match self.outcome() {
            OutcomeKind::Initiating => 0,
            OutcomeKind::Successful => 1,
            OutcomeKind::Unsuccessful => 2,
        };
        encoder.encode_choice_index(index, 3, true)?;
        encoder.encode_sequence_preamble(false, &[]);
        encoder.encode_constrained_whole_number(i64::from(self.procedure_code().0), &PROCEDURE_CODE)?;
        self.criticality().encode_aper(encoder)?;
        encoder.encode_open_type(|enc| self.encode_value(enc))
    }
}

impl AperDecode for E2apPdu {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let kind = match decoder.decode_choice_index(3, true)? {
            0 => OutcomeKind::Initiating,
            1 => OutcomeKind::Successful,
            2 => OutcomeKind::Unsuccessful,
            _ => return Err(PerError::UnsupportedExtension),
        };
        let procedure_code = ProcedureCode(decoder.decode_constrained_whole_number(&PROCEDURE_CODE)? as u8);
        let criticality = Criticality::decode_aper(decoder)?;
        let value = decoder.decode_open_type_bytes()?;
        Self::decode_value(kind, procedure_code, criticality, value)
    }
}

impl AsnType for E2apPdu {
    const TYPE_NAME: &'static str = "E2AP-PDU";

    fn check_constraints(&self) -> Result<(), String> {
        let result = match self {
            E2apPdu::InitiatingMessage(msg) => match msg {
                InitiatingMessage::E2Setup(m) => m.check_constraints(),
                InitiatingMessage::RicSubscription(m) => m.check_constraints(),
                InitiatingMessage::RicSubscriptionDelete(m) => m.check_constraints(),
                InitiatingMessage::RicIndication(m) => m.check_constraints(),
                InitiatingMessage::RicControl(m) => m.check_constraints(),
                InitiatingMessage::E2Removal(m) => m.check_constraints(),
                InitiatingMessage::ErrorIndication(m) => m.check_constraints(),
                InitiatingMessage::Other(_) => Ok(()),
            },
            E2apPdu::SuccessfulOutcome(msg) => match msg {
                SuccessfulOutcome::E2Setup(m) => m.check_constraints(),
                SuccessfulOutcome::RicSubscription(m) => m.check_constraints(),
                SuccessfulOutcome::RicSubscriptionDelete(m) => m.check_constraints(),
                SuccessfulOutcome::RicControl(m) => m.check_constraints(),
                SuccessfulOutcome::E2Removal(m) => m.check_constraints(),
                SuccessfulOutcome::Other(_) => Ok(()),
            },
            E2apPdu::UnsuccessfulOutcome(msg) => match msg {
                UnsuccessfulOutcome::E2Setup(m) => m.check_constraints(),
                UnsuccessfulOutcome::RicSubscription(m) => m.check_constraints(),
                UnsuccessfulOutcome::RicSubscriptionDelete(m) => m.check_constraints(),
                UnsuccessfulOutcome::RicControl(m) => m.check_constraints(),
                UnsuccessfulOutcome::E2Removal(m) => m.check_constraints(),
                UnsuccessfulOutcome::Other(_) => Ok(()),
            },
        };
        result.map_err(|e| format!("{}: {e}", self.message_name()))
    }
}

/// Encodes an E2AP PDU to aligned PER bytes.
pub fn encode_e2ap_pdu(pdu: &E2apPdu) -> Result<Vec<u8>, crate::codec::CodecError> {
    crate::codec::encode(pdu)
}

/// Decodes aligned PER bytes into an E2AP PDU.
pub fn decode_e2ap_pdu(bytes: &[u8]) -> Result<E2apPdu, crate::codec::CodecError> {
    crate::codec::decode(bytes)
}
