//! E2AP information element values
//!
//! Value types carried inside E2AP protocol IEs, with their aligned PER
//! encodings (O-RAN E2AP v2 ASN.1).

use std::fmt;

use bitvec::prelude::*;

use crate::per::{
    decode_sequence_of, encode_sequence_of, AperDecode, AperDecoder, AperEncode, AperEncoder,
    Constraint, PerError, PerResult,
};

/// RAN function ID, INTEGER (0..4095)
pub type RanFunctionId = u16;

/// RIC action ID, INTEGER (0..255)
pub type RicActionId = u8;

pub const MAX_RAN_FUNCTION_ID: u16 = 4095;
pub const MAX_RAN_FUNCTION_REVISION: u16 = 4095;
pub const MAX_OF_RAN_FUNCTION_ID: usize = 256;
pub const MAX_OF_RIC_ACTION_ID: usize = 16;
pub const MAX_OF_E2_NODE_COMPONENTS: usize = 1024;
pub const MAX_OF_ERRORS: usize = 256;

pub(crate) const RAN_FUNCTION_ID: Constraint = Constraint::new(0, 4095);
pub(crate) const RAN_FUNCTION_REVISION: Constraint = Constraint::new(0, 4095);
pub(crate) const RIC_ACTION_ID: Constraint = Constraint::new(0, 255);
pub(crate) const TRANSACTION_ID: Constraint = Constraint::extensible(0, 255);
pub(crate) const RIC_INDICATION_SN: Constraint = Constraint::new(0, 65535);
const REQUEST_PART_ID: Constraint = Constraint::new(0, 65535);
const PROCEDURE_CODE: Constraint = Constraint::new(0, 255);
const PROTOCOL_IE_ID: Constraint = Constraint::new(0, 65535);
const GNB_CU_UP_ID: Constraint = Constraint::new(0, 68_719_476_735);

/// Defines a fieldless ENUMERATED type with its APER encoding.
///
/// Variants are listed in root order; `extensible` tells whether the ASN.1
/// type carries an extension marker.
#[macro_export]
macro_rules! asn_enumerated {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident (extensible = $ext:expr) {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Root values in declaration order
            pub const VALUES: &'static [$name] = &[$($name::$variant),+];

            /// Position in the root enumeration
            pub fn index(self) -> usize {
                self as usize
            }

            /// Value at the given root position
            pub fn from_index(index: usize) -> Option<Self> {
                Self::VALUES.get(index).copied()
            }
        }

        impl $crate::per::AperEncode for $name {
            fn encode_aper(
                &self,
                encoder: &mut $crate::per::AperEncoder,
            ) -> $crate::per::PerResult<()> {
                encoder.encode_enumerated(self.index(), Self::VALUES.len(), $ext)
            }
        }

        impl $crate::per::AperDecode for $name {
            fn decode_aper(
                decoder: &mut $crate::per::AperDecoder,
            ) -> $crate::per::PerResult<Self> {
                let index = decoder.decode_enumerated(Self::VALUES.len(), $ext)?;
                Self::from_index(index).ok_or_else(|| {
                    $crate::per::PerError::DecodeError(format!(
                        "unsupported {} value {}",
                        stringify!($name),
                        index
                    ))
                })
            }
        }
    };
}

asn_enumerated! {
    /// Criticality of a procedure or IE
    pub enum Criticality (extensible = false) {
        Reject,
        Ignore,
        Notify,
    }
}

asn_enumerated! {
    /// Message that triggered an error report
    pub enum TriggeringMessage (extensible = false) {
        InitiatingMessage,
        SuccessfulOutcome,
        UnsuccessfulOutcome,
    }
}

asn_enumerated! {
    pub enum TypeOfError (extensible = true) {
        NotUnderstood,
        Missing,
    }
}

asn_enumerated! {
    pub enum CauseRicRequest (extensible = true) {
        RanFunctionIdInvalid,
        ActionNotSupported,
        ExcessiveActions,
        DuplicateAction,
        DuplicateEventTrigger,
        FunctionResourceLimit,
        RequestIdUnknown,
        InconsistentActionSubsequentActionSequence,
        ControlMessageInvalid,
        RicCallProcessIdInvalid,
        ControlTimerExpired,
        ControlFailedToExecute,
        SystemNotReady,
        Unspecified,
    }
}

asn_enumerated! {
    pub enum CauseRicService (extensible = true) {
        RanFunctionNotSupported,
        ExcessiveFunctions,
        RicResourceLimit,
    }
}

asn_enumerated! {
    pub enum CauseE2Node (extensible = true) {
        E2NodeComponentUnknown,
    }
}

asn_enumerated! {
    pub enum CauseTransport (extensible = true) {
        Unspecified,
        TransportResourceUnavailable,
    }
}

asn_enumerated! {
    pub enum CauseProtocol (extensible = true) {
        TransferSyntaxError,
        AbstractSyntaxErrorReject,
        AbstractSyntaxErrorIgnoreAndNotify,
        MessageNotCompatibleWithReceiverState,
        SemanticError,
        AbstractSyntaxErrorFalselyConstructedMessage,
        Unspecified,
    }
}

asn_enumerated! {
    pub enum CauseMisc (extensible = true) {
        ControlProcessingOverload,
        HardwareFailure,
        OmIntervention,
        Unspecified,
    }
}

/// E2AP `Cause`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cause {
    RicRequest(CauseRicRequest),
    RicService(CauseRicService),
    E2Node(CauseE2Node),
    Transport(CauseTransport),
    Protocol(CauseProtocol),
    Misc(CauseMisc),
}

impl Cause {
    const ALTERNATIVES: usize = 6;
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::RicRequest(c) => write!(f, "ricRequest/{c:?}"),
            Cause::RicService(c) => write!(f, "ricService/{c:?}"),
            Cause::E2Node(c) => write!(f, "e2Node/{c:?}"),
            Cause::Transport(c) => write!(f, "transport/{c:?}"),
            Cause::Protocol(c) => write!(f, "protocol/{c:?}"),
            Cause::Misc(c) => write!(f, "misc/{c:?}"),
        }
    }
}

impl AperEncode for Cause {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        let (index, value): (usize, &dyn AperEncode) = match self {
            Cause::RicRequest(c) => (0, c),
            Cause::RicService(c) => (1, c),
            Cause::E2Node(c) => (2, c),
            Cause::Transport(c) => (3, c),
            Cause::Protocol(c) => (4, c),
            Cause::Misc(c) => (5, c),
        };
        encoder.encode_choice_index(index, Self::ALTERNATIVES, true)?;
        value.encode_aper(encoder)
    }
}

impl AperDecode for Cause {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let cause = match decoder.decode_choice_index(Self::ALTERNATIVES, true)? {
            0 => Cause::RicRequest(CauseRicRequest::decode_aper(decoder)?),
            1 => Cause::RicService(CauseRicService::decode_aper(decoder)?),
            2 => Cause::E2Node(CauseE2Node::decode_aper(decoder)?),
            3 => Cause::Transport(CauseTransport::decode_aper(decoder)?),
            4 => Cause::Protocol(CauseProtocol::decode_aper(decoder)?),
            5 => Cause::Misc(CauseMisc::decode_aper(decoder)?),
            index => {
                return Err(PerError::InvalidChoiceIndex {
                    index,
                    max: Self::ALTERNATIVES - 1,
                })
            }
        };
        Ok(cause)
    }
}

/// RICrequestID ::= SEQUENCE { ricRequestorID, ricInstanceID, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RicRequestId {
    pub requestor_id: u16,
    pub instance_id: u16,
}

impl RicRequestId {
    pub const fn new(requestor_id: u16, instance_id: u16) -> Self {
        Self {
            requestor_id,
            instance_id,
        }
    }
}

impl fmt::Display for RicRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.requestor_id, self.instance_id)
    }
}

impl AperEncode for RicRequestId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_constrained_whole_number(i64::from(self.requestor_id), &REQUEST_PART_ID)?;
        encoder.encode_constrained_whole_number(i64::from(self.instance_id), &REQUEST_PART_ID)
    }
}

impl AperDecode for RicRequestId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let requestor_id = decoder.decode_constrained_whole_number(&REQUEST_PART_ID)? as u16;
        let instance_id = decoder.decode_constrained_whole_number(&REQUEST_PART_ID)? as u16;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self::new(requestor_id, instance_id))
    }
}

/// One entry of `iEsCriticalityDiagnostics`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriticalityDiagnosticsIeItem {
    pub ie_criticality: Criticality,
    pub ie_id: u16,
    pub type_of_error: TypeOfError,
}

impl AperEncode for CriticalityDiagnosticsIeItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        self.ie_criticality.encode_aper(encoder)?;
        encoder.encode_constrained_whole_number(i64::from(self.ie_id), &PROTOCOL_IE_ID)?;
        self.type_of_error.encode_aper(encoder)
    }
}

impl AperDecode for CriticalityDiagnosticsIeItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let item = Self {
            ie_criticality: Criticality::decode_aper(decoder)?,
            ie_id: decoder.decode_constrained_whole_number(&PROTOCOL_IE_ID)? as u16,
            type_of_error: TypeOfError::decode_aper(decoder)?,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(item)
    }
}

/// CriticalityDiagnostics
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CriticalityDiagnostics {
    pub procedure_code: Option<u8>,
    pub triggering_message: Option<TriggeringMessage>,
    pub procedure_criticality: Option<Criticality>,
    pub ric_requestor_id: Option<RicRequestId>,
    /// Empty means absent
    pub ies: Vec<CriticalityDiagnosticsIeItem>,
}

impl AperEncode for CriticalityDiagnostics {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(
            true,
            &[
                self.procedure_code.is_some(),
                self.triggering_message.is_some(),
                self.procedure_criticality.is_some(),
                self.ric_requestor_id.is_some(),
                !self.ies.is_empty(),
            ],
        );
        if let Some(code) = self.procedure_code {
            encoder.encode_constrained_whole_number(i64::from(code), &PROCEDURE_CODE)?;
        }
        if let Some(msg) = self.triggering_message {
            msg.encode_aper(encoder)?;
        }
        if let Some(crit) = self.procedure_criticality {
            crit.encode_aper(encoder)?;
        }
        if let Some(id) = &self.ric_requestor_id {
            id.encode_aper(encoder)?;
        }
        if !self.ies.is_empty() {
            encode_sequence_of(encoder, &self.ies, 1, MAX_OF_ERRORS)?;
        }
        Ok(())
    }
}

impl AperDecode for CriticalityDiagnostics {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 5)?;
        let mut diag = Self::default();
        if opt[0] {
            diag.procedure_code = Some(decoder.decode_constrained_whole_number(&PROCEDURE_CODE)? as u8);
        }
        if opt[1] {
            diag.triggering_message = Some(TriggeringMessage::decode_aper(decoder)?);
        }
        if opt[2] {
            diag.procedure_criticality = Some(Criticality::decode_aper(decoder)?);
        }
        if opt[3] {
            diag.ric_requestor_id = Some(RicRequestId::decode_aper(decoder)?);
        }
        if opt[4] {
            diag.ies = decode_sequence_of(decoder, 1, MAX_OF_ERRORS)?;
        }
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(diag)
    }
}

/// PLMN-Identity ::= OCTET STRING (SIZE(3))
pub fn encode_plmn_identity(encoder: &mut AperEncoder, plmn: &[u8; 3]) -> PerResult<()> {
    encoder.encode_octet_string(plmn, Some(3), Some(3))
}

pub fn decode_plmn_identity(decoder: &mut AperDecoder) -> PerResult<[u8; 3]> {
    let bytes = decoder.decode_octet_string(Some(3), Some(3))?;
    let mut plmn = [0u8; 3];
    plmn.copy_from_slice(&bytes);
    Ok(plmn)
}

/// Big-endian bit string of `length` bits holding `value`
pub fn bits_from_value(value: u64, length: usize) -> BitVec<u8, Msb0> {
    let mut bits = BitVec::<u8, Msb0>::with_capacity(length);
    for i in (0..length).rev() {
        bits.push((value >> i) & 1 == 1);
    }
    bits
}

pub fn value_from_bits(bits: &BitSlice<u8, Msb0>) -> u64 {
    bits.iter().fold(0u64, |acc, bit| (acc << 1) | u64::from(*bit))
}

/// gNB ID carried as a BIT STRING (SIZE(22..32))
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GnbIdBits {
    /// Value right-aligned in `length` bits
    pub value: u32,
    pub length: u8,
}

/// GlobalgNB-ID ::= SEQUENCE { plmn-id, gnb-id GNB-ID-Choice, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalGnbId {
    pub plmn: [u8; 3],
    pub gnb_id: GnbIdBits,
}

impl AperEncode for GlobalGnbId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encode_plmn_identity(encoder, &self.plmn)?;
        // GNB-ID-Choice has a single root alternative
        encoder.encode_choice_index(0, 1, true)?;
        let bits = bits_from_value(u64::from(self.gnb_id.value), usize::from(self.gnb_id.length));
        encoder.encode_bit_string(&bits, Some(22), Some(32))
    }
}

impl AperDecode for GlobalGnbId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let plmn = decode_plmn_identity(decoder)?;
        if decoder.decode_choice_index(1, true)? != 0 {
            return Err(PerError::UnsupportedExtension);
        }
        let bits = decoder.decode_bit_string(Some(22), Some(32))?;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            plmn,
            gnb_id: GnbIdBits {
                value: value_from_bits(&bits) as u32,
                length: bits.len() as u8,
            },
        })
    }
}

/// GlobalE2node-gNB-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalE2NodeGnbId {
    pub global_gnb_id: GlobalGnbId,
    pub gnb_cu_up_id: Option<u64>,
    pub gnb_du_id: Option<u64>,
}

/// GlobalE2node-ID ::= CHOICE { gNB, en-gNB, ng-eNB, eNB, ... }
///
/// Only the gNB alternative is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalE2NodeIdIe {
    Gnb(GlobalE2NodeGnbId),
}

impl GlobalE2NodeIdIe {
    const ALTERNATIVES: usize = 4;

    /// gNB node identity from its PLMN octets and a gNB ID of `length` bits
    pub fn gnb(plmn: [u8; 3], gnb_id: u32, length: u8) -> Self {
        GlobalE2NodeIdIe::Gnb(GlobalE2NodeGnbId {
            global_gnb_id: GlobalGnbId {
                plmn,
                gnb_id: GnbIdBits {
                    value: gnb_id,
                    length,
                },
            },
            gnb_cu_up_id: None,
            gnb_du_id: None,
        })
    }
}

impl AperEncode for GlobalE2NodeIdIe {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        let GlobalE2NodeIdIe::Gnb(gnb) = self;
        encoder.encode_choice_index(0, Self::ALTERNATIVES, true)?;
        // global-en-gNB-ID is never sent
        encoder.encode_sequence_preamble(
            true,
            &[false, gnb.gnb_cu_up_id.is_some(), gnb.gnb_du_id.is_some()],
        );
        gnb.global_gnb_id.encode_aper(encoder)?;
        if let Some(id) = gnb.gnb_cu_up_id {
            encoder.encode_constrained_whole_number(id as i64, &GNB_CU_UP_ID)?;
        }
        if let Some(id) = gnb.gnb_du_id {
            encoder.encode_constrained_whole_number(id as i64, &GNB_CU_UP_ID)?;
        }
        Ok(())
    }
}

impl AperDecode for GlobalE2NodeIdIe {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let index = decoder.decode_choice_index(Self::ALTERNATIVES, true)?;
        if index != 0 {
            return Err(PerError::DecodeError(format!(
                "GlobalE2node-ID alternative {index} not supported"
            )));
        }
        let (extended, opt) = decoder.decode_sequence_preamble(true, 3)?;
        let global_gnb_id = GlobalGnbId::decode_aper(decoder)?;
        if opt[0] {
            return Err(PerError::DecodeError("global-en-gNB-ID not supported".to_string()));
        }
        let gnb_cu_up_id = if opt[1] {
            Some(decoder.decode_constrained_whole_number(&GNB_CU_UP_ID)? as u64)
        } else {
            None
        };
        let gnb_du_id = if opt[2] {
            Some(decoder.decode_constrained_whole_number(&GNB_CU_UP_ID)? as u64)
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(GlobalE2NodeIdIe::Gnb(GlobalE2NodeGnbId {
            global_gnb_id,
            gnb_cu_up_id,
            gnb_du_id,
        }))
    }
}

/// GlobalRIC-ID ::= SEQUENCE { pLMN-Identity, ric-ID BIT STRING (SIZE(20)), ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalRicId {
    pub plmn: [u8; 3],
    /// 20-bit RIC ID
    pub ric_id: u32,
}

impl AperEncode for GlobalRicId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encode_plmn_identity(encoder, &self.plmn)?;
        encoder.encode_bit_string(&bits_from_value(u64::from(self.ric_id), 20), Some(20), Some(20))
    }
}

impl AperDecode for GlobalRicId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let plmn = decode_plmn_identity(decoder)?;
        let bits = decoder.decode_bit_string(Some(20), Some(20))?;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            plmn,
            ric_id: value_from_bits(&bits) as u32,
        })
    }
}

/// RANfunction-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanFunctionItem {
    pub ran_function_id: RanFunctionId,
    /// Encoded service-model RAN function definition
    pub definition: Vec<u8>,
    pub revision: u16,
    pub oid: String,
}

impl AperEncode for RanFunctionItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_constrained_whole_number(i64::from(self.ran_function_id), &RAN_FUNCTION_ID)?;
        encoder.encode_octet_string(&self.definition, None, None)?;
        encoder.encode_constrained_whole_number(i64::from(self.revision), &RAN_FUNCTION_REVISION)?;
        encoder.encode_printable_string(&self.oid, 1, 1000, true)
    }
}

impl AperDecode for RanFunctionItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let item = Self {
            ran_function_id: decoder.decode_constrained_whole_number(&RAN_FUNCTION_ID)? as u16,
            definition: decoder.decode_octet_string(None, None)?,
            revision: decoder.decode_constrained_whole_number(&RAN_FUNCTION_REVISION)? as u16,
            oid: decoder.decode_printable_string(1, 1000, true)?,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(item)
    }
}

/// RANfunctionID-Item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RanFunctionIdItem {
    pub ran_function_id: RanFunctionId,
    pub revision: u16,
}

impl AperEncode for RanFunctionIdItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_constrained_whole_number(i64::from(self.ran_function_id), &RAN_FUNCTION_ID)?;
        encoder.encode_constrained_whole_number(i64::from(self.revision), &RAN_FUNCTION_REVISION)
    }
}

impl AperDecode for RanFunctionIdItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let item = Self {
            ran_function_id: decoder.decode_constrained_whole_number(&RAN_FUNCTION_ID)? as u16,
            revision: decoder.decode_constrained_whole_number(&RAN_FUNCTION_REVISION)? as u16,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(item)
    }
}

/// RANfunctionIDcause-Item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RanFunctionIdCauseItem {
    pub ran_function_id: RanFunctionId,
    pub cause: Cause,
}

impl AperEncode for RanFunctionIdCauseItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_constrained_whole_number(i64::from(self.ran_function_id), &RAN_FUNCTION_ID)?;
        self.cause.encode_aper(encoder)
    }
}

impl AperDecode for RanFunctionIdCauseItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let item = Self {
            ran_function_id: decoder.decode_constrained_whole_number(&RAN_FUNCTION_ID)? as u16,
            cause: Cause::decode_aper(decoder)?,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(item)
    }
}

asn_enumerated! {
    pub enum E2NodeComponentInterfaceType (extensible = true) {
        Ng,
        Xn,
        E1,
        F1,
        W1,
        S1,
        X2,
    }
}

/// E2nodeComponentID, NG alternative only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum E2NodeComponentId {
    /// E2nodeComponentInterfaceNG ::= SEQUENCE { amf-name AMFName, ... }
    Ng { amf_name: String },
}

impl E2NodeComponentId {
    const ALTERNATIVES: usize = 7;
}

impl AperEncode for E2NodeComponentId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        let E2NodeComponentId::Ng { amf_name } = self;
        encoder.encode_choice_index(0, Self::ALTERNATIVES, true)?;
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_printable_string(amf_name, 1, 150, true)
    }
}

impl AperDecode for E2NodeComponentId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let index = decoder.decode_choice_index(Self::ALTERNATIVES, true)?;
        if index != 0 {
            return Err(PerError::DecodeError(format!(
                "E2nodeComponentID alternative {index} not supported"
            )));
        }
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let amf_name = decoder.decode_printable_string(1, 150, true)?;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(E2NodeComponentId::Ng { amf_name })
    }
}

/// E2nodeComponentConfiguration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct E2NodeComponentConfiguration {
    pub request_part: Vec<u8>,
    pub response_part: Vec<u8>,
}

impl AperEncode for E2NodeComponentConfiguration {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_octet_string(&self.request_part, None, None)?;
        encoder.encode_octet_string(&self.response_part, None, None)
    }
}

impl AperDecode for E2NodeComponentConfiguration {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let config = Self {
            request_part: decoder.decode_octet_string(None, None)?,
            response_part: decoder.decode_octet_string(None, None)?,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(config)
    }
}

/// E2nodeComponentConfigAddition-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2NodeComponentConfigAdditionItem {
    pub interface_type: E2NodeComponentInterfaceType,
    pub component_id: E2NodeComponentId,
    pub configuration: E2NodeComponentConfiguration,
}

impl AperEncode for E2NodeComponentConfigAdditionItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        self.interface_type.encode_aper(encoder)?;
        self.component_id.encode_aper(encoder)?;
        self.configuration.encode_aper(encoder)
    }
}

impl AperDecode for E2NodeComponentConfigAdditionItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let item = Self {
            interface_type: E2NodeComponentInterfaceType::decode_aper(decoder)?,
            component_id: E2NodeComponentId::decode_aper(decoder)?,
            configuration: E2NodeComponentConfiguration::decode_aper(decoder)?,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(item)
    }
}

asn_enumerated! {
    pub enum UpdateOutcome (extensible = true) {
        Success,
        Failure,
    }
}

/// E2nodeComponentConfigurationAck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct E2NodeComponentConfigurationAck {
    pub outcome: UpdateOutcome,
    pub failure_cause: Option<Cause>,
}

impl AperEncode for E2NodeComponentConfigurationAck {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.failure_cause.is_some()]);
        self.outcome.encode_aper(encoder)?;
        if let Some(cause) = &self.failure_cause {
            cause.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for E2NodeComponentConfigurationAck {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let outcome = UpdateOutcome::decode_aper(decoder)?;
        let failure_cause = if opt[0] {
            Some(Cause::decode_aper(decoder)?)
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            outcome,
            failure_cause,
        })
    }
}

/// E2nodeComponentConfigAdditionAck-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2NodeComponentConfigAdditionAckItem {
    pub interface_type: E2NodeComponentInterfaceType,
    pub component_id: E2NodeComponentId,
    pub ack: E2NodeComponentConfigurationAck,
}

impl AperEncode for E2NodeComponentConfigAdditionAckItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        self.interface_type.encode_aper(encoder)?;
        self.component_id.encode_aper(encoder)?;
        self.ack.encode_aper(encoder)
    }
}

impl AperDecode for E2NodeComponentConfigAdditionAckItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let item = Self {
            interface_type: E2NodeComponentInterfaceType::decode_aper(decoder)?,
            component_id: E2NodeComponentId::decode_aper(decoder)?,
            ack: E2NodeComponentConfigurationAck::decode_aper(decoder)?,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(item)
    }
}

asn_enumerated! {
    pub enum RicActionType (extensible = true) {
        Report,
        Insert,
        Policy,
    }
}

asn_enumerated! {
    pub enum RicSubsequentActionType (extensible = true) {
        Continue,
        Wait,
    }
}

asn_enumerated! {
    pub enum RicTimeToWait (extensible = true) {
        W1ms,
        W2ms,
        W5ms,
        W10ms,
        W20ms,
        W30ms,
        W40ms,
        W50ms,
        W100ms,
        W200ms,
        W500ms,
        W1s,
        W2s,
        W5s,
        W10s,
        W20s,
        W60s,
    }
}

asn_enumerated! {
    /// TimeToWait carried in E2 SETUP FAILURE
    pub enum TimeToWait (extensible = true) {
        V1s,
        V2s,
        V5s,
        V10s,
        V20s,
        V60s,
    }
}

asn_enumerated! {
    pub enum RicIndicationType (extensible = true) {
        Report,
        Insert,
    }
}

asn_enumerated! {
    pub enum RicControlAckRequest (extensible = true) {
        NoAck,
        Ack,
    }
}

/// RICsubsequentAction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RicSubsequentAction {
    pub action_type: RicSubsequentActionType,
    pub time_to_wait: RicTimeToWait,
}

impl AperEncode for RicSubsequentAction {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        self.action_type.encode_aper(encoder)?;
        self.time_to_wait.encode_aper(encoder)
    }
}

impl AperDecode for RicSubsequentAction {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let action = Self {
            action_type: RicSubsequentActionType::decode_aper(decoder)?,
            time_to_wait: RicTimeToWait::decode_aper(decoder)?,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(action)
    }
}

/// RICaction-ToBeSetup-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicActionToBeSetupItem {
    pub action_id: RicActionId,
    pub action_type: RicActionType,
    pub action_definition: Option<Vec<u8>>,
    pub subsequent_action: Option<RicSubsequentAction>,
}

impl AperEncode for RicActionToBeSetupItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(
            true,
            &[self.action_definition.is_some(), self.subsequent_action.is_some()],
        );
        encoder.encode_constrained_whole_number(i64::from(self.action_id), &RIC_ACTION_ID)?;
        self.action_type.encode_aper(encoder)?;
        if let Some(definition) = &self.action_definition {
            encoder.encode_octet_string(definition, None, None)?;
        }
        if let Some(subsequent) = &self.subsequent_action {
            subsequent.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for RicActionToBeSetupItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 2)?;
        let action_id = decoder.decode_constrained_whole_number(&RIC_ACTION_ID)? as u8;
        let action_type = RicActionType::decode_aper(decoder)?;
        let action_definition = if opt[0] {
            Some(decoder.decode_octet_string(None, None)?)
        } else {
            None
        };
        let subsequent_action = if opt[1] {
            Some(RicSubsequentAction::decode_aper(decoder)?)
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            action_id,
            action_type,
            action_definition,
            subsequent_action,
        })
    }
}

/// RICaction-NotAdmitted-Item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RicActionNotAdmittedItem {
    pub action_id: RicActionId,
    pub cause: Cause,
}

impl AperEncode for RicActionNotAdmittedItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_constrained_whole_number(i64::from(self.action_id), &RIC_ACTION_ID)?;
        self.cause.encode_aper(encoder)
    }
}

impl AperDecode for RicActionNotAdmittedItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let item = Self {
            action_id: decoder.decode_constrained_whole_number(&RIC_ACTION_ID)? as u8,
            cause: Cause::decode_aper(decoder)?,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(item)
    }
}
