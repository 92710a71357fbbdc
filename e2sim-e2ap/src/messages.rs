//! E2AP message bodies
//!
//! Every E2AP message is `SEQUENCE { protocolIEs ProtocolIE-Container, ... }`.
//! Each IE value travels as an open type, so the container keeps raw value
//! octets and a message decodes only the IEs it knows. Unknown IEs are
//! skipped.

use crate::codec::{check_range, check_size};
use crate::ies::*;
use crate::per::{
    AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult,
};

/// Protocol IE identifiers
pub mod ie_id {
    pub const CAUSE: u16 = 1;
    pub const CRITICALITY_DIAGNOSTICS: u16 = 2;
    pub const GLOBAL_E2NODE_ID: u16 = 3;
    pub const GLOBAL_RIC_ID: u16 = 4;
    pub const RAN_FUNCTION_ID: u16 = 5;
    pub const RAN_FUNCTION_ID_ITEM: u16 = 6;
    pub const RAN_FUNCTION_IE_CAUSE_ITEM: u16 = 7;
    pub const RAN_FUNCTION_ITEM: u16 = 8;
    pub const RAN_FUNCTIONS_ACCEPTED: u16 = 9;
    pub const RAN_FUNCTIONS_ADDED: u16 = 10;
    pub const RAN_FUNCTIONS_REJECTED: u16 = 13;
    pub const RIC_ACTION_ADMITTED_ITEM: u16 = 14;
    pub const RIC_ACTION_ID: u16 = 15;
    pub const RIC_ACTION_NOT_ADMITTED_ITEM: u16 = 16;
    pub const RIC_ACTIONS_ADMITTED: u16 = 17;
    pub const RIC_ACTIONS_NOT_ADMITTED: u16 = 18;
    pub const RIC_ACTION_TO_BE_SETUP_ITEM: u16 = 19;
    pub const RIC_CALL_PROCESS_ID: u16 = 20;
    pub const RIC_CONTROL_ACK_REQUEST: u16 = 21;
    pub const RIC_CONTROL_HEADER: u16 = 22;
    pub const RIC_CONTROL_MESSAGE: u16 = 23;
    pub const RIC_INDICATION_HEADER: u16 = 25;
    pub const RIC_INDICATION_MESSAGE: u16 = 26;
    pub const RIC_INDICATION_SN: u16 = 27;
    pub const RIC_INDICATION_TYPE: u16 = 28;
    pub const RIC_REQUEST_ID: u16 = 29;
    pub const RIC_SUBSCRIPTION_DETAILS: u16 = 30;
    pub const TIME_TO_WAIT: u16 = 31;
    pub const RIC_CONTROL_OUTCOME: u16 = 32;
    pub const TRANSACTION_ID: u16 = 49;
    pub const E2NODE_COMPONENT_CONFIG_ADDITION: u16 = 50;
    pub const E2NODE_COMPONENT_CONFIG_ADDITION_ITEM: u16 = 51;
    pub const E2NODE_COMPONENT_CONFIG_ADDITION_ACK: u16 = 52;
    pub const E2NODE_COMPONENT_CONFIG_ADDITION_ACK_ITEM: u16 = 53;
}

const PROTOCOL_IE_ID: Constraint = Constraint::new(0, 65535);
const MAX_PROTOCOL_IES: usize = 65535;

/// ProtocolIE-Field with its value kept as open-type octets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolIe {
    pub id: u16,
    pub criticality: Criticality,
    pub value: Vec<u8>,
}

/// ProtocolIE-Container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolIeContainer {
    ies: Vec<ProtocolIe>,
}

impl ProtocolIeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an IE whose value is produced by `encode`.
    pub fn push<F>(&mut self, id: u16, criticality: Criticality, encode: F) -> PerResult<()>
    where
        F: FnOnce(&mut AperEncoder) -> PerResult<()>,
    {
        self.ies.push(ProtocolIe {
            id,
            criticality,
            value: encode_open_value(encode)?,
        });
        Ok(())
    }

    pub fn push_value<T: AperEncode>(
        &mut self,
        id: u16,
        criticality: Criticality,
        value: &T,
    ) -> PerResult<()> {
        self.push(id, criticality, |enc| value.encode_aper(enc))
    }

    pub fn find(&self, id: u16) -> Option<&ProtocolIe> {
        self.ies.iter().find(|ie| ie.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProtocolIe> {
        self.ies.iter()
    }

    pub fn len(&self) -> usize {
        self.ies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ies.is_empty()
    }

    /// Decodes the first IE with `id`, if present.
    pub fn get<T, F>(&self, id: u16, decode: F) -> PerResult<Option<T>>
    where
        F: FnOnce(&mut AperDecoder<'_>) -> PerResult<T>,
    {
        match self.find(id) {
            Some(ie) => {
                let mut decoder = AperDecoder::new(&ie.value);
                decode(&mut decoder).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn get_value<T: AperDecode>(&self, id: u16) -> PerResult<Option<T>> {
        self.get(id, |dec| T::decode_aper(dec))
    }

    /// Decodes a mandatory IE; absence is a decode error.
    pub fn require<T, F>(&self, id: u16, name: &str, decode: F) -> PerResult<T>
    where
        F: FnOnce(&mut AperDecoder<'_>) -> PerResult<T>,
    {
        self.get(id, decode)?
            .ok_or_else(|| PerError::DecodeError(format!("missing mandatory IE {name} (id {id})")))
    }

    pub fn require_value<T: AperDecode>(&self, id: u16, name: &str) -> PerResult<T> {
        self.require(id, name, |dec| T::decode_aper(dec))
    }
}

impl AperEncode for ProtocolIeContainer {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_length(self.ies.len(), 0, MAX_PROTOCOL_IES)?;
        for ie in &self.ies {
            encoder.encode_constrained_whole_number(i64::from(ie.id), &PROTOCOL_IE_ID)?;
            ie.criticality.encode_aper(encoder)?;
            encoder.encode_length_determinant(ie.value.len())?;
            encoder.write_bytes(&ie.value);
        }
        Ok(())
    }
}

impl AperDecode for ProtocolIeContainer {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let count = decoder.decode_length(0, MAX_PROTOCOL_IES)?;
        let mut ies = Vec::with_capacity(count);
        for _ in 0..count {
            let id = decoder.decode_constrained_whole_number(&PROTOCOL_IE_ID)? as u16;
            let criticality = Criticality::decode_aper(decoder)?;
            let value = decoder.decode_open_type_bytes()?;
            ies.push(ProtocolIe {
                id,
                criticality,
                value,
            });
        }
        Ok(Self { ies })
    }
}

fn encode_open_value<F>(encode: F) -> PerResult<Vec<u8>>
where
    F: FnOnce(&mut AperEncoder) -> PerResult<()>,
{
    let mut inner = AperEncoder::new();
    encode(&mut inner)?;
    inner.align();
    let mut value = inner.into_bytes().to_vec();
    if value.is_empty() {
        value.push(0);
    }
    Ok(value)
}

/// SEQUENCE (SIZE(min..max)) OF ProtocolIE-SingleContainer, all carrying `item_id`
fn encode_single_container_list<T: AperEncode>(
    encoder: &mut AperEncoder,
    item_id: u16,
    criticality: Criticality,
    items: &[T],
    min: usize,
    max: usize,
) -> PerResult<()> {
    encoder.encode_length(items.len(), min, max)?;
    for item in items {
        encoder.encode_constrained_whole_number(i64::from(item_id), &PROTOCOL_IE_ID)?;
        criticality.encode_aper(encoder)?;
        encoder.encode_open_type(|enc| item.encode_aper(enc))?;
    }
    Ok(())
}

fn decode_single_container_list<T: AperDecode>(
    decoder: &mut AperDecoder,
    item_id: u16,
    min: usize,
    max: usize,
) -> PerResult<Vec<T>> {
    let count = decoder.decode_length(min, max)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let id = decoder.decode_constrained_whole_number(&PROTOCOL_IE_ID)? as u16;
        if id != item_id {
            return Err(PerError::DecodeError(format!(
                "unexpected list item IE id {id}, expected {item_id}"
            )));
        }
        Criticality::decode_aper(decoder)?;
        items.push(decoder.decode_open_type(|dec| T::decode_aper(dec))?);
    }
    Ok(items)
}

fn encode_ran_function_id(encoder: &mut AperEncoder, id: RanFunctionId) -> PerResult<()> {
    encoder.encode_constrained_whole_number(i64::from(id), &RAN_FUNCTION_ID)
}

fn decode_ran_function_id(decoder: &mut AperDecoder) -> PerResult<RanFunctionId> {
    decoder
        .decode_constrained_whole_number(&RAN_FUNCTION_ID)
        .map(|v| v as u16)
}

fn encode_transaction_id(encoder: &mut AperEncoder, id: u8) -> PerResult<()> {
    encoder.encode_integer(i64::from(id), &TRANSACTION_ID)
}

fn decode_transaction_id(decoder: &mut AperDecoder) -> PerResult<u8> {
    let value = decoder.decode_integer(&TRANSACTION_ID)?;
    u8::try_from(value)
        .map_err(|_| PerError::DecodeError(format!("TransactionID {value} outside 0..255")))
}

fn encode_octets(encoder: &mut AperEncoder, octets: &[u8]) -> PerResult<()> {
    encoder.encode_octet_string(octets, None, None)
}

fn decode_octets(decoder: &mut AperDecoder) -> PerResult<Vec<u8>> {
    decoder.decode_octet_string(None, None)
}

/// An E2AP message body carried in a ProtocolIE-Container.
pub trait E2apMessage: Sized {
    /// Message name, used in diagnostics
    const NAME: &'static str;

    fn to_ies(&self) -> PerResult<ProtocolIeContainer>;

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self>;

    /// Constraints the IE encoders do not enforce themselves
    fn check_constraints(&self) -> Result<(), String> {
        Ok(())
    }
}

pub(crate) fn encode_message<M: E2apMessage>(encoder: &mut AperEncoder, msg: &M) -> PerResult<()> {
    encoder.encode_sequence_preamble(true, &[]);
    msg.to_ies()?.encode_aper(encoder)
}

pub(crate) fn decode_message<M: E2apMessage>(decoder: &mut AperDecoder) -> PerResult<M> {
    let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
    let ies = ProtocolIeContainer::decode_aper(decoder)?;
    if extended {
        decoder.skip_sequence_extensions()?;
    }
    M::from_ies(&ies)
}

/// RICsubscriptionDetails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicSubscriptionDetails {
    pub event_trigger_definition: Vec<u8>,
    pub actions: Vec<RicActionToBeSetupItem>,
}

impl AperEncode for RicSubscriptionDetails {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encode_octets(encoder, &self.event_trigger_definition)?;
        encode_single_container_list(
            encoder,
            ie_id::RIC_ACTION_TO_BE_SETUP_ITEM,
            Criticality::Ignore,
            &self.actions,
            1,
            MAX_OF_RIC_ACTION_ID,
        )
    }
}

impl AperDecode for RicSubscriptionDetails {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let event_trigger_definition = decode_octets(decoder)?;
        let actions = decode_single_container_list(
            decoder,
            ie_id::RIC_ACTION_TO_BE_SETUP_ITEM,
            1,
            MAX_OF_RIC_ACTION_ID,
        )?;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            event_trigger_definition,
            actions,
        })
    }
}

/// RICaction-Admitted-Item ::= SEQUENCE { ricActionID, ... }
struct RicActionAdmittedItem(RicActionId);

impl AperEncode for RicActionAdmittedItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_constrained_whole_number(i64::from(self.0), &RIC_ACTION_ID)
    }
}

impl AperDecode for RicActionAdmittedItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let id = decoder.decode_constrained_whole_number(&RIC_ACTION_ID)? as u8;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self(id))
    }
}

fn check_gnb_id(node: &GlobalE2NodeIdIe) -> Result<(), String> {
    let GlobalE2NodeIdIe::Gnb(gnb) = node;
    let bits = gnb.global_gnb_id.gnb_id;
    check_range("gNB ID length", bits.length, 22, 32)?;
    if bits.length < 32 && u64::from(bits.value) >> bits.length != 0 {
        return Err(format!(
            "gNB ID {} does not fit in {} bits",
            bits.value, bits.length
        ));
    }
    Ok(())
}

/// E2 SETUP REQUEST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2SetupRequest {
    pub transaction_id: u8,
    pub global_e2node_id: GlobalE2NodeIdIe,
    pub ran_functions_added: Vec<RanFunctionItem>,
    pub component_config_addition: Vec<E2NodeComponentConfigAdditionItem>,
}

impl E2apMessage for E2SetupRequest {
    const NAME: &'static str = "E2setupRequest";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        ies.push(ie_id::TRANSACTION_ID, Criticality::Reject, |e| {
            encode_transaction_id(e, self.transaction_id)
        })?;
        ies.push_value(ie_id::GLOBAL_E2NODE_ID, Criticality::Reject, &self.global_e2node_id)?;
        ies.push(ie_id::RAN_FUNCTIONS_ADDED, Criticality::Reject, |e| {
            encode_single_container_list(
                e,
                ie_id::RAN_FUNCTION_ITEM,
                Criticality::Ignore,
                &self.ran_functions_added,
                1,
                MAX_OF_RAN_FUNCTION_ID,
            )
        })?;
        ies.push(ie_id::E2NODE_COMPONENT_CONFIG_ADDITION, Criticality::Reject, |e| {
            encode_single_container_list(
                e,
                ie_id::E2NODE_COMPONENT_CONFIG_ADDITION_ITEM,
                Criticality::Reject,
                &self.component_config_addition,
                1,
                MAX_OF_E2_NODE_COMPONENTS,
            )
        })?;
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        Ok(Self {
            transaction_id: ies.require(ie_id::TRANSACTION_ID, "TransactionID", decode_transaction_id)?,
            global_e2node_id: ies.require_value(ie_id::GLOBAL_E2NODE_ID, "GlobalE2node-ID")?,
            ran_functions_added: ies.require(ie_id::RAN_FUNCTIONS_ADDED, "RANfunctionsAdded", |d| {
                decode_single_container_list(d, ie_id::RAN_FUNCTION_ITEM, 1, MAX_OF_RAN_FUNCTION_ID)
            })?,
            component_config_addition: ies
                .get(ie_id::E2NODE_COMPONENT_CONFIG_ADDITION, |d| {
                    decode_single_container_list(
                        d,
                        ie_id::E2NODE_COMPONENT_CONFIG_ADDITION_ITEM,
                        1,
                        MAX_OF_E2_NODE_COMPONENTS,
                    )
                })?
                .unwrap_or_default(),
        })
    }

    fn check_constraints(&self) -> Result<(), String> {
        check_gnb_id(&self.global_e2node_id)?;
        check_size("RANfunctionsAdded", self.ran_functions_added.len(), 1, MAX_OF_RAN_FUNCTION_ID)?;
        for function in &self.ran_functions_added {
            check_range("RANfunctionID", function.ran_function_id, 0, MAX_RAN_FUNCTION_ID)?;
            check_range("RANfunctionRevision", function.revision, 0, MAX_RAN_FUNCTION_REVISION)?;
            check_size("RANfunctionOID", function.oid.len(), 1, 1000)?;
        }
        check_size(
            "E2nodeComponentConfigAddition",
            self.component_config_addition.len(),
            1,
            MAX_OF_E2_NODE_COMPONENTS,
        )
    }
}

/// E2 SETUP RESPONSE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2SetupResponse {
    pub transaction_id: u8,
    pub global_ric_id: GlobalRicId,
    pub ran_functions_accepted: Vec<RanFunctionIdItem>,
    pub ran_functions_rejected: Vec<RanFunctionIdCauseItem>,
    pub component_config_addition_ack: Vec<E2NodeComponentConfigAdditionAckItem>,
}

impl E2apMessage for E2SetupResponse {
    const NAME: &'static str = "E2setupResponse";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        ies.push(ie_id::TRANSACTION_ID, Criticality::Reject, |e| {
            encode_transaction_id(e, self.transaction_id)
        })?;
        ies.push_value(ie_id::GLOBAL_RIC_ID, Criticality::Reject, &self.global_ric_id)?;
        if !self.ran_functions_accepted.is_empty() {
            ies.push(ie_id::RAN_FUNCTIONS_ACCEPTED, Criticality::Reject, |e| {
                encode_single_container_list(
                    e,
                    ie_id::RAN_FUNCTION_ID_ITEM,
                    Criticality::Ignore,
                    &self.ran_functions_accepted,
                    1,
                    MAX_OF_RAN_FUNCTION_ID,
                )
            })?;
        }
        if !self.ran_functions_rejected.is_empty() {
            ies.push(ie_id::RAN_FUNCTIONS_REJECTED, Criticality::Reject, |e| {
                encode_single_container_list(
                    e,
                    ie_id::RAN_FUNCTION_IE_CAUSE_ITEM,
                    Criticality::Ignore,
                    &self.ran_functions_rejected,
                    1,
                    MAX_OF_RAN_FUNCTION_ID,
                )
            })?;
        }
        if !self.component_config_addition_ack.is_empty() {
            ies.push(ie_id::E2NODE_COMPONENT_CONFIG_ADDITION_ACK, Criticality::Reject, |e| {
                encode_single_container_list(
                    e,
                    ie_id::E2NODE_COMPONENT_CONFIG_ADDITION_ACK_ITEM,
                    Criticality::Reject,
                    &self.component_config_addition_ack,
                    1,
                    MAX_OF_E2_NODE_COMPONENTS,
                )
            })?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        Ok(Self {
            transaction_id: ies.require(ie_id::TRANSACTION_ID, "TransactionID", decode_transaction_id)?,
            global_ric_id: ies.require_value(ie_id::GLOBAL_RIC_ID, "GlobalRIC-ID")?,
            ran_functions_accepted: ies
                .get(ie_id::RAN_FUNCTIONS_ACCEPTED, |d| {
                    decode_single_container_list(d, ie_id::RAN_FUNCTION_ID_ITEM, 1, MAX_OF_RAN_FUNCTION_ID)
                })?
                .unwrap_or_default(),
            ran_functions_rejected: ies
                .get(ie_id::RAN_FUNCTIONS_REJECTED, |d| {
                    decode_single_container_list(
                        d,
                        ie_id::RAN_FUNCTION_IE_CAUSE_ITEM,
                        1,
                        MAX_OF_RAN_FUNCTION_ID,
                    )
                })?
                .unwrap_or_default(),
            component_config_addition_ack: ies
                .get(ie_id::E2NODE_COMPONENT_CONFIG_ADDITION_ACK, |d| {
                    decode_single_container_list(
                        d,
                        ie_id::E2NODE_COMPONENT_CONFIG_ADDITION_ACK_ITEM,
                        1,
                        MAX_OF_E2_NODE_COMPONENTS,
                    )
                })?
                .unwrap_or_default(),
        })
    }

    fn check_constraints(&self) -> Result<(), String> {
        check_range("RIC ID", self.global_ric_id.ric_id, 0, 0xF_FFFF)?;
        check_size("RANfunctionsAccepted", self.ran_functions_accepted.len(), 0, MAX_OF_RAN_FUNCTION_ID)?;
        check_size("RANfunctionsRejected", self.ran_functions_rejected.len(), 0, MAX_OF_RAN_FUNCTION_ID)
    }
}

/// E2 SETUP FAILURE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2SetupFailure {
    pub transaction_id: u8,
    pub cause: Cause,
    pub time_to_wait: Option<TimeToWait>,
    pub criticality_diagnostics: Option<CriticalityDiagnostics>,
}

impl E2apMessage for E2SetupFailure {
    const NAME: &'static str = "E2setupFailure";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        ies.push(ie_id::TRANSACTION_ID, Criticality::Reject, |e| {
            encode_transaction_id(e, self.transaction_id)
        })?;
        ies.push_value(ie_id::CAUSE, Criticality::Ignore, &self.cause)?;
        if let Some(ttw) = &self.time_to_wait {
            ies.push_value(ie_id::TIME_TO_WAIT, Criticality::Ignore, ttw)?;
        }
        if let Some(diag) = &self.criticality_diagnostics {
            ies.push_value(ie_id::CRITICALITY_DIAGNOSTICS, Criticality::Ignore, diag)?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        Ok(Self {
            transaction_id: ies.require(ie_id::TRANSACTION_ID, "TransactionID", decode_transaction_id)?,
            cause: ies.require_value(ie_id::CAUSE, "Cause")?,
            time_to_wait: ies.get_value(ie_id::TIME_TO_WAIT)?,
            criticality_diagnostics: ies.get_value(ie_id::CRITICALITY_DIAGNOSTICS)?,
        })
    }
}

/// RIC SUBSCRIPTION REQUEST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicSubscriptionRequest {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub subscription_details: RicSubscriptionDetails,
}

impl E2apMessage for RicSubscriptionRequest {
    const NAME: &'static str = "RICsubscriptionRequest";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        ies.push_value(ie_id::RIC_REQUEST_ID, Criticality::Reject, &self.ric_request_id)?;
        ies.push(ie_id::RAN_FUNCTION_ID, Criticality::Reject, |e| {
            encode_ran_function_id(e, self.ran_function_id)
        })?;
        ies.push_value(
            ie_id::RIC_SUBSCRIPTION_DETAILS,
            Criticality::Reject,
            &self.subscription_details,
        )?;
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        Ok(Self {
            ric_request_id: ies.require_value(ie_id::RIC_REQUEST_ID, "RICrequestID")?,
            ran_function_id: ies.require(ie_id::RAN_FUNCTION_ID, "RANfunctionID", decode_ran_function_id)?,
            subscription_details: ies
                .require_value(ie_id::RIC_SUBSCRIPTION_DETAILS, "RICsubscriptionDetails")?,
        })
    }

    fn check_constraints(&self) -> Result<(), String> {
        check_range("RANfunctionID", self.ran_function_id, 0, MAX_RAN_FUNCTION_ID)?;
        check_size(
            "RICactions-ToBeSetup-List",
            self.subscription_details.actions.len(),
            1,
            MAX_OF_RIC_ACTION_ID,
        )
    }
}

/// RIC SUBSCRIPTION RESPONSE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicSubscriptionResponse {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub actions_admitted: Vec<RicActionId>,
    pub actions_not_admitted: Vec<RicActionNotAdmittedItem>,
}

impl E2apMessage for RicSubscriptionResponse {
    const NAME: &'static str = "RICsubscriptionResponse";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        ies.push_value(ie_id::RIC_REQUEST_ID, Criticality::Reject, &self.ric_request_id)?;
        ies.push(ie_id::RAN_FUNCTION_ID, Criticality::Reject, |e| {
            encode_ran_function_id(e, self.ran_function_id)
        })?;
        let admitted: Vec<_> = self
            .actions_admitted
            .iter()
            .map(|id| RicActionAdmittedItem(*id))
            .collect();
        ies.push(ie_id::RIC_ACTIONS_ADMITTED, Criticality::Reject, |e| {
            encode_single_container_list(
                e,
                ie_id::RIC_ACTION_ADMITTED_ITEM,
                Criticality::Ignore,
                &admitted,
                1,
                MAX_OF_RIC_ACTION_ID,
            )
        })?;
        if !self.actions_not_admitted.is_empty() {
            ies.push(ie_id::RIC_ACTIONS_NOT_ADMITTED, Criticality::Reject, |e| {
                encode_single_container_list(
                    e,
                    ie_id::RIC_ACTION_NOT_ADMITTED_ITEM,
                    Criticality::Ignore,
                    &self.actions_not_admitted,
                    0,
                    MAX_OF_RIC_ACTION_ID,
                )
            })?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        let admitted: Vec<RicActionAdmittedItem> =
            ies.require(ie_id::RIC_ACTIONS_ADMITTED, "RICactions-Admitted", |d| {
                decode_single_container_list(d, ie_id::RIC_ACTION_ADMITTED_ITEM, 1, MAX_OF_RIC_ACTION_ID)
            })?;
        Ok(Self {
            ric_request_id: ies.require_value(ie_id::RIC_REQUEST_ID, "RICrequestID")?,
            ran_function_id: ies.require(ie_id::RAN_FUNCTION_ID, "RANfunctionID", decode_ran_function_id)?,
            actions_admitted: admitted.into_iter().map(|item| item.0).collect(),
            actions_not_admitted: ies
                .get(ie_id::RIC_ACTIONS_NOT_ADMITTED, |d| {
                    decode_single_container_list(
                        d,
                        ie_id::RIC_ACTION_NOT_ADMITTED_ITEM,
                        0,
                        MAX_OF_RIC_ACTION_ID,
                    )
                })?
                .unwrap_or_default(),
        })
    }

    fn check_constraints(&self) -> Result<(), String> {
        check_range("RANfunctionID", self.ran_function_id, 0, MAX_RAN_FUNCTION_ID)?;
        check_size("RICactions-Admitted", self.actions_admitted.len(), 1, MAX_OF_RIC_ACTION_ID)?;
        check_size(
            "RICactions-NotAdmitted",
            self.actions_not_admitted.len(),
            0,
            MAX_OF_RIC_ACTION_ID,
        )
    }
}

/// RIC SUBSCRIPTION FAILURE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicSubscriptionFailure {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub cause: Cause,
    pub criticality_diagnostics: Option<CriticalityDiagnostics>,
}

impl E2apMessage for RicSubscriptionFailure {
    const NAME: &'static str = "RICsubscriptionFailure";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        ies.push_value(ie_id::RIC_REQUEST_ID, Criticality::Reject, &self.ric_request_id)?;
        ies.push(ie_id::RAN_FUNCTION_ID, Criticality::Reject, |e| {
            encode_ran_function_id(e, self.ran_function_id)
        })?;
        ies.push_value(ie_id::CAUSE, Criticality::Reject, &self.cause)?;
        if let Some(diag) = &self.criticality_diagnostics {
            ies.push_value(ie_id::CRITICALITY_DIAGNOSTICS, Criticality::Ignore, diag)?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        Ok(Self {
            ric_request_id: ies.require_value(ie_id::RIC_REQUEST_ID, "RICrequestID")?,
            ran_function_id: ies.require(ie_id::RAN_FUNCTION_ID, "RANfunctionID", decode_ran_function_id)?,
            cause: ies.require_value(ie_id::CAUSE, "Cause")?,
            criticality_diagnostics: ies.get_value(ie_id::CRITICALITY_DIAGNOSTICS)?,
        })
    }
}

/// RIC SUBSCRIPTION DELETE REQUEST
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RicSubscriptionDeleteRequest {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
}

impl E2apMessage for RicSubscriptionDeleteRequest {
    const NAME: &'static str = "RICsubscriptionDeleteRequest";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        request_and_function_ies(&self.ric_request_id, self.ran_function_id)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        let (ric_request_id, ran_function_id) = decode_request_and_function(ies)?;
        Ok(Self {
            ric_request_id,
            ran_function_id,
        })
    }
}

/// RIC SUBSCRIPTION DELETE RESPONSE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RicSubscriptionDeleteResponse {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
}

impl E2apMessage for RicSubscriptionDeleteResponse {
    const NAME: &'static str = "RICsubscriptionDeleteResponse";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        request_and_function_ies(&self.ric_request_id, self.ran_function_id)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        let (ric_request_id, ran_function_id) = decode_request_and_function(ies)?;
        Ok(Self {
            ric_request_id,
            ran_function_id,
        })
    }
}

fn request_and_function_ies(
    ric_request_id: &RicRequestId,
    ran_function_id: RanFunctionId,
) -> PerResult<ProtocolIeContainer> {
    let mut ies = ProtocolIeContainer::new();
    ies.push_value(ie_id::RIC_REQUEST_ID, Criticality::Reject, ric_request_id)?;
    ies.push(ie_id::RAN_FUNCTION_ID, Criticality::Reject, |e| {
        encode_ran_function_id(e, ran_function_id)
    })?;
    Ok(ies)
}

fn decode_request_and_function(ies: &ProtocolIeContainer) -> PerResult<(RicRequestId, RanFunctionId)> {
    Ok((
        ies.require_value(ie_id::RIC_REQUEST_ID, "RICrequestID")?,
        ies.require(ie_id::RAN_FUNCTION_ID, "RANfunctionID", decode_ran_function_id)?,
    ))
}

/// RIC SUBSCRIPTION DELETE FAILURE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicSubscriptionDeleteFailure {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub cause: Cause,
    pub criticality_diagnostics: Option<CriticalityDiagnostics>,
}

impl E2apMessage for RicSubscriptionDeleteFailure {
    const NAME: &'static str = "RICsubscriptionDeleteFailure";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = request_and_function_ies(&self.ric_request_id, self.ran_function_id)?;
        ies.push_value(ie_id::CAUSE, Criticality::Ignore, &self.cause)?;
        if let Some(diag) = &self.criticality_diagnostics {
            ies.push_value(ie_id::CRITICALITY_DIAGNOSTICS, Criticality::Ignore, diag)?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        let (ric_request_id, ran_function_id) = decode_request_and_function(ies)?;
        Ok(Self {
            ric_request_id,
            ran_function_id,
            cause: ies.require_value(ie_id::CAUSE, "Cause")?,
            criticality_diagnostics: ies.get_value(ie_id::CRITICALITY_DIAGNOSTICS)?,
        })
    }
}

/// RIC INDICATION
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicIndication {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub action_id: RicActionId,
    pub sequence_number: Option<u16>,
    pub indication_type: RicIndicationType,
    pub header: Vec<u8>,
    pub message: Vec<u8>,
    pub call_process_id: Option<Vec<u8>>,
}

impl E2apMessage for RicIndication {
    const NAME: &'static str = "RICindication";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = request_and_function_ies(&self.ric_request_id, self.ran_function_id)?;
        ies.push(ie_id::RIC_ACTION_ID, Criticality::Reject, |e| {
            e.encode_constrained_whole_number(i64::from(self.action_id), &RIC_ACTION_ID)
        })?;
        if let Some(sn) = self.sequence_number {
            ies.push(ie_id::RIC_INDICATION_SN, Criticality::Reject, |e| {
                e.encode_constrained_whole_number(i64::from(sn), &RIC_INDICATION_SN)
            })?;
        }
        ies.push_value(ie_id::RIC_INDICATION_TYPE, Criticality::Reject, &self.indication_type)?;
        ies.push(ie_id::RIC_INDICATION_HEADER, Criticality::Reject, |e| {
            encode_octets(e, &self.header)
        })?;
        ies.push(ie_id::RIC_INDICATION_MESSAGE, Criticality::Reject, |e| {
            encode_octets(e, &self.message)
        })?;
        if let Some(call_process_id) = &self.call_process_id {
            ies.push(ie_id::RIC_CALL_PROCESS_ID, Criticality::Reject, |e| {
                encode_octets(e, call_process_id)
            })?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        let (ric_request_id, ran_function_id) = decode_request_and_function(ies)?;
        Ok(Self {
            ric_request_id,
            ran_function_id,
            action_id: ies.require(ie_id::RIC_ACTION_ID, "RICactionID", |d| {
                d.decode_constrained_whole_number(&RIC_ACTION_ID).map(|v| v as u8)
            })?,
            sequence_number: ies.get(ie_id::RIC_INDICATION_SN, |d| {
                d.decode_constrained_whole_number(&RIC_INDICATION_SN).map(|v| v as u16)
            })?,
            indication_type: ies.require_value(ie_id::RIC_INDICATION_TYPE, "RICindicationType")?,
            header: ies.require(ie_id::RIC_INDICATION_HEADER, "RICindicationHeader", decode_octets)?,
            message: ies.require(ie_id::RIC_INDICATION_MESSAGE, "RICindicationMessage", decode_octets)?,
            call_process_id: ies.get(ie_id::RIC_CALL_PROCESS_ID, decode_octets)?,
        })
    }
}

/// RIC CONTROL REQUEST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicControlRequest {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub call_process_id: Option<Vec<u8>>,
    pub header: Vec<u8>,
    pub message: Vec<u8>,
    pub ack_request: Option<RicControlAckRequest>,
}

impl E2apMessage for RicControlRequest {
    const NAME: &'static str = "RICcontrolRequest";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = request_and_function_ies(&self.ric_request_id, self.ran_function_id)?;
        if let Some(call_process_id) = &self.call_process_id {
            ies.push(ie_id::RIC_CALL_PROCESS_ID, Criticality::Reject, |e| {
                encode_octets(e, call_process_id)
            })?;
        }
        ies.push(ie_id::RIC_CONTROL_HEADER, Criticality::Reject, |e| encode_octets(e, &self.header))?;
        ies.push(ie_id::RIC_CONTROL_MESSAGE, Criticality::Reject, |e| encode_octets(e, &self.message))?;
        if let Some(ack) = &self.ack_request {
            ies.push_value(ie_id::RIC_CONTROL_ACK_REQUEST, Criticality::Reject, ack)?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        let (ric_request_id, ran_function_id) = decode_request_and_function(ies)?;
        Ok(Self {
            ric_request_id,
            ran_function_id,
            call_process_id: ies.get(ie_id::RIC_CALL_PROCESS_ID, decode_octets)?,
            header: ies.require(ie_id::RIC_CONTROL_HEADER, "RICcontrolHeader", decode_octets)?,
            message: ies.require(ie_id::RIC_CONTROL_MESSAGE, "RICcontrolMessage", decode_octets)?,
            ack_request: ies.get_value(ie_id::RIC_CONTROL_ACK_REQUEST)?,
        })
    }
}

/// RIC CONTROL ACKNOWLEDGE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicControlAcknowledge {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub call_process_id: Option<Vec<u8>>,
    pub outcome: Option<Vec<u8>>,
}

impl E2apMessage for RicControlAcknowledge {
    const NAME: &'static str = "RICcontrolAcknowledge";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = request_and_function_ies(&self.ric_request_id, self.ran_function_id)?;
        if let Some(call_process_id) = &self.call_process_id {
            ies.push(ie_id::RIC_CALL_PROCESS_ID, Criticality::Reject, |e| {
                encode_octets(e, call_process_id)
            })?;
        }
        if let Some(outcome) = &self.outcome {
            ies.push(ie_id::RIC_CONTROL_OUTCOME, Criticality::Reject, |e| encode_octets(e, outcome))?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        let (ric_request_id, ran_function_id) = decode_request_and_function(ies)?;
        Ok(Self {
            ric_request_id,
            ran_function_id,
            call_process_id: ies.get(ie_id::RIC_CALL_PROCESS_ID, decode_octets)?,
            outcome: ies.get(ie_id::RIC_CONTROL_OUTCOME, decode_octets)?,
        })
    }
}

/// RIC CONTROL FAILURE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RicControlFailure {
    pub ric_request_id: RicRequestId,
    pub ran_function_id: RanFunctionId,
    pub call_process_id: Option<Vec<u8>>,
    pub cause: Cause,
    pub outcome: Option<Vec<u8>>,
}

impl E2apMessage for RicControlFailure {
    const NAME: &'static str = "RICcontrolFailure";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = request_and_function_ies(&self.ric_request_id, self.ran_function_id)?;
        if let Some(call_process_id) = &self.call_process_id {
            ies.push(ie_id::RIC_CALL_PROCESS_ID, Criticality::Reject, |e| {
                encode_octets(e, call_process_id)
            })?;
        }
        ies.push_value(ie_id::CAUSE, Criticality::Ignore, &self.cause)?;
        if let Some(outcome) = &self.outcome {
            ies.push(ie_id::RIC_CONTROL_OUTCOME, Criticality::Reject, |e| encode_octets(e, outcome))?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        let (ric_request_id, ran_function_id) = decode_request_and_function(ies)?;
        Ok(Self {
            ric_request_id,
            ran_function_id,
            call_process_id: ies.get(ie_id::RIC_CALL_PROCESS_ID, decode_octets)?,
            cause: ies.require_value(ie_id::CAUSE, "Cause")?,
            outcome: ies.get(ie_id::RIC_CONTROL_OUTCOME, decode_octets)?,
        })
    }
}

/// E2 REMOVAL REQUEST
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct E2RemovalRequest {
    pub transaction_id: u8,
}

impl E2apMessage for E2RemovalRequest {
    const NAME: &'static str = "E2RemovalRequest";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        ies.push(ie_id::TRANSACTION_ID, Criticality::Reject, |e| {
            encode_transaction_id(e, self.transaction_id)
        })?;
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        Ok(Self {
            transaction_id: ies.require(ie_id::TRANSACTION_ID, "TransactionID", decode_transaction_id)?,
        })
    }
}

/// E2 REMOVAL RESPONSE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2RemovalResponse {
    pub transaction_id: u8,
    pub criticality_diagnostics: Option<CriticalityDiagnostics>,
}

impl E2apMessage for E2RemovalResponse {
    const NAME: &'static str = "E2RemovalResponse";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        ies.push(ie_id::TRANSACTION_ID, Criticality::Reject, |e| {
            encode_transaction_id(e, self.transaction_id)
        })?;
        if let Some(diag) = &self.criticality_diagnostics {
            ies.push_value(ie_id::CRITICALITY_DIAGNOSTICS, Criticality::Ignore, diag)?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        Ok(Self {
            transaction_id: ies.require(ie_id::TRANSACTION_ID, "TransactionID", decode_transaction_id)?,
            criticality_diagnostics: ies.get_value(ie_id::CRITICALITY_DIAGNOSTICS)?,
        })
    }
}

/// E2 REMOVAL FAILURE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2RemovalFailure {
    pub transaction_id: u8,
    pub cause: Cause,
    pub criticality_diagnostics: Option<CriticalityDiagnostics>,
}

impl E2apMessage for E2RemovalFailure {
    const NAME: &'static str = "E2RemovalFailure";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        ies.push(ie_id::TRANSACTION_ID, Criticality::Reject, |e| {
            encode_transaction_id(e, self.transaction_id)
        })?;
        ies.push_value(ie_id::CAUSE, Criticality::Reject, &self.cause)?;
        if let Some(diag) = &self.criticality_diagnostics {
            ies.push_value(ie_id::CRITICALITY_DIAGNOSTICS, Criticality::Ignore, diag)?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        Ok(Self {
            transaction_id: ies.require(ie_id::TRANSACTION_ID, "TransactionID", decode_transaction_id)?,
            cause: ies.require_value(ie_id::CAUSE, "Cause")?,
            criticality_diagnostics: ies.get_value(ie_id::CRITICALITY_DIAGNOSTICS)?,
        })
    }
}

/// ERROR INDICATION
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorIndication {
    pub transaction_id: Option<u8>,
    pub ric_request_id: Option<RicRequestId>,
    pub ran_function_id: Option<RanFunctionId>,
    pub cause: Option<Cause>,
    pub criticality_diagnostics: Option<CriticalityDiagnostics>,
}

impl E2apMessage for ErrorIndication {
    const NAME: &'static str = "ErrorIndication";

    fn to_ies(&self) -> PerResult<ProtocolIeContainer> {
        let mut ies = ProtocolIeContainer::new();
        if let Some(id) = self.transaction_id {
            ies.push(ie_id::TRANSACTION_ID, Criticality::Ignore, |e| encode_transaction_id(e, id))?;
        }
        if let Some(id) = &self.ric_request_id {
            ies.push_value(ie_id::RIC_REQUEST_ID, Criticality::Ignore, id)?;
        }
        if let Some(id) = self.ran_function_id {
            ies.push(ie_id::RAN_FUNCTION_ID, Criticality::Ignore, |e| encode_ran_function_id(e, id))?;
        }
        if let Some(cause) = &self.cause {
            ies.push_value(ie_id::CAUSE, Criticality::Ignore, cause)?;
        }
        if let Some(diag) = &self.criticality_diagnostics {
            ies.push_value(ie_id::CRITICALITY_DIAGNOSTICS, Criticality::Ignore, diag)?;
        }
        Ok(ies)
    }

    fn from_ies(ies: &ProtocolIeContainer) -> PerResult<Self> {
        Ok(Self {
            transaction_id: ies.get(ie_id::TRANSACTION_ID, decode_transaction_id)?,
            ric_request_id: ies.get_value(ie_id::RIC_REQUEST_ID)?,
            ran_function_id: ies.get(ie_id::RAN_FUNCTION_ID, decode_ran_function_id)?,
            cause: ies.get_value(ie_id::CAUSE)?,
            criticality_diagnostics: ies.get_value(ie_id::CRITICALITY_DIAGNOSTICS)?,
        })
    }
}
