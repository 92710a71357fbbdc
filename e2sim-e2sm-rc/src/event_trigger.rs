//! E2SM-RC Event Trigger Definition
//!
//! Only Format 4 (UE information change) is carried. Within a Format 4 item
//! the RRC-state and UE-ID-change trigger types decode; L2 state and
//! associated UE info are rejected.

use e2sim_e2ap::asn_enumerated;
use e2sim_e2ap::codec::{check_range, check_size, AsnType};
use e2sim_e2ap::per::{
    decode_sequence_of, encode_sequence_of, AperDecode, AperDecoder, AperEncode, AperEncoder,
    Constraint, PerError, PerResult,
};

/// RIC-EventTriggerCondition-ID, INTEGER (1..65535, ...)
pub type EventTriggerConditionId = u16;

pub(crate) const EVENT_TRIGGER_CONDITION_ID: Constraint = Constraint::extensible(1, 65535);
const UE_ID_CHANGE_ID: Constraint = Constraint::extensible(1, 512);

pub const MAX_NO_OF_UE_INFO_CHANGES: usize = 65535;
pub const MAX_NO_OF_RRC_STATES: usize = 8;

const EVENT_TRIGGER_FORMATS: usize = 5;
const FORMAT_4: usize = 3;
const TRIGGER_TYPE_ALTERNATIVES: usize = 3;

asn_enumerated! {
    /// RRC-State
    pub enum RrcState (extensible = true) {
        RrcConnected,
        RrcInactive,
        RrcIdle,
        Any,
    }
}

asn_enumerated! {
    /// LogicalOR
    pub enum LogicalOr (extensible = true) {
        True,
        False,
    }
}

pub(crate) fn encode_condition_id(encoder: &mut AperEncoder, id: EventTriggerConditionId) -> PerResult<()> {
    encoder.encode_integer(i64::from(id), &EVENT_TRIGGER_CONDITION_ID)
}

pub(crate) fn decode_condition_id(decoder: &mut AperDecoder) -> PerResult<EventTriggerConditionId> {
    let value = decoder.decode_integer(&EVENT_TRIGGER_CONDITION_ID)?;
    EventTriggerConditionId::try_from(value)
        .map_err(|_| PerError::DecodeError(format!("RIC-EventTriggerCondition-ID {value} out of range")))
}

/// TriggerType-Choice-RRCstate-Item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrcStateItem {
    pub state_changed_to: RrcState,
    pub logical_or: Option<LogicalOr>,
}

impl AperEncode for RrcStateItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.logical_or.is_some()]);
        self.state_changed_to.encode_aper(encoder)?;
        if let Some(or) = &self.logical_or {
            or.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for RrcStateItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let state_changed_to = RrcState::decode_aper(decoder)?;
        let logical_or = if opt[0] {
            Some(LogicalOr::decode_aper(decoder)?)
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            state_changed_to,
            logical_or,
        })
    }
}

/// TriggerType-Choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerType {
    RrcState(Vec<RrcStateItem>),
    UeIdChange(u16),
}

impl AperEncode for TriggerType {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            TriggerType::RrcState(items) => {
                encoder.encode_choice_index(0, TRIGGER_TYPE_ALTERNATIVES, true)?;
                encoder.encode_sequence_preamble(true, &[]);
                encode_sequence_of(encoder, items, 1, MAX_NO_OF_RRC_STATES)
            }
            TriggerType::UeIdChange(id) => {
                encoder.encode_choice_index(1, TRIGGER_TYPE_ALTERNATIVES, true)?;
                encoder.encode_sequence_preamble(true, &[]);
                encoder.encode_integer(i64::from(*id), &UE_ID_CHANGE_ID)
            }
        }
    }
}

impl AperDecode for TriggerType {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let index = decoder.decode_choice_index(TRIGGER_TYPE_ALTERNATIVES, true)?;
        let (extended, trigger) = match index {
            0 => {
                let (ext, _) = decoder.decode_sequence_preamble(true, 0)?;
                let items = decode_sequence_of(decoder, 1, MAX_NO_OF_RRC_STATES)?;
                (ext, TriggerType::RrcState(items))
            }
            1 => {
                let (ext, _) = decoder.decode_sequence_preamble(true, 0)?;
                let id = decoder.decode_integer(&UE_ID_CHANGE_ID)?;
                let id = u16::try_from(id)
                    .map_err(|_| PerError::DecodeError(format!("ueIDchange-ID {id} out of range")))?;
                (ext, TriggerType::UeIdChange(id))
            }
            2 => {
                return Err(PerError::DecodeError(
                    "L2 state trigger type is not supported".to_string(),
                ))
            }
            _ => return Err(PerError::UnsupportedExtension),
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(trigger)
    }
}

/// E2SM-RC-EventTrigger-Format4-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeInfoChangeItem {
    pub condition_id: EventTriggerConditionId,
    pub trigger_type: TriggerType,
    pub logical_or: Option<LogicalOr>,
}

impl AperEncode for UeInfoChangeItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        // associatedUEInfo is never sent
        encoder.encode_sequence_preamble(true, &[false, self.logical_or.is_some()]);
        encode_condition_id(encoder, self.condition_id)?;
        self.trigger_type.encode_aper(encoder)?;
        if let Some(or) = &self.logical_or {
            or.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for UeInfoChangeItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 2)?;
        let condition_id = decode_condition_id(decoder)?;
        let trigger_type = TriggerType::decode_aper(decoder)?;
        if opt[0] {
            return Err(PerError::DecodeError(
                "associatedUEInfo is not supported".to_string(),
            ));
        }
        let logical_or = if opt[1] {
            Some(LogicalOr::decode_aper(decoder)?)
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            condition_id,
            trigger_type,
            logical_or,
        })
    }
}

/// E2SM-RC-EventTrigger-Format4
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTriggerFormat4 {
    pub ue_info_changes: Vec<UeInfoChangeItem>,
}

/// E2SM-RC-EventTrigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum E2smRcEventTrigger {
    Format4(EventTriggerFormat4),
}

impl E2smRcEventTrigger {
    /// Format number as advertised in the RAN function definition (1-based)
    pub fn format(&self) -> u8 {
        match self {
            E2smRcEventTrigger::Format4(_) => 4,
        }
    }
}

impl AperEncode for E2smRcEventTrigger {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        match self {
            E2smRcEventTrigger::Format4(format4) => {
                encoder.encode_choice_index(FORMAT_4, EVENT_TRIGGER_FORMATS, true)?;
                encoder.encode_sequence_preamble(true, &[]);
                encode_sequence_of(encoder, &format4.ue_info_changes, 1, MAX_NO_OF_UE_INFO_CHANGES)
            }
        }
    }
}

impl AperDecode for E2smRcEventTrigger {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let index = decoder.decode_choice_index(EVENT_TRIGGER_FORMATS, true)?;
        if index != FORMAT_4 {
            return Err(PerError::DecodeError(format!(
                "event trigger format {} is not supported",
                index + 1
            )));
        }
        let (format_ext, _) = decoder.decode_sequence_preamble(true, 0)?;
        let ue_info_changes = decode_sequence_of(decoder, 1, MAX_NO_OF_UE_INFO_CHANGES)?;
        if format_ext {
            decoder.skip_sequence_extensions()?;
        }
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(E2smRcEventTrigger::Format4(EventTriggerFormat4 { ue_info_changes }))
    }
}

impl AsnType for E2smRcEventTrigger {
    const TYPE_NAME: &'static str = "E2SM-RC-EventTrigger";

    fn check_constraints(&self) -> Result<(), String> {
        let E2smRcEventTrigger::Format4(format4) = self;
        check_size("uEInfoChange-List", format4.ue_info_changes.len(), 1, MAX_NO_OF_UE_INFO_CHANGES)?;
        for item in &format4.ue_info_changes {
            check_range("ric-eventTriggerCondition-ID", item.condition_id, 1, u16::MAX)?;
            match &item.trigger_type {
                TriggerType::RrcState(states) => {
                    check_size("rrcState-List", states.len(), 1, MAX_NO_OF_RRC_STATES)?
                }
                TriggerType::UeIdChange(id) => check_range("ueIDchange-ID", *id, 1, 512)?,
            }
        }
        Ok(())
    }
}
