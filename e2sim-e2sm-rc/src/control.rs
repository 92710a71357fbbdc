//! E2SM-RC Control Header and Message

use e2sim_e2ap::asn_enumerated;
use e2sim_e2ap::codec::{check_range, check_size, AsnType};
use e2sim_e2ap::per::{
    decode_sequence_of, encode_sequence_of, AperDecode, AperDecoder, AperEncode, AperEncoder,
    Constraint, PerError, PerResult,
};

use crate::action_definition::RicStyleType;
use crate::ran_parameter::{find_ran_parameter, RanParameterId, RanParameterItem, RanParameterValueType, MAX_NO_OF_RAN_PARAMETERS};
use crate::ue_id::UeId;

/// RIC-ControlAction-ID, INTEGER (1..65535, ...)
pub type ControlActionId = u16;

pub(crate) const CONTROL_ACTION_ID: Constraint = Constraint::extensible(1, 65535);
const HEADER_FORMATS: usize = 1;
const MESSAGE_FORMATS: usize = 1;

asn_enumerated! {
    /// ric-ControlDecision
    pub enum ControlDecision (extensible = true) {
        Accept,
        Reject,
    }
}

/// E2SM-RC-ControlHeader (Format 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2smRcControlHeader {
    pub ue_id: UeId,
    pub style_type: RicStyleType,
    pub control_action_id: ControlActionId,
    pub decision: Option<ControlDecision>,
}

impl AperEncode for E2smRcControlHeader {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_choice_index(0, HEADER_FORMATS, true)?;
        encoder.encode_sequence_preamble(true, &[self.decision.is_some()]);
        self.ue_id.encode_aper(encoder)?;
        encoder.encode_unconstrained_whole_number(self.style_type)?;
        encoder.encode_integer(i64::from(self.control_action_id), &CONTROL_ACTION_ID)?;
        if let Some(decision) = &self.decision {
            decision.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for E2smRcControlHeader {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        if decoder.decode_choice_index(HEADER_FORMATS, true)? != 0 {
            return Err(PerError::DecodeError(
                "only control header format 1 is supported".to_string(),
            ));
        }
        let (format_ext, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let ue_id = UeId::decode_aper(decoder)?;
        let style_type = decoder.decode_unconstrained_whole_number()?;
        let action = decoder.decode_integer(&CONTROL_ACTION_ID)?;
        let control_action_id = ControlActionId::try_from(action)
            .map_err(|_| PerError::DecodeError(format!("ric-ControlAction-ID {action} out of range")))?;
        let decision = if opt[0] {
            Some(ControlDecision::decode_aper(decoder)?)
        } else {
            None
        };
        if format_ext {
            decoder.skip_sequence_extensions()?;
        }
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            ue_id,
            style_type,
            control_action_id,
            decision,
        })
    }
}

impl AsnType for E2smRcControlHeader {
    const TYPE_NAME: &'static str = "E2SM-RC-ControlHeader";

    fn check_constraints(&self) -> Result<(), String> {
        check_range("ric-ControlAction-ID", self.control_action_id, 1, u16::MAX)
    }
}

/// E2SM-RC-ControlMessage (Format 1)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct E2smRcControlMessage {
    pub ran_parameters: Vec<RanParameterItem>,
}

impl E2smRcControlMessage {
    pub fn new(ran_parameters: Vec<RanParameterItem>) -> Self {
        Self { ran_parameters }
    }

    /// Looks `id` up anywhere in the parameter hierarchy.
    pub fn find(&self, id: RanParameterId) -> Option<&RanParameterValueType> {
        find_ran_parameter(&self.ran_parameters, id)
    }
}

impl AperEncode for E2smRcControlMessage {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_choice_index(0, MESSAGE_FORMATS, true)?;
        encoder.encode_sequence_preamble(true, &[]);
        encode_sequence_of(encoder, &self.ran_parameters, 0, MAX_NO_OF_RAN_PARAMETERS)
    }
}

impl AperDecode for E2smRcControlMessage {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        if decoder.decode_choice_index(MESSAGE_FORMATS, true)? != 0 {
            return Err(PerError::DecodeError(
                "only control message format 1 is supported".to_string(),
            ));
        }
        let (format_ext, _) = decoder.decode_sequence_preamble(true, 0)?;
        let ran_parameters = decode_sequence_of(decoder, 0, MAX_NO_OF_RAN_PARAMETERS)?;
        if format_ext {
            decoder.skip_sequence_extensions()?;
        }
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self { ran_parameters })
    }
}

impl AsnType for E2smRcControlMessage {
    const TYPE_NAME: &'static str = "E2SM-RC-ControlMessage";

    fn check_constraints(&self) -> Result<(), String> {
        check_size("ranP-List", self.ran_parameters.len(), 0, MAX_NO_OF_RAN_PARAMETERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ran_parameter::{RanParameterStructure, RanParameterValue};
    use crate::ue_id::GnbUeId;
    use e2sim_common::Imsi;
    use e2sim_e2ap::codec::{decode, encode};

    #[test]
    fn test_header_roundtrip() {
        let header = E2smRcControlHeader {
            ue_id: UeId::Gnb(GnbUeId::from_imsi(&Imsi::parse("111110000000002", 3).unwrap()).unwrap()),
            style_type: 3,
            control_action_id: 1,
            decision: Some(ControlDecision::Accept),
        };
        let decoded: E2smRcControlHeader = decode(&encode(&header).unwrap()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_message_find_nested_cgi() {
        let message = E2smRcControlMessage::new(vec![RanParameterItem::new(
            1,
            RanParameterValueType::Structure(RanParameterStructure::new(vec![RanParameterItem::new(
                4,
                RanParameterValueType::ElementTrue(RanParameterValue::OctetString(vec![0xAA, 0xBB])),
            )])),
        )]);
        let decoded: E2smRcControlMessage = decode(&encode(&message).unwrap()).unwrap();
        let cgi = decoded
            .find(4)
            .and_then(|v| v.element_value())
            .and_then(|v| v.as_octets());
        assert_eq!(cgi, Some(&[0xAA, 0xBB][..]));
    }

    #[test]
    fn test_empty_message_allowed() {
        let message = E2smRcControlMessage::default();
        let decoded: E2smRcControlMessage = decode(&encode(&message).unwrap()).unwrap();
        assert!(decoded.ran_parameters.is_empty());
    }
}
