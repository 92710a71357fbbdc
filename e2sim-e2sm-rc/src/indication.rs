//! E2SM-RC Indication Header and Message

use e2sim_e2ap::codec::{check_size, AsnType};
use e2sim_e2ap::per::{
    decode_sequence_of, encode_sequence_of, AperDecode, AperDecoder, AperEncode, AperEncoder,
    PerError, PerResult,
};

use crate::event_trigger::{decode_condition_id, encode_condition_id, EventTriggerConditionId};
use crate::ran_parameter::{RanParameterItem, MAX_NO_OF_RAN_PARAMETERS};
use crate::ue_id::UeId;

/// maxnoofUEID
pub const MAX_NO_OF_UE_ID: usize = 65535;

const HEADER_FORMATS: usize = 1;
const MESSAGE_FORMATS: usize = 5;
const MESSAGE_FORMAT_2: usize = 1;

/// E2SM-RC-IndicationHeader (Format 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct E2smRcIndicationHeader {
    pub condition_id: Option<EventTriggerConditionId>,
}

impl E2smRcIndicationHeader {
    pub fn new(condition_id: Option<EventTriggerConditionId>) -> Self {
        Self { condition_id }
    }
}

impl AperEncode for E2smRcIndicationHeader {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_choice_index(0, HEADER_FORMATS, true)?;
        encoder.encode_sequence_preamble(true, &[self.condition_id.is_some()]);
        if let Some(id) = self.condition_id {
            encode_condition_id(encoder, id)?;
        }
        Ok(())
    }
}

impl AperDecode for E2smRcIndicationHeader {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        if decoder.decode_choice_index(HEADER_FORMATS, true)? != 0 {
            return Err(PerError::DecodeError(
                "only indication header format 1 is supported".to_string(),
            ));
        }
        let (format_ext, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let condition_id = if opt[0] {
            Some(decode_condition_id(decoder)?)
        } else {
            None
        };
        if format_ext {
            decoder.skip_sequence_extensions()?;
        }
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self { condition_id })
    }
}

impl AsnType for E2smRcIndicationHeader {
    const TYPE_NAME: &'static str = "E2SM-RC-IndicationHeader";

    fn check_constraints(&self) -> Result<(), String> {
        match self.condition_id {
            Some(0) => Err("ric-eventTriggerCondition-ID 0 out of range 1..65535".to_string()),
            _ => Ok(()),
        }
    }
}

/// E2SM-RC-IndicationMessage-Format2-Item: the RAN parameters of one UE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeParameterItem {
    pub ue_id: UeId,
    pub ran_parameters: Vec<RanParameterItem>,
}

impl AperEncode for UeParameterItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        self.ue_id.encode_aper(encoder)?;
        encode_sequence_of(encoder, &self.ran_parameters, 1, MAX_NO_OF_RAN_PARAMETERS)
    }
}

impl AperDecode for UeParameterItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let ue_id = UeId::decode_aper(decoder)?;
        let ran_parameters = decode_sequence_of(decoder, 1, MAX_NO_OF_RAN_PARAMETERS)?;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self { ue_id, ran_parameters })
    }
}

/// E2SM-RC-IndicationMessage (Format 2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2smRcIndicationMessage {
    pub ue_parameters: Vec<UeParameterItem>,
}

impl E2smRcIndicationMessage {
    /// Message reporting `ran_parameters` for a single UE
    pub fn single_ue(ue_id: UeId, ran_parameters: Vec<RanParameterItem>) -> Self {
        Self {
            ue_parameters: vec![UeParameterItem { ue_id, ran_parameters }],
        }
    }
}

impl AperEncode for E2smRcIndicationMessage {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_choice_index(MESSAGE_FORMAT_2, MESSAGE_FORMATS, true)?;
        encoder.encode_sequence_preamble(true, &[]);
        encode_sequence_of(encoder, &self.ue_parameters, 1, MAX_NO_OF_UE_ID)
    }
}

impl AperDecode for E2smRcIndicationMessage {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let index = decoder.decode_choice_index(MESSAGE_FORMATS, true)?;
        if index != MESSAGE_FORMAT_2 {
            return Err(PerError::DecodeError(format!(
                "indication message format {} is not supported",
                index + 1
            )));
        }
        let (format_ext, _) = decoder.decode_sequence_preamble(true, 0)?;
        let ue_parameters = decode_sequence_of(decoder, 1, MAX_NO_OF_UE_ID)?;
        if format_ext {
            decoder.skip_sequence_extensions()?;
        }
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self { ue_parameters })
    }
}

impl AsnType for E2smRcIndicationMessage {
    const TYPE_NAME: &'static str = "E2SM-RC-IndicationMessage";

    fn check_constraints(&self) -> Result<(), String> {
        check_size("ueParameter-List", self.ue_parameters.len(), 1, MAX_NO_OF_UE_ID)?;
        for item in &self.ue_parameters {
            check_size("ranP-List", item.ran_parameters.len(), 1, MAX_NO_OF_RAN_PARAMETERS)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ran_parameter::{RanParameterValue, RanParameterValueType};
    use crate::ue_id::GnbUeId;
    use e2sim_common::Imsi;
    use e2sim_e2ap::codec::{decode, encode, CodecError};

    fn ue() -> UeId {
        UeId::Gnb(GnbUeId::from_imsi(&Imsi::parse("111110000000001", 3).unwrap()).unwrap())
    }

    #[test]
    fn test_header_roundtrip() {
        for header in [E2smRcIndicationHeader::new(Some(5)), E2smRcIndicationHeader::default()] {
            let decoded: E2smRcIndicationHeader = decode(&encode(&header).unwrap()).unwrap();
            assert_eq!(decoded, header);
        }
    }

    #[test]
    fn test_message_roundtrip() {
        let message = E2smRcIndicationMessage::single_ue(
            ue(),
            vec![RanParameterItem::new(
                202,
                RanParameterValueType::ElementFalse(Some(RanParameterValue::Int(0))),
            )],
        );
        let decoded: E2smRcIndicationMessage = decode(&encode(&message).unwrap()).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.ue_parameters[0].ue_id.gnb().amf_ue_ngap_id, 1);
    }

    #[test]
    fn test_message_without_parameters_rejected() {
        let message = E2smRcIndicationMessage::single_ue(ue(), Vec::new());
        assert!(matches!(
            encode(&message),
            Err(CodecError::ConstraintViolation { .. })
        ));
    }
}
