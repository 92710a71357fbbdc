//! E2SM-RC Action Definition

use e2sim_e2ap::codec::{check_size, AsnType};
use e2sim_e2ap::per::{
    decode_sequence_of, encode_sequence_of, AperDecode, AperDecoder, AperEncode, AperEncoder,
    PerError, PerResult,
};

use crate::ran_parameter::{
    decode_ran_parameter_id, encode_ran_parameter_id, RanParameterDefinition, RanParameterId,
    MAX_NO_OF_RAN_PARAMETERS,
};

/// RIC-Style-Type, unconstrained INTEGER
pub type RicStyleType = i64;

const ACTION_DEFINITION_FORMATS: usize = 3;

/// E2SM-RC-ActionDefinition-Format1-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanParameterToBeReported {
    pub id: RanParameterId,
    pub definition: Option<RanParameterDefinition>,
}

impl RanParameterToBeReported {
    pub fn new(id: RanParameterId) -> Self {
        Self { id, definition: None }
    }
}

impl AperEncode for RanParameterToBeReported {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.definition.is_some()]);
        encode_ran_parameter_id(encoder, self.id)?;
        if let Some(definition) = &self.definition {
            definition.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for RanParameterToBeReported {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let id = decode_ran_parameter_id(decoder)?;
        let definition = if opt[0] {
            Some(RanParameterDefinition::decode_aper(decoder)?)
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self { id, definition })
    }
}

/// E2SM-RC-ActionDefinition-Format1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDefinitionFormat1 {
    pub ran_parameters: Vec<RanParameterToBeReported>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDefinitionFormat {
    Format1(ActionDefinitionFormat1),
}

/// E2SM-RC-ActionDefinition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2smRcActionDefinition {
    pub style_type: RicStyleType,
    pub format: ActionDefinitionFormat,
}

impl E2smRcActionDefinition {
    pub fn format1(style_type: RicStyleType, ran_parameters: Vec<RanParameterToBeReported>) -> Self {
        Self {
            style_type,
            format: ActionDefinitionFormat::Format1(ActionDefinitionFormat1 { ran_parameters }),
        }
    }

    /// Format number (1-based)
    pub fn format_id(&self) -> u8 {
        match self.format {
            ActionDefinitionFormat::Format1(_) => 1,
        }
    }
}

impl AperEncode for E2smRcActionDefinition {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_unconstrained_whole_number(self.style_type)?;
        match &self.format {
            ActionDefinitionFormat::Format1(format1) => {
                encoder.encode_choice_index(0, ACTION_DEFINITION_FORMATS, true)?;
                encoder.encode_sequence_preamble(true, &[]);
                encode_sequence_of(encoder, &format1.ran_parameters, 1, MAX_NO_OF_RAN_PARAMETERS)
            }
        }
    }
}

impl AperDecode for E2smRcActionDefinition {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let style_type = decoder.decode_unconstrained_whole_number()?;
        let index = decoder.decode_choice_index(ACTION_DEFINITION_FORMATS, true)?;
        if index != 0 {
            return Err(PerError::DecodeError(format!(
                "action definition format {} is not supported",
                index + 1
            )));
        }
        let (format_ext, _) = decoder.decode_sequence_preamble(true, 0)?;
        let ran_parameters = decode_sequence_of(decoder, 1, MAX_NO_OF_RAN_PARAMETERS)?;
        if format_ext {
            decoder.skip_sequence_extensions()?;
        }
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self::format1(style_type, ran_parameters))
    }
}

impl AsnType for E2smRcActionDefinition {
    const TYPE_NAME: &'static str = "E2SM-RC-ActionDefinition";

    fn check_constraints(&self) -> Result<(), String> {
        let ActionDefinitionFormat::Format1(format1) = &self.format;
        check_size(
            "ranP-ToBeReported-List",
            format1.ran_parameters.len(),
            1,
            MAX_NO_OF_RAN_PARAMETERS,
        )
    }
}
