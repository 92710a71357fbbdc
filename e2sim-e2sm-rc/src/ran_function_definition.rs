//! E2SM-RC RAN Function Definition
//!
//! The capability description a node embeds in E2setupRequest for its RC RAN
//! function: the function name plus the event-trigger, report and control
//! styles it supports. Insert and Policy styles are never advertised.

use e2sim_e2ap::codec::{check_size, AsnType};
use e2sim_e2ap::per::{
    decode_sequence_of, encode_sequence_of, AperDecode, AperDecoder, AperEncode, AperEncoder,
    PerError, PerResult,
};

use crate::action_definition::RicStyleType;
use crate::control::{ControlActionId, CONTROL_ACTION_ID};
use crate::ran_parameter::{
    decode_name, decode_ran_parameter_id, encode_name, encode_ran_parameter_id,
    RanParameterDefinition, RanParameterId, MAX_NO_OF_RAN_PARAMETERS,
};

/// RIC-Format-Type, unconstrained INTEGER
pub type RicFormatType = i64;

/// maxnoofRICStyles
pub const MAX_NO_OF_RIC_STYLES: usize = 63;
/// maxnoofControlAction
pub const MAX_NO_OF_CONTROL_ACTIONS: usize = 65535;

/// RANfunction-Name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanFunctionName {
    pub short_name: String,
    pub oid: String,
    pub description: String,
    pub instance: Option<i64>,
}

impl AperEncode for RanFunctionName {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.instance.is_some()]);
        encoder.encode_printable_string(&self.short_name, 1, 150, true)?;
        encoder.encode_printable_string(&self.oid, 1, 1000, true)?;
        encoder.encode_printable_string(&self.description, 1, 150, true)?;
        if let Some(instance) = self.instance {
            encoder.encode_unconstrained_whole_number(instance)?;
        }
        Ok(())
    }
}

impl AperDecode for RanFunctionName {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let short_name = decoder.decode_printable_string(1, 150, true)?;
        let oid = decoder.decode_printable_string(1, 1000, true)?;
        let description = decoder.decode_printable_string(1, 150, true)?;
        let instance = if opt[0] {
            Some(decoder.decode_unconstrained_whole_number()?)
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            short_name,
            oid,
            description,
            instance,
        })
    }
}

/// RANFunctionDefinition-EventTrigger-Style-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTriggerStyleItem {
    pub style_type: RicStyleType,
    pub name: String,
    pub format_type: RicFormatType,
}

impl AperEncode for EventTriggerStyleItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encoder.encode_unconstrained_whole_number(self.style_type)?;
        encode_name(encoder, &self.name)?;
        encoder.encode_unconstrained_whole_number(self.format_type)
    }
}

impl AperDecode for EventTriggerStyleItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let style_type = decoder.decode_unconstrained_whole_number()?;
        let name = decode_name(decoder)?;
        let format_type = decoder.decode_unconstrained_whole_number()?;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            style_type,
            name,
            format_type,
        })
    }
}

/// `{ ranParameter-ID, ranParameter-name, ranParameter-Definition OPTIONAL }`,
/// the shape of Report-RANParameter-Item and ControlAction-RANParameter-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanParameterDescription {
    pub id: RanParameterId,
    pub name: String,
    pub definition: Option<RanParameterDefinition>,
}

impl AperEncode for RanParameterDescription {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[self.definition.is_some()]);
        encode_ran_parameter_id(encoder, self.id)?;
        encode_name(encoder, &self.name)?;
        if let Some(definition) = &self.definition {
            definition.encode_aper(encoder)?;
        }
        Ok(())
    }
}

impl AperDecode for RanParameterDescription {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let id = decode_ran_parameter_id(decoder)?;
        let name = decode_name(decoder)?;
        let definition = if opt[0] {
            Some(RanParameterDefinition::decode_aper(decoder)?)
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self { id, name, definition })
    }
}

fn encode_optional_list<T: AperEncode>(encoder: &mut AperEncoder, items: &[T], max: usize) -> PerResult<()> {
    if items.is_empty() {
        return Ok(());
    }
    encode_sequence_of(encoder, items, 1, max)
}

fn decode_optional_list<T: AperDecode>(decoder: &mut AperDecoder, present: bool, max: usize) -> PerResult<Vec<T>> {
    if present {
        decode_sequence_of(decoder, 1, max)
    } else {
        Ok(Vec::new())
    }
}

/// RANFunctionDefinition-Report-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStyleItem {
    pub style_type: RicStyleType,
    pub name: String,
    pub supported_event_trigger_style: RicStyleType,
    pub action_format_type: RicFormatType,
    pub indication_header_format_type: RicFormatType,
    pub indication_message_format_type: RicFormatType,
    pub parameters: Vec<RanParameterDescription>,
}

impl AperEncode for ReportStyleItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[!self.parameters.is_empty()]);
        encoder.encode_unconstrained_whole_number(self.style_type)?;
        encode_name(encoder, &self.name)?;
        encoder.encode_unconstrained_whole_number(self.supported_event_trigger_style)?;
        encoder.encode_unconstrained_whole_number(self.action_format_type)?;
        encoder.encode_unconstrained_whole_number(self.indication_header_format_type)?;
        encoder.encode_unconstrained_whole_number(self.indication_message_format_type)?;
        encode_optional_list(encoder, &self.parameters, MAX_NO_OF_RAN_PARAMETERS)
    }
}

impl AperDecode for ReportStyleItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let item = Self {
            style_type: decoder.decode_unconstrained_whole_number()?,
            name: decode_name(decoder)?,
            supported_event_trigger_style: decoder.decode_unconstrained_whole_number()?,
            action_format_type: decoder.decode_unconstrained_whole_number()?,
            indication_header_format_type: decoder.decode_unconstrained_whole_number()?,
            indication_message_format_type: decoder.decode_unconstrained_whole_number()?,
            parameters: decode_optional_list(decoder, opt[0], MAX_NO_OF_RAN_PARAMETERS)?,
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(item)
    }
}

/// RANFunctionDefinition-Control-Action-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlActionItem {
    pub action_id: ControlActionId,
    pub name: String,
    pub parameters: Vec<RanParameterDescription>,
}

impl AperEncode for ControlActionItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[!self.parameters.is_empty()]);
        encoder.encode_integer(i64::from(self.action_id), &CONTROL_ACTION_ID)?;
        encode_name(encoder, &self.name)?;
        encode_optional_list(encoder, &self.parameters, MAX_NO_OF_RAN_PARAMETERS)
    }
}

impl AperDecode for ControlActionItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let action = decoder.decode_integer(&CONTROL_ACTION_ID)?;
        let action_id = ControlActionId::try_from(action)
            .map_err(|_| PerError::DecodeError(format!("ric-ControlAction-ID {action} out of range")))?;
        let name = decode_name(decoder)?;
        let parameters = decode_optional_list(decoder, opt[0], MAX_NO_OF_RAN_PARAMETERS)?;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            action_id,
            name,
            parameters,
        })
    }
}

/// RANFunctionDefinition-Control-Item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlStyleItem {
    pub style_type: RicStyleType,
    pub name: String,
    pub actions: Vec<ControlActionItem>,
    pub header_format_type: RicFormatType,
    pub message_format_type: RicFormatType,
    pub call_process_id_format_type: Option<RicFormatType>,
    pub outcome_format_type: RicFormatType,
}

impl AperEncode for ControlStyleItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        // ran-ControlOutcomeParameters-List is never advertised
        encoder.encode_sequence_preamble(
            true,
            &[!self.actions.is_empty(), self.call_process_id_format_type.is_some(), false],
        );
        encoder.encode_unconstrained_whole_number(self.style_type)?;
        encode_name(encoder, &self.name)?;
        encode_optional_list(encoder, &self.actions, MAX_NO_OF_CONTROL_ACTIONS)?;
        encoder.encode_unconstrained_whole_number(self.header_format_type)?;
        encoder.encode_unconstrained_whole_number(self.message_format_type)?;
        if let Some(format) = self.call_process_id_format_type {
            encoder.encode_unconstrained_whole_number(format)?;
        }
        encoder.encode_unconstrained_whole_number(self.outcome_format_type)
    }
}

impl AperDecode for ControlStyleItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 3)?;
        let style_type = decoder.decode_unconstrained_whole_number()?;
        let name = decode_name(decoder)?;
        let actions = decode_optional_list(decoder, opt[0], MAX_NO_OF_CONTROL_ACTIONS)?;
        let header_format_type = decoder.decode_unconstrained_whole_number()?;
        let message_format_type = decoder.decode_unconstrained_whole_number()?;
        let call_process_id_format_type = if opt[1] {
            Some(decoder.decode_unconstrained_whole_number()?)
        } else {
            None
        };
        let outcome_format_type = decoder.decode_unconstrained_whole_number()?;
        if opt[2] {
            return Err(PerError::DecodeError(
                "ran-ControlOutcomeParameters-List is not supported".to_string(),
            ));
        }
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            style_type,
            name,
            actions,
            header_format_type,
            message_format_type,
            call_process_id_format_type,
            outcome_format_type,
        })
    }
}

/// E2SM-RC-RANFunctionDefinition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E2smRcRanFunctionDefinition {
    pub name: RanFunctionName,
    pub event_trigger_styles: Vec<EventTriggerStyleItem>,
    pub report_styles: Vec<ReportStyleItem>,
    pub control_styles: Vec<ControlStyleItem>,
}

impl E2smRcRanFunctionDefinition {
    pub fn new(name: RanFunctionName) -> Self {
        Self {
            name,
            event_trigger_styles: Vec::new(),
            report_styles: Vec::new(),
            control_styles: Vec::new(),
        }
    }
}

/// Wraps a style list in its single-member SEQUENCE
fn encode_style_section<T: AperEncode>(encoder: &mut AperEncoder, styles: &[T], optionals: usize) -> PerResult<()> {
    encoder.encode_sequence_preamble(true, &vec![false; optionals]);
    encode_sequence_of(encoder, styles, 1, MAX_NO_OF_RIC_STYLES)
}

fn decode_style_section<T: AperDecode>(decoder: &mut AperDecoder, optionals: usize) -> PerResult<Vec<T>> {
    let (extended, opt) = decoder.decode_sequence_preamble(true, optionals)?;
    let styles = decode_sequence_of(decoder, 1, MAX_NO_OF_RIC_STYLES)?;
    if opt.iter().any(|present| *present) {
        return Err(PerError::DecodeError(
            "event trigger parameter lists are not supported".to_string(),
        ));
    }
    if extended {
        decoder.skip_sequence_extensions()?;
    }
    Ok(styles)
}

/// Optional lists of RANFunctionDefinition-EventTrigger after the style list
const EVENT_TRIGGER_SECTION_OPTIONALS: usize = 4;

impl AperEncode for E2smRcRanFunctionDefinition {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(
            true,
            &[
                !self.event_trigger_styles.is_empty(),
                !self.report_styles.is_empty(),
                false,
                !self.control_styles.is_empty(),
                false,
            ],
        );
        self.name.encode_aper(encoder)?;
        if !self.event_trigger_styles.is_empty() {
            encode_style_section(encoder, &self.event_trigger_styles, EVENT_TRIGGER_SECTION_OPTIONALS)?;
        }
        if !self.report_styles.is_empty() {
            encode_style_section(encoder, &self.report_styles, 0)?;
        }
        if !self.control_styles.is_empty() {
            encode_style_section(encoder, &self.control_styles, 0)?;
        }
        Ok(())
    }
}

impl AperDecode for E2smRcRanFunctionDefinition {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 5)?;
        let name = RanFunctionName::decode_aper(decoder)?;
        let event_trigger_styles = if opt[0] {
            decode_style_section(decoder, EVENT_TRIGGER_SECTION_OPTIONALS)?
        } else {
            Vec::new()
        };
        let report_styles = if opt[1] {
            decode_style_section(decoder, 0)?
        } else {
            Vec::new()
        };
        if opt[2] || opt[4] {
            return Err(PerError::DecodeError(
                "insert and policy styles are not supported".to_string(),
            ));
        }
        let control_styles = if opt[3] {
            decode_style_section(decoder, 0)?
        } else {
            Vec::new()
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            name,
            event_trigger_styles,
            report_styles,
            control_styles,
        })
    }
}

impl AsnType for E2smRcRanFunctionDefinition {
    const TYPE_NAME: &'static str = "E2SM-RC-RANFunctionDefinition";

    fn check_constraints(&self) -> Result<(), String> {
        check_size("ranFunction-ShortName", self.name.short_name.len(), 1, 150)?;
        check_size("ranFunction-E2SM-OID", self.name.oid.len(), 1, 1000)?;
        check_size("ranFunction-Description", self.name.description.len(), 1, 150)?;
        check_size("ric-EventTriggerStyle-List", self.event_trigger_styles.len(), 0, MAX_NO_OF_RIC_STYLES)?;
        check_size("ric-ReportStyle-List", self.report_styles.len(), 0, MAX_NO_OF_RIC_STYLES)?;
        check_size("ric-ControlStyle-List", self.control_styles.len(), 0, MAX_NO_OF_RIC_STYLES)?;
        Ok(())
    }
}
