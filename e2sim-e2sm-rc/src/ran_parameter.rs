//! RAN parameters
//!
//! Definitions (what a subscriber asks to be reported) and values (what the
//! node reports or the RIC sends in a control message).

use bitvec::prelude::*;
use e2sim_e2ap::per::{
    decode_sequence_of, encode_sequence_of, AperDecode, AperDecoder, AperEncode, AperEncoder,
    Constraint, PerError, PerResult,
};

/// RANParameter-ID, INTEGER (1..4294967295, ...)
pub type RanParameterId = u32;

/// maxnoofAssociatedRANParameters, maxnoofItemsinList, maxnoofParametersinStructure
pub const MAX_NO_OF_RAN_PARAMETERS: usize = 65535;

const RAN_PARAMETER_ID: Constraint = Constraint::extensible(1, 4_294_967_295);

pub(crate) fn encode_ran_parameter_id(encoder: &mut AperEncoder, id: RanParameterId) -> PerResult<()> {
    encoder.encode_integer(i64::from(id), &RAN_PARAMETER_ID)
}

pub(crate) fn decode_ran_parameter_id(decoder: &mut AperDecoder) -> PerResult<RanParameterId> {
    let value = decoder.decode_integer(&RAN_PARAMETER_ID)?;
    RanParameterId::try_from(value)
        .map_err(|_| PerError::DecodeError(format!("RANParameter-ID {value} out of range")))
}

/// RANParameter-Name ::= PrintableString (SIZE(1..150, ...))
pub(crate) fn encode_name(encoder: &mut AperEncoder, name: &str) -> PerResult<()> {
    encoder.encode_printable_string(name, 1, 150, true)
}

pub(crate) fn decode_name(decoder: &mut AperDecoder) -> PerResult<String> {
    decoder.decode_printable_string(1, 150, true)
}

/// Item of a LIST or STRUCTURE parameter definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanParameterDefinitionItem {
    pub id: RanParameterId,
    pub name: String,
    pub definition: Option<Box<RanParameterDefinition>>,
}

impl AperEncode for RanParameterDefinitionItem {
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

impl AperDecode for RanParameterDefinitionItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let id = decode_ran_parameter_id(decoder)?;
        let name = decode_name(decoder)?;
        let definition = if opt[0] {
            Some(Box::new(RanParameterDefinition::decode_aper(decoder)?))
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self { id, name, definition })
    }
}

/// RANParameter-Definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RanParameterDefinition {
    List(Vec<RanParameterDefinitionItem>),
    Structure(Vec<RanParameterDefinitionItem>),
}

impl RanParameterDefinition {
    pub fn items(&self) -> &[RanParameterDefinitionItem] {
        match self {
            RanParameterDefinition::List(items) | RanParameterDefinition::Structure(items) => items,
        }
    }
}

impl AperEncode for RanParameterDefinition {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        let index = match self {
            RanParameterDefinition::List(_) => 0,
            RanParameterDefinition::Structure(_) => 1,
        };
        encoder.encode_choice_index(index, 2, true)?;
        // Choice-LIST and Choice-STRUCTURE share one shape
        encoder.encode_sequence_preamble(true, &[]);
        encode_sequence_of(encoder, self.items(), 1, MAX_NO_OF_RAN_PARAMETERS)
    }
}

impl AperDecode for RanParameterDefinition {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (outer_ext, _) = decoder.decode_sequence_preamble(true, 0)?;
        let index = decoder.decode_choice_index(2, true)?;
        if index > 1 {
            return Err(PerError::UnsupportedExtension);
        }
        let (inner_ext, _) = decoder.decode_sequence_preamble(true, 0)?;
        let items = decoder.nested(|d| decode_sequence_of(d, 1, MAX_NO_OF_RAN_PARAMETERS))?;
        if inner_ext {
            decoder.skip_sequence_extensions()?;
        }
        if outer_ext {
            decoder.skip_sequence_extensions()?;
        }
        Ok(if index == 0 {
            RanParameterDefinition::List(items)
        } else {
            RanParameterDefinition::Structure(items)
        })
    }
}

/// RANParameter-Value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RanParameterValue {
    Boolean(bool),
    Int(i64),
    BitString(BitVec<u8, Msb0>),
    OctetString(Vec<u8>),
    PrintableString(String),
}

impl RanParameterValue {
    const ALTERNATIVES: usize = 6;
    const REAL: usize = 2;

    pub fn as_octets(&self) -> Option<&[u8]> {
        match self {
            RanParameterValue::OctetString(octets) => Some(octets),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            RanParameterValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl AperEncode for RanParameterValue {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            RanParameterValue::Boolean(v) => {
                encoder.encode_choice_index(0, Self::ALTERNATIVES, true)?;
                encoder.encode_boolean(*v);
                Ok(())
            }
            RanParameterValue::Int(v) => {
                encoder.encode_choice_index(1, Self::ALTERNATIVES, true)?;
                encoder.encode_unconstrained_whole_number(*v)
            }
            RanParameterValue::BitString(bits) => {
                encoder.encode_choice_index(3, Self::ALTERNATIVES, true)?;
                encoder.encode_bit_string(bits, None, None)
            }
            RanParameterValue::OctetString(octets) => {
                encoder.encode_choice_index(4, Self::ALTERNATIVES, true)?;
                encoder.encode_octet_string(octets, None, None)
            }
            RanParameterValue::PrintableString(s) => {
                encoder.encode_choice_index(5, Self::ALTERNATIVES, true)?;
                // Unconstrained: length determinant plus one octet per character
                encoder.encode_octet_string(s.as_bytes(), None, None)
            }
        }
    }
}

impl AperDecode for RanParameterValue {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(Self::ALTERNATIVES, true)? {
            0 => Ok(RanParameterValue::Boolean(decoder.decode_boolean()?)),
            1 => Ok(RanParameterValue::Int(decoder.decode_unconstrained_whole_number()?)),
            Self::REAL => Err(PerError::DecodeError("REAL RAN parameter values are not supported".to_string())),
            3 => Ok(RanParameterValue::BitString(decoder.decode_bit_string(None, None)?)),
            4 => Ok(RanParameterValue::OctetString(decoder.decode_octet_string(None, None)?)),
            5 => {
                let bytes = decoder.decode_octet_string(None, None)?;
                String::from_utf8(bytes)
                    .map(RanParameterValue::PrintableString)
                    .map_err(|e| PerError::DecodeError(e.to_string()))
            }
            _ => Err(PerError::UnsupportedExtension),
        }
    }
}

/// `{ ranParameter-ID, ranParameter-valueType }`, shared by structures,
/// indication messages and control messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanParameterItem {
    pub id: RanParameterId,
    pub value: RanParameterValueType,
}

impl RanParameterItem {
    pub fn new(id: RanParameterId, value: RanParameterValueType) -> Self {
        Self { id, value }
    }
}

impl AperEncode for RanParameterItem {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encode_ran_parameter_id(encoder, self.id)?;
        self.value.encode_aper(encoder)
    }
}

impl AperDecode for RanParameterItem {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let id = decode_ran_parameter_id(decoder)?;
        let value = RanParameterValueType::decode_aper(decoder)?;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self { id, value })
    }
}

/// RANParameter-STRUCTURE; an empty item list encodes as absent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RanParameterStructure {
    pub items: Vec<RanParameterItem>,
}

impl RanParameterStructure {
    pub fn new(items: Vec<RanParameterItem>) -> Self {
        Self { items }
    }
}

impl AperEncode for RanParameterStructure {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[!self.items.is_empty()]);
        if !self.items.is_empty() {
            encode_sequence_of(encoder, &self.items, 1, MAX_NO_OF_RAN_PARAMETERS)?;
        }
        Ok(())
    }
}

impl AperDecode for RanParameterStructure {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, opt) = decoder.decode_sequence_preamble(true, 1)?;
        let items = if opt[0] {
            decode_sequence_of(decoder, 1, MAX_NO_OF_RAN_PARAMETERS)?
        } else {
            Vec::new()
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self { items })
    }
}

/// RANParameter-ValueType
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RanParameterValueType {
    ElementTrue(RanParameterValue),
    ElementFalse(Option<RanParameterValue>),
    Structure(RanParameterStructure),
    List(Vec<RanParameterStructure>),
}

impl RanParameterValueType {
    const ALTERNATIVES: usize = 4;

    /// Element value, if this is an element
    pub fn element_value(&self) -> Option<&RanParameterValue> {
        match self {
            RanParameterValueType::ElementTrue(v) => Some(v),
            RanParameterValueType::ElementFalse(v) => v.as_ref(),
            _ => None,
        }
    }

    /// Searches nested structures and lists for parameter `id`.
    pub fn find(&self, id: RanParameterId) -> Option<&RanParameterValueType> {
        match self {
            RanParameterValueType::Structure(s) => find_ran_parameter(&s.items, id),
            RanParameterValueType::List(list) => {
                list.iter().find_map(|s| find_ran_parameter(&s.items, id))
            }
            _ => None,
        }
    }
}

/// Depth-first search for parameter `id` in a parameter list.
pub fn find_ran_parameter(items: &[RanParameterItem], id: RanParameterId) -> Option<&RanParameterValueType> {
    items.iter().find_map(|item| {
        if item.id == id {
            Some(&item.value)
        } else {
            item.value.find(id)
        }
    })
}

impl AperEncode for RanParameterValueType {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            RanParameterValueType::ElementTrue(value) => {
                encoder.encode_choice_index(0, Self::ALTERNATIVES, true)?;
                encoder.encode_sequence_preamble(true, &[]);
                value.encode_aper(encoder)
            }
            RanParameterValueType::ElementFalse(value) => {
                encoder.encode_choice_index(1, Self::ALTERNATIVES, true)?;
                encoder.encode_sequence_preamble(true, &[value.is_some()]);
                match value {
                    Some(v) => v.encode_aper(encoder),
                    None => Ok(()),
                }
            }
            RanParameterValueType::Structure(structure) => {
                encoder.encode_choice_index(2, Self::ALTERNATIVES, true)?;
                encoder.encode_sequence_preamble(true, &[]);
                structure.encode_aper(encoder)
            }
            RanParameterValueType::List(list) => {
                encoder.encode_choice_index(3, Self::ALTERNATIVES, true)?;
                encoder.encode_sequence_preamble(true, &[]);
                encoder.encode_sequence_preamble(true, &[]);
                encode_sequence_of(encoder, list, 1, MAX_NO_OF_RAN_PARAMETERS)
            }
        }
    }
}

impl AperDecode for RanParameterValueType {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let index = decoder.decode_choice_index(Self::ALTERNATIVES, true)?;
        let (extended, value) = match index {
            0 => {
                let (ext, _) = decoder.decode_sequence_preamble(true, 0)?;
                (ext, RanParameterValueType::ElementTrue(RanParameterValue::decode_aper(decoder)?))
            }
            1 => {
                let (ext, opt) = decoder.decode_sequence_preamble(true, 1)?;
                let value = if opt[0] {
                    Some(RanParameterValue::decode_aper(decoder)?)
                } else {
                    None
                };
                (ext, RanParameterValueType::ElementFalse(value))
            }
            2 => {
                let (ext, _) = decoder.decode_sequence_preamble(true, 0)?;
                let structure = decoder.nested(RanParameterStructure::decode_aper)?;
                (ext, RanParameterValueType::Structure(structure))
            }
            3 => {
                let (ext, _) = decoder.decode_sequence_preamble(true, 0)?;
                let (list_ext, _) = decoder.decode_sequence_preamble(true, 0)?;
                let list = decoder.nested(|d| decode_sequence_of(d, 1, MAX_NO_OF_RAN_PARAMETERS))?;
                if list_ext {
                    decoder.skip_sequence_extensions()?;
                }
                (ext, RanParameterValueType::List(list))
            }
            _ => return Err(PerError::UnsupportedExtension),
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: AperEncode + AperDecode>(value: &T) -> T {
        let mut encoder = AperEncoder::new();
        value.encode_aper(&mut encoder).unwrap();
        let bytes = encoder.into_bytes();
        T::decode_aper(&mut AperDecoder::new(&bytes)).unwrap()
    }

    #[test]
    fn test_ran_parameter_id_large() {
        let item = RanParameterItem::new(
            4_000_000_000,
            RanParameterValueType::ElementTrue(RanParameterValue::Int(-5)),
        );
        assert_eq!(roundtrip(&item), item);
    }

    #[test]
    fn test_nested_structure_and_list() {
        let value = RanParameterValueType::Structure(RanParameterStructure::new(vec![
            RanParameterItem::new(
                17100,
                RanParameterValueType::List(vec![RanParameterStructure::new(vec![
                    RanParameterItem::new(
                        17103,
                        RanParameterValueType::ElementFalse(Some(RanParameterValue::Int(-80))),
                    ),
                ])]),
            ),
            RanParameterItem::new(
                4,
                RanParameterValueType::ElementTrue(RanParameterValue::OctetString(vec![1, 2, 3])),
            ),
        ]));
        assert_eq!(roundtrip(&value), value);

        let found = value.find(17103).and_then(|v| v.element_value()).cloned();
        assert_eq!(found, Some(RanParameterValue::Int(-80)));
        assert!(value.find(9999).is_none());
    }

    #[test]
    fn test_value_variants() {
        let values = [
            RanParameterValue::Boolean(true),
            RanParameterValue::Int(300),
            RanParameterValue::BitString(bitvec![u8, Msb0; 1, 0, 1, 1]),
            RanParameterValue::OctetString(vec![0xAB; 8]),
            RanParameterValue::PrintableString("gnb-1".to_string()),
        ];
        for value in values {
            let element = RanParameterValueType::ElementTrue(value);
            assert_eq!(roundtrip(&element), element);
        }
        let empty = RanParameterValueType::ElementFalse(None);
        assert_eq!(roundtrip(&empty), empty);
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let mut value = RanParameterValueType::ElementTrue(RanParameterValue::Boolean(true));
        for id in 1..=40 {
            value = RanParameterValueType::Structure(RanParameterStructure::new(vec![
                RanParameterItem::new(id, value),
            ]));
        }
        let mut encoder = AperEncoder::new();
        value.encode_aper(&mut encoder).unwrap();
        let bytes = encoder.into_bytes();

        assert!(matches!(
            RanParameterValueType::decode_aper(&mut AperDecoder::new(&bytes)),
            Err(PerError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_definition_roundtrip() {
        let definition = RanParameterDefinition::Structure(vec![RanParameterDefinitionItem {
            id: 17001,
            name: "Primary Cell of MCG".to_string(),
            definition: Some(Box::new(RanParameterDefinition::Structure(vec![
                RanParameterDefinitionItem {
                    id: 17010,
                    name: "Measurements".to_string(),
                    definition: None,
                },
            ]))),
        }]);
        assert_eq!(roundtrip(&definition), definition);
    }
}
