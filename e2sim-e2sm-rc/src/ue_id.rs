//! UE identity (E2SM common IEs)
//!
//! Only the gNB flavour of UEID is modelled. The simulator fills the AMF UE
//! NGAP ID with the subscriber number and the GUAMI PLMN with the IMSI PLMN,
//! so the IMSI can be recovered on the way back (control requests).

use e2sim_common::{Imsi, Plmn};
use e2sim_e2ap::ies::{bits_from_value, decode_plmn_identity, encode_plmn_identity, value_from_bits};
use e2sim_e2ap::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};

const AMF_UE_NGAP_ID: Constraint = Constraint::new(0, 1_099_511_627_775);
const UE_ID_ALTERNATIVES: usize = 7;
const GNB_UE_ID_OPTIONALS: usize = 6;
const RAN_UE_ID_POSITION: usize = 2;
const RAN_UE_ID_LEN: usize = 8;

/// GUAMI ::= SEQUENCE { pLMNIdentity, aMFRegionID, aMFSetID, aMFPointer, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guami {
    pub plmn: [u8; 3],
    /// 8 bits
    pub amf_region_id: u8,
    /// 10 bits
    pub amf_set_id: u16,
    /// 6 bits
    pub amf_pointer: u8,
}

impl Guami {
    pub fn new(plmn: Plmn) -> Self {
        Self {
            plmn: plmn.encode(),
            ..Default::default()
        }
    }
}

impl AperEncode for Guami {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encode_plmn_identity(encoder, &self.plmn)?;
        encoder.encode_bit_string(&bits_from_value(u64::from(self.amf_region_id), 8), Some(8), Some(8))?;
        encoder.encode_bit_string(&bits_from_value(u64::from(self.amf_set_id), 10), Some(10), Some(10))?;
        encoder.encode_bit_string(&bits_from_value(u64::from(self.amf_pointer), 6), Some(6), Some(6))
    }
}

impl AperDecode for Guami {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let plmn = decode_plmn_identity(decoder)?;
        let amf_region_id = value_from_bits(&decoder.decode_bit_string(Some(8), Some(8))?) as u8;
        let amf_set_id = value_from_bits(&decoder.decode_bit_string(Some(10), Some(10))?) as u16;
        let amf_pointer = value_from_bits(&decoder.decode_bit_string(Some(6), Some(6))?) as u8;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            plmn,
            amf_region_id,
            amf_set_id,
            amf_pointer,
        })
    }
}

/// UEID-GNB
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GnbUeId {
    /// AMF-UE-NGAP-ID, INTEGER (0..2^40-1)
    pub amf_ue_ngap_id: u64,
    pub guami: Guami,
    pub ran_ue_id: Option<[u8; RAN_UE_ID_LEN]>,
}

impl GnbUeId {
    /// Identity of the UE with the given IMSI.
    pub fn from_imsi(imsi: &Imsi) -> e2sim_common::Result<Self> {
        Ok(Self {
            amf_ue_ngap_id: imsi.msin_value(),
            guami: Guami::new(imsi.plmn()?),
            ran_ue_id: None,
        })
    }

    /// IMSI encoded by [`GnbUeId::from_imsi`].
    pub fn imsi(&self) -> Imsi {
        Imsi::from_plmn_msin(Plmn::decode(self.guami.plmn), self.amf_ue_ngap_id)
    }
}

impl AperEncode for GnbUeId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        let mut present = [false; GNB_UE_ID_OPTIONALS];
        present[RAN_UE_ID_POSITION] = self.ran_ue_id.is_some();
        encoder.encode_sequence_preamble(true, &present);
        encoder.encode_integer(self.amf_ue_ngap_id as i64, &AMF_UE_NGAP_ID)?;
        self.guami.encode_aper(encoder)?;
        if let Some(ran_ue_id) = &self.ran_ue_id {
            encoder.encode_octet_string(ran_ue_id, Some(RAN_UE_ID_LEN), Some(RAN_UE_ID_LEN))?;
        }
        Ok(())
    }
}

impl AperDecode for GnbUeId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, present) = decoder.decode_sequence_preamble(true, GNB_UE_ID_OPTIONALS)?;
        if present
            .iter()
            .enumerate()
            .any(|(i, p)| *p && i != RAN_UE_ID_POSITION)
        {
            return Err(PerError::DecodeError(
                "UEID-GNB: only ran-UEID is supported among the optional IEs".to_string(),
            ));
        }
        let amf_ue_ngap_id = decoder.decode_integer(&AMF_UE_NGAP_ID)? as u64;
        let guami = Guami::decode_aper(decoder)?;
        let ran_ue_id = if present[RAN_UE_ID_POSITION] {
            let bytes = decoder.decode_octet_string(Some(RAN_UE_ID_LEN), Some(RAN_UE_ID_LEN))?;
            let mut id = [0u8; RAN_UE_ID_LEN];
            id.copy_from_slice(&bytes);
            Some(id)
        } else {
            None
        };
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            amf_ue_ngap_id,
            guami,
            ran_ue_id,
        })
    }
}

/// UEID CHOICE; only gNB-UEID is carried
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UeId {
    Gnb(GnbUeId),
}

impl UeId {
    pub fn gnb(&self) -> &GnbUeId {
        match self {
            UeId::Gnb(id) => id,
        }
    }
}

impl AperEncode for UeId {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            UeId::Gnb(id) => {
                encoder.encode_choice_index(0, UE_ID_ALTERNATIVES, true)?;
                id.encode_aper(encoder)
            }
        }
    }
}

impl AperDecode for UeId {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(UE_ID_ALTERNATIVES, true)? {
            0 => Ok(UeId::Gnb(GnbUeId::decode_aper(decoder)?)),
            other => Err(PerError::DecodeError(format!("UEID alternative {other} is not supported"))),
        }
    }
}
