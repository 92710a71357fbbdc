//! NR Cell Global Identity (E2SM common IEs)

use e2sim_common::{NrCgi, Plmn};
use e2sim_e2ap::codec::{check_range, AsnType};
use e2sim_e2ap::ies::{bits_from_value, decode_plmn_identity, encode_plmn_identity, value_from_bits};
use e2sim_e2ap::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, PerResult};

/// Width of NRCellIdentity
pub const NR_CELL_IDENTITY_BITS: usize = 36;

const NR_CELL_IDENTITY_LIMIT: u64 = 1 << NR_CELL_IDENTITY_BITS;

/// NR-CGI ::= SEQUENCE { pLMNIdentity, nRCellIdentity BIT STRING (SIZE(36)), ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NrCgiIe {
    pub plmn: [u8; 3],
    pub nr_cell_identity: u64,
}

impl From<NrCgi> for NrCgiIe {
    fn from(cgi: NrCgi) -> Self {
        Self {
            plmn: cgi.plmn.encode(),
            nr_cell_identity: cgi.nr_cell_identity,
        }
    }
}

impl From<NrCgiIe> for NrCgi {
    fn from(ie: NrCgiIe) -> Self {
        NrCgi {
            plmn: Plmn::decode(ie.plmn),
            nr_cell_identity: ie.nr_cell_identity,
        }
    }
}

impl AperEncode for NrCgiIe {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_sequence_preamble(true, &[]);
        encode_plmn_identity(encoder, &self.plmn)?;
        let bits = bits_from_value(self.nr_cell_identity, NR_CELL_IDENTITY_BITS);
        encoder.encode_bit_string(&bits, Some(NR_CELL_IDENTITY_BITS), Some(NR_CELL_IDENTITY_BITS))
    }
}

impl AperDecode for NrCgiIe {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
        let plmn = decode_plmn_identity(decoder)?;
        let bits = decoder.decode_bit_string(Some(NR_CELL_IDENTITY_BITS), Some(NR_CELL_IDENTITY_BITS))?;
        if extended {
            decoder.skip_sequence_extensions()?;
        }
        Ok(Self {
            plmn,
            nr_cell_identity: value_from_bits(&bits),
        })
    }
}

impl AsnType for NrCgiIe {
    const TYPE_NAME: &'static str = "NR-CGI";

    fn check_constraints(&self) -> Result<(), String> {
        check_range("nRCellIdentity", self.nr_cell_identity, 0, NR_CELL_IDENTITY_LIMIT - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use e2sim_common::GnbId;
    use e2sim_e2ap::codec::{decode, encode, CodecError};

    #[test]
    fn test_nr_cgi_roundtrip() {
        let cgi = NrCgi::new(Plmn::new(111, 11, false), GnbId::new(1).unwrap(), 3);
        let bytes = encode(&NrCgiIe::from(cgi)).unwrap();
        let decoded: NrCgiIe = decode(&bytes).unwrap();
        let back = NrCgi::from(decoded);

        assert_eq!(back, cgi);
        assert_eq!(back.gnb_id().value(), 1);
        assert_eq!(back.cell_id(), 3);
    }

    #[test]
    fn test_nr_cgi_identity_too_wide() {
        let ie = NrCgiIe {
            plmn: [0x00, 0xF1, 0x10],
            nr_cell_identity: 1 << 40,
        };
        assert!(matches!(encode(&ie), Err(CodecError::ConstraintViolation { .. })));
    }

    #[test]
    fn test_nr_cgi_truncated_input() {
        assert!(matches!(
            decode::<NrCgiIe>(&[0x00, 0x00, 0xF1]),
            Err(CodecError::DecodeFailed { .. })
        ));
    }
}
