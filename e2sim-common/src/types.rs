//! Node identity types: PLMN, gNB ID, Global E2 Node ID, NR CGI, IMSI.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of significant bits in a gNB ID.
pub const GNB_ID_BITS: u32 = 29;

/// Number of bits left for the cell inside a 36-bit NR cell identity.
pub const CELL_ID_BITS: u32 = 7;

/// Largest valid gNB ID (exclusive).
pub const GNB_ID_LIMIT: u32 = 1 << GNB_ID_BITS;

/// Public Land Mobile Network identifier.
///
/// A PLMN consists of:
/// - MCC (Mobile Country Code): 3 decimal digits
/// - MNC (Mobile Network Code): 2 or 3 decimal digits
///
/// `long_mnc` records whether the MNC has 3 digits, so that "01" and "001"
/// stay distinct.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Plmn {
    /// Mobile Country Code (3 digits, range 0-999)
    pub mcc: u16,
    /// Mobile Network Code (2-3 digits, range 0-999)
    pub mnc: u16,
    /// True if MNC is 3 digits, false if 2 digits
    pub long_mnc: bool,
}

impl Plmn {
    /// Creates a new PLMN from numeric MCC and MNC.
    pub const fn new(mcc: u16, mnc: u16, long_mnc: bool) -> Self {
        Self { mcc, mnc, long_mnc }
    }

    /// Creates a PLMN from its decimal digit strings.
    ///
    /// Fails with [`Error::InvalidArgument`] unless `mcc` has exactly 3 digits
    /// and `mnc` has 2 or 3 digits.
    pub fn from_digits(mcc: &str, mnc: &str) -> Result<Self> {
        if mcc.len() != 3 || !mcc.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "MCC must be 3 decimal digits, got {mcc:?}"
            )));
        }
        if !(2..=3).contains(&mnc.len()) || !mnc.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "MNC must be 2 or 3 decimal digits, got {mnc:?}"
            )));
        }
        // Digits were checked above, so the parses cannot fail.
        let mcc_value = mcc.parse::<u16>().unwrap_or_default();
        let mnc_value = mnc.parse::<u16>().unwrap_or_default();
        Ok(Self::new(mcc_value, mnc_value, mnc.len() == 3))
    }

    /// MCC as a 3-digit string.
    pub fn mcc_digits(&self) -> String {
        format!("{:03}", self.mcc)
    }

    /// MNC as a 2- or 3-digit string.
    pub fn mnc_digits(&self) -> String {
        if self.long_mnc {
            format!("{:03}", self.mnc)
        } else {
            format!("{:02}", self.mnc)
        }
    }

    /// Number of MNC digits (2 or 3).
    pub fn mnc_len(&self) -> usize {
        if self.long_mnc {
            3
        } else {
            2
        }
    }

    /// Encodes the PLMN to the 3-octet BCD form used by E2AP `PLMN-Identity`.
    ///
    /// - Byte 0: MCC digit 2 (high nibble) | MCC digit 1 (low nibble)
    /// - Byte 1: MNC digit 3 or 0xF (high nibble) | MCC digit 3 (low nibble)
    /// - Byte 2: MNC digit 2 (high nibble) | MNC digit 1 (low nibble)
    pub fn encode(&self) -> [u8; 3] {
        let mcc = self.mcc;
        let mcc3 = (mcc % 10) as u8;
        let mcc2 = ((mcc % 100) / 10) as u8;
        let mcc1 = ((mcc % 1000) / 100) as u8;

        let mnc = self.mnc;
        let (mnc1, mnc2, mnc3) = if self.long_mnc {
            (
                ((mnc % 1000) / 100) as u8,
                ((mnc % 100) / 10) as u8,
                (mnc % 10) as u8,
            )
        } else {
            (((mnc % 100) / 10) as u8, (mnc % 10) as u8, 0x0F)
        };

        [(mcc2 << 4) | mcc1, (mnc3 << 4) | mcc3, (mnc2 << 4) | mnc1]
    }

    /// Decodes a PLMN from its 3-octet BCD form.
    pub fn decode(bytes: [u8; 3]) -> Self {
        let mcc1 = (bytes[0] & 0x0F) as u16;
        let mcc2 = ((bytes[0] >> 4) & 0x0F) as u16;
        let mcc3 = (bytes[1] & 0x0F) as u16;
        let mcc = 100 * mcc1 + 10 * mcc2 + mcc3;

        let mnc3 = (bytes[1] >> 4) & 0x0F;
        let mnc1 = (bytes[2] & 0x0F) as u16;
        let mnc2 = ((bytes[2] >> 4) & 0x0F) as u16;

        if mnc3 != 0x0F {
            Self::new(mcc, 100 * mnc1 + 10 * mnc2 + mnc3 as u16, true)
        } else {
            Self::new(mcc, 10 * mnc1 + mnc2, false)
        }
    }
}

impl fmt::Debug for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plmn({}-{})", self.mcc_digits(), self.mnc_digits())
    }
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.mcc_digits(), self.mnc_digits())
    }
}

/// A 29-bit gNB identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct GnbId(u32);

impl GnbId {
    /// Creates a gNB ID, rejecting values that do not fit in 29 bits.
    pub fn new(value: u32) -> Result<Self> {
        if value >= GNB_ID_LIMIT {
            return Err(Error::InvalidArgument(format!(
                "gNB ID {value} does not fit in {GNB_ID_BITS} bits"
            )));
        }
        Ok(Self(value))
    }

    /// Raw numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Packs the ID into a 4-octet bit string with the 3 low bits unused.
    pub fn to_bit_string(&self) -> [u8; 4] {
        (self.0 << (32 - GNB_ID_BITS)).to_be_bytes()
    }

    /// Unpacks an ID from its 4-octet, 3-bits-unused form.
    pub fn from_bit_string(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes) >> (32 - GNB_ID_BITS))
    }
}

impl TryFrom<u32> for GnbId {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<GnbId> for u32 {
    fn from(id: GnbId) -> Self {
        id.0
    }
}

impl fmt::Display for GnbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of this E2 node: PLMN plus gNB ID.
///
/// Immutable once built; the node context owns the only instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalE2NodeId {
    plmn: Plmn,
    gnb_id: GnbId,
}

impl GlobalE2NodeId {
    /// Builds the identity from MCC/MNC digit strings and a numeric gNB ID.
    pub fn new(mcc: &str, mnc: &str, gnb_id: u32) -> Result<Self> {
        Ok(Self {
            plmn: Plmn::from_digits(mcc, mnc)?,
            gnb_id: GnbId::new(gnb_id)?,
        })
    }

    /// Builds the identity from already validated parts.
    pub fn from_parts(plmn: Plmn, gnb_id: GnbId) -> Self {
        Self { plmn, gnb_id }
    }

    /// PLMN of the node
    pub fn plmn(&self) -> Plmn {
        self.plmn
    }

    /// gNB ID of the node
    pub fn gnb_id(&self) -> GnbId {
        self.gnb_id
    }

    /// NR CGI of one of this node's cells.
    pub fn cell(&self, cell_id: u8) -> NrCgi {
        NrCgi::new(self.plmn, self.gnb_id, cell_id)
    }
}

impl fmt::Display for GlobalE2NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gnb_{}_{}_{:08x}", self.plmn.mcc_digits(), self.plmn.mnc_digits(), self.gnb_id.0)
    }
}

/// NR Cell Global Identity: PLMN plus a 36-bit NR cell identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NrCgi {
    /// PLMN of the cell
    pub plmn: Plmn,
    /// 36-bit NR cell identity (gNB ID in the top 29 bits)
    pub nr_cell_identity: u64,
}

impl NrCgi {
    /// Builds a CGI from a gNB ID and a 7-bit cell number.
    pub fn new(plmn: Plmn, gnb_id: GnbId, cell_id: u8) -> Self {
        let cell = u64::from(cell_id) & ((1 << CELL_ID_BITS) - 1);
        Self {
            plmn,
            nr_cell_identity: (u64::from(gnb_id.value()) << CELL_ID_BITS) | cell,
        }
    }

    /// gNB ID carried in the top 29 bits of the cell identity.
    pub fn gnb_id(&self) -> GnbId {
        GnbId((self.nr_cell_identity >> CELL_ID_BITS) as u32 & (GNB_ID_LIMIT - 1))
    }

    /// Cell number carried in the low 7 bits.
    pub fn cell_id(&self) -> u8 {
        (self.nr_cell_identity & ((1 << CELL_ID_BITS) - 1)) as u8
    }

    /// Cell identity packed into 5 octets with the 4 low bits unused.
    pub fn cell_identity_bits(&self) -> [u8; 5] {
        let shifted = (self.nr_cell_identity & 0xF_FFFF_FFFF) << 4;
        let bytes = shifted.to_be_bytes();
        [bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]]
    }

    /// Inverse of [`NrCgi::cell_identity_bits`].
    pub fn from_cell_identity_bits(plmn: Plmn, bits: [u8; 5]) -> Self {
        let mut buf = [0u8; 8];
        buf[3..].copy_from_slice(&bits);
        Self {
            plmn,
            nr_cell_identity: u64::from_be_bytes(buf) >> 4,
        }
    }
}

/// Length of an IMSI in digits.
pub const IMSI_LEN: usize = 15;

/// A 15-digit IMSI split into MCC, MNC and MSIN.
///
/// The split depends on the MNC length, which the caller supplies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Imsi {
    /// Mobile Country Code
    pub mcc: String,
    /// Mobile Network Code (2 or 3 digits)
    pub mnc: String,
    /// Subscriber number
    pub msin: String,
}

impl Imsi {
    /// Splits a 15-digit IMSI using an MNC of `mnc_len` digits.
    pub fn parse(imsi: &str, mnc_len: usize) -> Result<Self> {
        if imsi.len() != IMSI_LEN || !imsi.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "IMSI must be {IMSI_LEN} decimal digits, got {imsi:?}"
            )));
        }
        if !(2..=3).contains(&mnc_len) {
            return Err(Error::InvalidArgument(format!(
                "MNC length must be 2 or 3, got {mnc_len}"
            )));
        }
        Ok(Self {
            mcc: imsi[..3].to_string(),
            mnc: imsi[3..3 + mnc_len].to_string(),
            msin: imsi[3 + mnc_len..].to_string(),
        })
    }

    /// Rebuilds an IMSI from a PLMN and a numeric MSIN.
    pub fn from_plmn_msin(plmn: Plmn, msin: u64) -> Self {
        let width = IMSI_LEN - 3 - plmn.mnc_len();
        Self {
            mcc: plmn.mcc_digits(),
            mnc: plmn.mnc_digits(),
            msin: format!("{msin:0width$}"),
        }
    }

    /// PLMN encoded in the IMSI prefix.
    pub fn plmn(&self) -> Result<Plmn> {
        Plmn::from_digits(&self.mcc, &self.mnc)
    }

    /// MSIN as a number.
    pub fn msin_value(&self) -> u64 {
        self.msin.parse().unwrap_or_default()
    }
}

impl fmt::Display for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.mcc, self.mnc, self.msin)
    }
}
