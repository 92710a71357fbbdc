//! Codec adapter
//!
//! Wraps the APER primitives into two stateless operations per ASN.1 type:
//! [`encode`] (constraint check, then APER encode into a bounded buffer) and
//! [`decode`] (APER decode, then constraint check). The "type descriptor" is
//! the Rust type implementing [`AsnType`].

use thiserror::Error;

use crate::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, PerError};

/// Size of the scratch buffer every encode must fit into.
pub const ENCODE_BUFFER_SIZE: usize = 8192;

/// Codec adapter errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// The value (or decoded value) violates its ASN.1 constraints
    #[error("{type_name}: constraint check failed: {message}")]
    ConstraintViolation {
        type_name: &'static str,
        message: String,
    },

    /// Encoding produced more than [`ENCODE_BUFFER_SIZE`] octets
    #[error("{type_name}: encoded size {size} exceeds {ENCODE_BUFFER_SIZE} octet buffer")]
    EncodingOverflow { type_name: &'static str, size: usize },

    /// The APER encoder rejected a component
    #[error("{type_name}: encoding failed: {source}")]
    EncodingFailed {
        type_name: &'static str,
        source: PerError,
    },

    /// The APER decoder did not complete
    #[error("{type_name}: decoding failed after {consumed} octets: {code}")]
    DecodeFailed {
        type_name: &'static str,
        consumed: usize,
        code: PerError,
    },
}

/// An ASN.1 type the codec adapter can handle.
pub trait AsnType: AperEncode + AperDecode {
    /// ASN.1 type name, used in diagnostics
    const TYPE_NAME: &'static str;

    /// Checks the constraints the APER encoder does not enforce on its own
    /// (list sizes, value ranges, string lengths).
    fn check_constraints(&self) -> Result<(), String>;
}

/// Encodes `value` as an aligned PER octet string.
pub fn encode<T: AsnType>(value: &T) -> Result<Vec<u8>, CodecError> {
    value
        .check_constraints()
        .map_err(|message| CodecError::ConstraintViolation {
            type_name: T::TYPE_NAME,
            message,
        })?;

    let mut encoder = AperEncoder::with_capacity(ENCODE_BUFFER_SIZE * 8);
    value
        .encode_aper(&mut encoder)
        .map_err(|source| CodecError::EncodingFailed {
            type_name: T::TYPE_NAME,
            source,
        })?;
    encoder.align();

    let bytes = encoder.into_bytes();
    if bytes.len() > ENCODE_BUFFER_SIZE {
        return Err(CodecError::EncodingOverflow {
            type_name: T::TYPE_NAME,
            size: bytes.len(),
        });
    }
    Ok(bytes.to_vec())
}

/// Decodes an aligned PER octet string into `T`.
///
/// A value that decodes but fails its constraint check is dropped and never
/// handed to the caller.
pub fn decode<T: AsnType>(bytes: &[u8]) -> Result<T, CodecError> {
    let mut decoder = AperDecoder::new(bytes);
    let value = T::decode_aper(&mut decoder).map_err(|code| CodecError::DecodeFailed {
        type_name: T::TYPE_NAME,
        consumed: decoder.consumed_octets(),
        code,
    })?;

    value
        .check_constraints()
        .map_err(|message| CodecError::ConstraintViolation {
            type_name: T::TYPE_NAME,
            message,
        })?;
    Ok(value)
}

/// Helper for `check_constraints` implementations: verifies `value` lies in
/// `min..=max`.
pub fn check_range<V>(what: &str, value: V, min: V, max: V) -> Result<(), String>
where
    V: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        return Err(format!("{what} {value} out of range {min}..{max}"));
    }
    Ok(())
}

/// Helper for `check_constraints` implementations: verifies a list or string
/// length lies in `min..=max`.
pub fn check_size(what: &str, len: usize, min: usize, max: usize) -> Result<(), String> {
    if len < min || len > max {
        return Err(format!("{what} size {len} out of range {min}..{max}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::per::{Constraint, PerResult};

    /// INTEGER (0..4095) with an extra "must be even" rule
    #[derive(Debug, PartialEq)]
    struct EvenId(u16);

    impl AperEncode for EvenId {
        fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
            encoder.encode_constrained_whole_number(i64::from(self.0), &Constraint::new(0, 4095))
        }
    }

    impl AperDecode for EvenId {
        fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
            decoder
                .decode_constrained_whole_number(&Constraint::new(0, 4095))
                .map(|v| Self(v as u16))
        }
    }

    impl AsnType for EvenId {
        const TYPE_NAME: &'static str = "EvenId";

        fn check_constraints(&self) -> Result<(), String> {
            if self.0 % 2 != 0 {
                return Err(format!("{} is odd", self.0));
            }
            Ok(())
        }
    }

    /// Large opaque blob to hit the buffer bound
    struct Blob(Vec<u8>);

    impl AperEncode for Blob {
        fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
            for chunk in self.0.chunks(1000) {
                encoder.encode_octet_string(chunk, None, None)?;
            }
            Ok(())
        }
    }

    impl AperDecode for Blob {
        fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
            decoder.decode_octet_string(None, None).map(Self)
        }
    }

    impl AsnType for Blob {
        const TYPE_NAME: &'static str = "Blob";

        fn check_constraints(&self) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let bytes = encode(&EvenId(42)).unwrap();
        assert_eq!(bytes, vec![0x00, 0x2A]);
        assert_eq!(decode::<EvenId>(&bytes).unwrap(), EvenId(42));
    }

    #[test]
    fn test_constraint_checked_before_encode() {
        let err = encode(&EvenId(3)).unwrap_err();
        assert!(matches!(err, CodecError::ConstraintViolation { type_name: "EvenId", .. }));
    }

    #[test]
    fn test_constraint_checked_after_decode() {
        let err = decode::<EvenId>(&[0x00, 0x03]).unwrap_err();
        assert!(matches!(err, CodecError::ConstraintViolation { .. }));
    }

    #[test]
    fn test_encoding_failed_reports_type() {
        let err = encode(&EvenId(5000)).unwrap_err();
        match err {
            CodecError::EncodingFailed { type_name, source } => {
                assert_eq!(type_name, "EvenId");
                assert!(matches!(source, PerError::ConstraintViolation { value: 5000, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_failed_reports_consumed() {
        let err = decode::<EvenId>(&[0x00]).unwrap_err();
        assert!(matches!(err, CodecError::DecodeFailed { consumed: 0, .. }));
    }

    #[test]
    fn test_encoding_overflow() {
        let err = encode(&Blob(vec![0xAB; ENCODE_BUFFER_SIZE + 1])).unwrap_err();
        assert!(matches!(err, CodecError::EncodingOverflow { .. }));
    }

    #[test]
    fn test_check_helpers() {
        assert!(check_range("id", 5u16, 0, 4095).is_ok());
        assert!(check_range("id", 5000u16, 0, 4095).is_err());
        assert!(check_size("list", 0, 1, 16).is_err());
        assert!(check_size("list", 16, 1, 16).is_ok());
    }
}
