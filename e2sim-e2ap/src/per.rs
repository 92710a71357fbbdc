//! PER (Packed Encoding Rules) encoding/decoding
//!
//! Aligned PER (APER) primitives as used by E2AP and the E2 service models,
//! following ITU-T X.691. Composite types are built on top of these through
//! the [`AperEncode`] and [`AperDecode`] traits.

use bitvec::prelude::*;
use bytes::Bytes;
use thiserror::Error;

/// PER codec errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerError {
    #[error("Buffer underflow: need {needed} bits, have {available}")]
    BufferUnderflow { needed: usize, available: usize },
    #[error("Buffer overflow: cannot write {needed} bits")]
    BufferOverflow { needed: usize },
    #[error("Invalid constraint: value {value} not in range {min}..={max}")]
    ConstraintViolation { value: i64, min: i64, max: i64 },
    #[error("Invalid choice index: {index} (max {max})")]
    InvalidChoiceIndex { index: usize, max: usize },
    #[error("Invalid length: {length}")]
    InvalidLength { length: usize },
    #[error("Unsupported extension")]
    UnsupportedExtension,
    #[error("Extension count {count} exceeds {MAX_EXTENSION_ADDITIONS}")]
    TooManyExtensions { count: i64 },
    #[error("Nesting deeper than {max} levels")]
    NestingTooDeep { max: usize },
    #[error("Decode error: {0}")]
    DecodeError(String),
}

pub type PerResult<T> = Result<T, PerError>;

/// Upper bound (exclusive) under which a length is encoded as a constrained
/// whole number rather than a general length determinant.
const CONSTRAINED_LENGTH_LIMIT: usize = 65536;

/// Largest extension-addition count or extension index accepted off the
/// wire. No E2AP or E2SM-RC type comes near it.
pub const MAX_EXTENSION_ADDITIONS: u64 = 64;

/// Deepest nesting of recursive types (RAN parameter structures and lists)
/// a decoder will follow.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Constraint definition for constrained integers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub min: i64,
    pub max: i64,
    pub extensible: bool,
}

impl Constraint {
    pub const fn new(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            extensible: false,
        }
    }

    pub const fn extensible(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            extensible: true,
        }
    }

    /// Number of values in the range
    pub fn range(&self) -> u64 {
        if self.max >= self.min {
            (self.max - self.min) as u64 + 1
        } else {
            0
        }
    }

    /// Bits needed to encode an offset within the range
    pub fn bits_needed(&self) -> usize {
        let range = self.range();
        if range <= 1 {
            0
        } else {
            64 - (range - 1).leading_zeros() as usize
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Minimum number of octets holding `value` (at least one).
fn octets_for(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

/// APER (Aligned PER) Encoder
pub struct AperEncoder {
    buffer: BitVec<u8, Msb0>,
}

impl AperEncoder {
    pub fn new() -> Self {
        Self {
            buffer: BitVec::new(),
        }
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            buffer: BitVec::with_capacity(bits),
        }
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.buffer.into_vec())
    }

    /// Get current bit position
    pub fn bit_position(&self) -> usize {
        self.buffer.len()
    }

    /// Align to octet boundary
    pub fn align(&mut self) {
        let remainder = self.buffer.len() % 8;
        if remainder != 0 {
            let padding = 8 - remainder;
            self.buffer.extend(std::iter::repeat(false).take(padding));
        }
    }

    /// Write a single bit
    pub fn write_bit(&mut self, bit: bool) {
        self.buffer.push(bit);
    }

    /// Write multiple bits from a value (MSB first)
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        for i in (0..num_bits).rev() {
            self.buffer.push((value >> i) & 1 == 1);
        }
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_bits(u64::from(*byte), 8);
        }
    }

    /// Encode BOOLEAN (X.691 Section 12)
    pub fn encode_boolean(&mut self, value: bool) {
        self.write_bit(value);
    }

    /// Encode constrained whole number (X.691 Section 10.5)
    pub fn encode_constrained_whole_number(
        &mut self,
        value: i64,
        constraint: &Constraint,
    ) -> PerResult<()> {
        if !constraint.contains(value) {
            return Err(PerError::ConstraintViolation {
                value,
                min: constraint.min,
                max: constraint.max,
            });
        }

        let range = constraint.range();
        let offset = (value - constraint.min) as u64;

        if range == 1 {
            return Ok(());
        }

        if range <= 255 {
            self.write_bits(offset, constraint.bits_needed());
        } else if range == 256 {
            self.align();
            self.write_bits(offset, 8);
        } else if range <= 65536 {
            self.align();
            self.write_bits(offset, 16);
        } else {
            // Indefinite length case: octet count, then the aligned octets
            let max_octets = octets_for(range - 1);
            let octets = octets_for(offset);
            self.encode_constrained_whole_number(
                octets as i64,
                &Constraint::new(1, max_octets as i64),
            )?;
            self.align();
            self.write_bits(offset, octets * 8);
        }

        Ok(())
    }

    /// Encode INTEGER with a possibly extensible constraint (X.691 Section 13)
    pub fn encode_integer(&mut self, value: i64, constraint: &Constraint) -> PerResult<()> {
        if constraint.extensible {
            let in_root = constraint.contains(value);
            self.write_bit(!in_root);
            if !in_root {
                return self.encode_unconstrained_whole_number(value);
            }
        }
        self.encode_constrained_whole_number(value, constraint)
    }

    /// Encode unconstrained whole number (X.691 Section 10.8)
    pub fn encode_unconstrained_whole_number(&mut self, value: i64) -> PerResult<()> {
        let full = value.to_be_bytes();
        // Drop redundant leading sign octets while keeping the sign bit intact
        let mut start = 0;
        while start < full.len() - 1 {
            let (head, next) = (full[start], full[start + 1]);
            let redundant = (head == 0x00 && next & 0x80 == 0) || (head == 0xFF && next & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        let bytes = &full[start..];

        self.encode_length_determinant(bytes.len())?;
        self.write_bytes(bytes);
        Ok(())
    }

    /// Encode length determinant (X.691 Section 11.9)
    pub fn encode_length_determinant(&mut self, length: usize) -> PerResult<()> {
        self.align();
        if length <= 127 {
            self.write_bits(length as u64, 8);
        } else if length <= 16383 {
            self.write_bits(0x8000 | length as u64, 16);
        } else {
            return Err(PerError::InvalidLength { length });
        }
        Ok(())
    }

    /// Encode the length of a SIZE(min..max) constrained type
    pub fn encode_length(&mut self, length: usize, min: usize, max: usize) -> PerResult<()> {
        if length < min || length > max {
            return Err(PerError::ConstraintViolation {
                value: length as i64,
                min: min as i64,
                max: max as i64,
            });
        }
        if min == max {
            return Ok(());
        }
        if max < CONSTRAINED_LENGTH_LIMIT {
            self.encode_constrained_whole_number(
                length as i64,
                &Constraint::new(min as i64, max as i64),
            )
        } else {
            self.encode_length_determinant(length)
        }
    }

    /// Encode ENUMERATED by root index (X.691 Section 14)
    pub fn encode_enumerated(
        &mut self,
        index: usize,
        root_count: usize,
        extensible: bool,
    ) -> PerResult<()> {
        if extensible {
            let in_root = index < root_count;
            self.write_bit(!in_root);
            if !in_root {
                return self.encode_normally_small_non_negative((index - root_count) as u64);
            }
        } else if index >= root_count {
            return Err(PerError::InvalidChoiceIndex {
                index,
                max: root_count.saturating_sub(1),
            });
        }
        self.encode_constrained_whole_number(index as i64, &Constraint::new(0, root_count as i64 - 1))
    }

    /// Encode normally small non-negative whole number (X.691 Section 10.6)
    pub fn encode_normally_small_non_negative(&mut self, value: u64) -> PerResult<()> {
        if value <= 63 {
            self.write_bit(false);
            self.write_bits(value, 6);
        } else {
            self.write_bit(true);
            self.encode_unconstrained_whole_number(value as i64)?;
        }
        Ok(())
    }

    /// Encode CHOICE index (X.691 Section 23)
    pub fn encode_choice_index(
        &mut self,
        index: usize,
        num_alternatives: usize,
        extensible: bool,
    ) -> PerResult<()> {
        if extensible {
            let in_root = index < num_alternatives;
            self.write_bit(!in_root);
            if !in_root {
                return self.encode_normally_small_non_negative((index - num_alternatives) as u64);
            }
        } else if index >= num_alternatives {
            return Err(PerError::InvalidChoiceIndex {
                index,
                max: num_alternatives.saturating_sub(1),
            });
        }
        let constraint = Constraint::new(0, (num_alternatives - 1) as i64);
        self.encode_constrained_whole_number(index as i64, &constraint)
    }

    /// Encode the SEQUENCE preamble: extension bit (if extensible) and the
    /// presence bitmap of OPTIONAL/DEFAULT components (X.691 Section 19)
    pub fn encode_sequence_preamble(&mut self, extensible: bool, optionals: &[bool]) {
        if extensible {
            // No extension additions are ever emitted
            self.write_bit(false);
        }
        for present in optionals {
            self.write_bit(*present);
        }
    }

    /// Encode OCTET STRING (X.691 Section 17)
    pub fn encode_octet_string(
        &mut self,
        data: &[u8],
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<()> {
        let len = data.len();

        match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if len != min {
                    return Err(PerError::InvalidLength { length: len });
                }
                if min > 2 {
                    self.align();
                }
            }
            (Some(min), Some(max)) => {
                self.encode_length(len, min, max)?;
                if max > 2 {
                    self.align();
                }
            }
            _ => {
                self.encode_length_determinant(len)?;
            }
        }
        self.write_bytes(data);
        Ok(())
    }

    /// Encode BIT STRING (X.691 Section 16)
    pub fn encode_bit_string(
        &mut self,
        bits: &BitSlice<u8, Msb0>,
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<()> {
        let len = bits.len();

        match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if len != min {
                    return Err(PerError::InvalidLength { length: len });
                }
                if min > 16 {
                    self.align();
                }
            }
            (Some(min), Some(max)) => {
                self.encode_length(len, min, max)?;
                if max > 16 {
                    self.align();
                }
            }
            _ => {
                self.encode_length_determinant(len)?;
            }
        }
        self.buffer.extend_from_bitslice(bits);
        Ok(())
    }

    /// Encode a PrintableString with a SIZE constraint (X.691 Section 30).
    ///
    /// In the aligned variant every character takes 8 bits.
    pub fn encode_printable_string(
        &mut self,
        value: &str,
        min_len: usize,
        max_len: usize,
        extensible: bool,
    ) -> PerResult<()> {
        if !value.bytes().all(is_printable) {
            return Err(PerError::DecodeError(format!(
                "not a PrintableString: {value:?}"
            )));
        }
        let len = value.len();
        if extensible {
            let in_root = len >= min_len && len <= max_len;
            self.write_bit(!in_root);
            if !in_root {
                self.encode_length_determinant(len)?;
                self.write_bytes(value.as_bytes());
                return Ok(());
            }
        }
        self.encode_length(len, min_len, max_len)?;
        if max_len * 8 > 16 {
            self.align();
        }
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    /// Encode an open type: the value is encoded on its own, padded to whole
    /// octets and emitted behind a length determinant (X.691 Section 11.2)
    pub fn encode_open_type<F>(&mut self, encode: F) -> PerResult<()>
    where
        F: FnOnce(&mut AperEncoder) -> PerResult<()>,
    {
        let mut inner = AperEncoder::new();
        encode(&mut inner)?;
        inner.align();
        let mut bytes = inner.into_bytes().to_vec();
        if bytes.is_empty() {
            bytes.push(0);
        }
        self.encode_length_determinant(bytes.len())?;
        self.write_bytes(&bytes);
        Ok(())
    }
}

impl Default for AperEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Characters permitted in a PrintableString
fn is_printable(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?'
        )
}

/// APER (Aligned PER) Decoder
pub struct AperDecoder<'a> {
    data: &'a BitSlice<u8, Msb0>,
    position: usize,
    depth: usize,
}

impl<'a> AperDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data: BitSlice::from_slice(data),
            position: 0,
            depth: 0,
        }
    }

    /// Runs `decode` one nesting level deeper, failing past
    /// [`MAX_NESTING_DEPTH`].
    pub fn nested<T, F>(&mut self, decode: F) -> PerResult<T>
    where
        F: FnOnce(&mut Self) -> PerResult<T>,
    {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(PerError::NestingTooDeep { max: MAX_NESTING_DEPTH });
        }
        self.depth += 1;
        let result = decode(self);
        self.depth -= 1;
        result
    }

    /// Get current bit position
    pub fn bit_position(&self) -> usize {
        self.position
    }

    /// Number of whole octets consumed so far
    pub fn consumed_octets(&self) -> usize {
        self.position.div_ceil(8)
    }

    /// Get remaining bits
    pub fn remaining_bits(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Align to octet boundary
    pub fn align(&mut self) {
        let remainder = self.position % 8;
        if remainder != 0 {
            self.position += 8 - remainder;
        }
    }

    /// Read a single bit
    pub fn read_bit(&mut self) -> PerResult<bool> {
        if self.position >= self.data.len() {
            return Err(PerError::BufferUnderflow {
                needed: 1,
                available: 0,
            });
        }
        let bit = self.data[self.position];
        self.position += 1;
        Ok(bit)
    }

    /// Read multiple bits as a value (MSB first)
    pub fn read_bits(&mut self, num_bits: usize) -> PerResult<u64> {
        if self.position + num_bits > self.data.len() {
            return Err(PerError::BufferUnderflow {
                needed: num_bits,
                available: self.remaining_bits(),
            });
        }

        let mut value: u64 = 0;
        for _ in 0..num_bits {
            value = (value << 1) | u64::from(self.data[self.position]);
            self.position += 1;
        }
        Ok(value)
    }

    /// Read raw bytes
    pub fn read_bytes(&mut self, num_bytes: usize) -> PerResult<Vec<u8>> {
        if self.position + num_bytes * 8 > self.data.len() {
            return Err(PerError::BufferUnderflow {
                needed: num_bytes * 8,
                available: self.remaining_bits(),
            });
        }
        let mut bytes = Vec::with_capacity(num_bytes);
        for _ in 0..num_bytes {
            bytes.push(self.read_bits(8)? as u8);
        }
        Ok(bytes)
    }

    /// Decode BOOLEAN
    pub fn decode_boolean(&mut self) -> PerResult<bool> {
        self.read_bit()
    }

    /// Decode constrained whole number (X.691 Section 10.5)
    pub fn decode_constrained_whole_number(&mut self, constraint: &Constraint) -> PerResult<i64> {
        let range = constraint.range();

        if range == 1 {
            return Ok(constraint.min);
        }

        let offset = if range <= 255 {
            self.read_bits(constraint.bits_needed())?
        } else if range == 256 {
            self.align();
            self.read_bits(8)?
        } else if range <= 65536 {
            self.align();
            self.read_bits(16)?
        } else {
            let max_octets = octets_for(range - 1);
            let octets = self
                .decode_constrained_whole_number(&Constraint::new(1, max_octets as i64))?
                as usize;
            self.align();
            self.read_bits(octets * 8)?
        };

        let value = constraint.min.wrapping_add(offset as i64);
        if !constraint.contains(value) {
            return Err(PerError::ConstraintViolation {
                value,
                min: constraint.min,
                max: constraint.max,
            });
        }
        Ok(value)
    }

    /// Decode INTEGER with a possibly extensible constraint
    pub fn decode_integer(&mut self, constraint: &Constraint) -> PerResult<i64> {
        if constraint.extensible && self.read_bit()? {
            return self.decode_unconstrained_whole_number();
        }
        self.decode_constrained_whole_number(constraint)
    }

    /// Decode unconstrained whole number (X.691 Section 10.8)
    pub fn decode_unconstrained_whole_number(&mut self) -> PerResult<i64> {
        let len = self.decode_length_determinant()?;
        if len > 8 {
            return Err(PerError::InvalidLength { length: len });
        }
        let bytes = self.read_bytes(len)?;

        let Some(first) = bytes.first() else {
            return Ok(0);
        };

        let mut value: i64 = if first & 0x80 != 0 { -1 } else { 0 };
        for byte in bytes {
            value = (value << 8) | i64::from(byte);
        }

        Ok(value)
    }

    /// Decode length determinant (X.691 Section 11.9)
    pub fn decode_length_determinant(&mut self) -> PerResult<usize> {
        self.align();
        let first_byte = self.read_bits(8)? as u8;

        if first_byte & 0x80 == 0 {
            Ok(first_byte as usize)
        } else if first_byte & 0x40 == 0 {
            let second_byte = self.read_bits(8)? as u8;
            Ok((((first_byte & 0x3F) as usize) << 8) | (second_byte as usize))
        } else {
            Err(PerError::DecodeError(
                "fragmented length determinant not supported".to_string(),
            ))
        }
    }

    /// Decode the length of a SIZE(min..max) constrained type
    pub fn decode_length(&mut self, min: usize, max: usize) -> PerResult<usize> {
        if min == max {
            return Ok(min);
        }
        let length = if max < CONSTRAINED_LENGTH_LIMIT {
            self.decode_constrained_whole_number(&Constraint::new(min as i64, max as i64))?
                as usize
        } else {
            self.decode_length_determinant()?
        };
        if length < min || length > max {
            return Err(PerError::InvalidLength { length });
        }
        Ok(length)
    }

    /// Decode ENUMERATED, returning the index (root or extension)
    pub fn decode_enumerated(&mut self, root_count: usize, extensible: bool) -> PerResult<usize> {
        if extensible && self.read_bit()? {
            let value = self.decode_extension_count()?;
            return Ok(root_count + value);
        }
        self.decode_constrained_whole_number(&Constraint::new(0, root_count as i64 - 1))
            .map(|v| v as usize)
    }

    /// Decode normally small non-negative whole number (X.691 Section 10.6)
    pub fn decode_normally_small_non_negative(&mut self) -> PerResult<u64> {
        let large = self.read_bit()?;
        if !large {
            self.read_bits(6)
        } else {
            let value = self.decode_unconstrained_whole_number()?;
            u64::try_from(value).map_err(|_| PerError::TooManyExtensions { count: value })
        }
    }

    /// Normally small number used as an extension index or count, bounded by
    /// [`MAX_EXTENSION_ADDITIONS`]
    fn decode_extension_count(&mut self) -> PerResult<usize> {
        let value = self.decode_normally_small_non_negative()?;
        if value > MAX_EXTENSION_ADDITIONS {
            return Err(PerError::TooManyExtensions { count: value as i64 });
        }
        Ok(value as usize)
    }

    /// Decode CHOICE index (X.691 Section 23)
    ///
    /// Extension alternatives are returned as `num_alternatives + n`; their
    /// value follows as an open type.
    pub fn decode_choice_index(
        &mut self,
        num_alternatives: usize,
        extensible: bool,
    ) -> PerResult<usize> {
        if extensible && self.read_bit()? {
            let ext_index = self.decode_extension_count()?;
            return num_alternatives
                .checked_add(ext_index)
                .ok_or(PerError::InvalidChoiceIndex {
                    index: ext_index,
                    max: num_alternatives,
                });
        }
        let constraint = Constraint::new(0, (num_alternatives - 1) as i64);
        self.decode_constrained_whole_number(&constraint)
            .map(|v| v as usize)
    }

    /// Decode the SEQUENCE preamble, returning the extension flag and the
    /// presence bitmap of `num_optionals` OPTIONAL components
    pub fn decode_sequence_preamble(
        &mut self,
        extensible: bool,
        num_optionals: usize,
    ) -> PerResult<(bool, Vec<bool>)> {
        let extended = if extensible { self.read_bit()? } else { false };
        let mut optionals = Vec::with_capacity(num_optionals);
        for _ in 0..num_optionals {
            optionals.push(self.read_bit()?);
        }
        Ok((extended, optionals))
    }

    /// Skip the extension additions of a SEQUENCE whose extension bit was set
    pub fn skip_sequence_extensions(&mut self) -> PerResult<()> {
        let count = self.decode_extension_count()? + 1;
        let mut present = Vec::new();
        for _ in 0..count {
            present.push(self.read_bit()?);
        }
        for _ in present.into_iter().filter(|p| *p) {
            self.decode_open_type_bytes()?;
        }
        Ok(())
    }

    /// Decode OCTET STRING (X.691 Section 17)
    pub fn decode_octet_string(
        &mut self,
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<Vec<u8>> {
        let len = match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if min > 2 {
                    self.align();
                }
                min
            }
            (Some(min), Some(max)) => {
                let len = self.decode_length(min, max)?;
                if max > 2 {
                    self.align();
                }
                len
            }
            _ => self.decode_length_determinant()?,
        };

        self.read_bytes(len)
    }

    /// Decode BIT STRING (X.691 Section 16)
    pub fn decode_bit_string(
        &mut self,
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<BitVec<u8, Msb0>> {
        let len = match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if min > 16 {
                    self.align();
                }
                min
            }
            (Some(min), Some(max)) => {
                let len = self.decode_length(min, max)?;
                if max > 16 {
                    self.align();
                }
                len
            }
            _ => self.decode_length_determinant()?,
        };

        if self.position + len > self.data.len() {
            return Err(PerError::BufferUnderflow {
                needed: len,
                available: self.remaining_bits(),
            });
        }
        let bits = self.data[self.position..self.position + len].to_bitvec();
        self.position += len;
        Ok(bits)
    }

    /// Decode a size-constrained PrintableString
    pub fn decode_printable_string(
        &mut self,
        min_len: usize,
        max_len: usize,
        extensible: bool,
    ) -> PerResult<String> {
        let bytes = if extensible && self.read_bit()? {
            let len = self.decode_length_determinant()?;
            self.read_bytes(len)?
        } else {
            let len = self.decode_length(min_len, max_len)?;
            if max_len * 8 > 16 {
                self.align();
            }
            self.read_bytes(len)?
        };
        if !bytes.iter().copied().all(is_printable) {
            return Err(PerError::DecodeError("invalid PrintableString".to_string()));
        }
        String::from_utf8(bytes).map_err(|e| PerError::DecodeError(e.to_string()))
    }

    /// Read the raw octets of an open type
    pub fn decode_open_type_bytes(&mut self) -> PerResult<Vec<u8>> {
        let len = self.decode_length_determinant()?;
        self.read_bytes(len)
    }

    /// Decode an open type with the given inner decoder
    pub fn decode_open_type<T, F>(&mut self, decode: F) -> PerResult<T>
    where
        F: FnOnce(&mut AperDecoder<'_>) -> PerResult<T>,
    {
        let bytes = self.decode_open_type_bytes()?;
        let mut inner = AperDecoder::new(&bytes);
        decode(&mut inner)
    }
}

/// Trait for types that can be encoded with APER
pub trait AperEncode {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()>;
}

/// Trait for types that can be decoded with APER
pub trait AperDecode: Sized {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self>;
}

/// Encode a SEQUENCE (SIZE(min..max)) OF items
pub fn encode_sequence_of<T: AperEncode>(
    encoder: &mut AperEncoder,
    items: &[T],
    min: usize,
    max: usize,
) -> PerResult<()> {
    encoder.encode_length(items.len(), min, max)?;
    for item in items {
        item.encode_aper(encoder)?;
    }
    Ok(())
}

/// Decode a SEQUENCE (SIZE(min..max)) OF items
pub fn decode_sequence_of<T: AperDecode>(
    decoder: &mut AperDecoder,
    min: usize,
    max: usize,
) -> PerResult<Vec<T>> {
    let count = decoder.decode_length(min, max)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(T::decode_aper(decoder)?);
    }
    Ok(items)
}
