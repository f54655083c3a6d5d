//! ---
//! chimera_section: "01-wire-codec"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Record codec, field tables and sample streams."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
//! Frame primitives: keys, varints and a bounds-checked reader.
//!
//! A frame is a varint key `(tag << 3) | wire_type` followed by a payload
//! whose length is implied by the wire type. This matches the protocol
//! buffers binary encoding, so samples produced by other protobuf runtimes
//! decode here and vice versa.

use bytes::BufMut;

use crate::error::{Malformed, Result, WireError};

/// Largest tag representable in a frame key.
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Longest valid varint encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

const MAX_GROUP_DEPTH: usize = 64;

/// Payload encoding announced by a frame key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// LEB128 varint.
    Varint = 0,
    /// Eight little-endian bytes.
    Fixed64 = 1,
    /// Varint length followed by that many bytes.
    LengthDelimited = 2,
    /// Opens a group closed by an [`WireType::EndGroup`] with the same tag.
    StartGroup = 3,
    /// Closes a group.
    EndGroup = 4,
    /// Four little-endian bytes.
    Fixed32 = 5,
}

impl WireType {
    /// Map the low three key bits to a wire type.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKey {
    /// Field tag.
    pub tag: u32,
    /// Payload encoding.
    pub wire_type: WireType,
}

impl FieldKey {
    /// Construct a key.
    pub const fn new(tag: u32, wire_type: WireType) -> Self {
        Self { tag, wire_type }
    }

    /// Raw varint value of the key.
    pub const fn to_raw(self) -> u64 {
        ((self.tag as u64) << 3) | self.wire_type as u64
    }

    /// Bytes the key occupies on the wire.
    pub const fn encoded_len(self) -> usize {
        varint_len(self.to_raw())
    }
}

/// Bytes needed to encode `value` as a varint.
pub const fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Append `value` as a LEB128 varint.
pub fn put_varint<B: BufMut>(buf: &mut B, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Append a frame key.
pub fn put_key<B: BufMut>(buf: &mut B, key: FieldKey) {
    put_varint(buf, key.to_raw());
}

/// Cursor over an input buffer.
///
/// Every read checks the remaining length first and reports the offset of
/// the element that could not be read.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once the whole buffer has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Read a LEB128 varint.
    pub fn read_varint(&mut self) -> Result<u64> {
        let start = self.pos;
        let mut value = 0u64;
        for index in 0..MAX_VARINT_LEN {
            let Some(&byte) = self.buf.get(self.pos) else {
                return Err(WireError::malformed(start, Malformed::TruncatedVarint));
            };
            self.pos += 1;
            value |= u64::from(byte & 0x7F) << (7 * index);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(WireError::malformed(start, Malformed::VarintOverflow))
    }

    /// Read and validate a frame key.
    pub fn read_key(&mut self) -> Result<FieldKey> {
        let start = self.pos;
        let raw = self.read_varint()?;
        let tag = raw >> 3;
        if tag == 0 || tag > u64::from(MAX_TAG) {
            return Err(WireError::malformed(start, Malformed::InvalidTag(tag)));
        }
        let bits = (raw & 0x7) as u8;
        let wire_type = WireType::from_u8(bits)
            .ok_or_else(|| WireError::malformed(start, Malformed::InvalidWireType(bits)))?;
        Ok(FieldKey::new(tag as u32, wire_type))
    }

    /// Borrow the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(WireError::malformed(
                self.pos,
                Malformed::TruncatedPayload {
                    needed: len,
                    remaining,
                },
            ));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a little-endian `f32` payload.
    pub fn read_f32(&mut self) -> Result<f32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.read_bytes(4)?);
        Ok(f32::from_le_bytes(raw))
    }

    /// Read a little-endian `f64` payload.
    pub fn read_f64(&mut self) -> Result<f64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.read_bytes(8)?);
        Ok(f64::from_le_bytes(raw))
    }

    /// Read a varint length prefix and borrow that many bytes.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let length = self.read_varint()?;
        let remaining = self.remaining();
        if length > remaining as u64 {
            return Err(WireError::malformed(
                start,
                Malformed::LengthOverrun { length, remaining },
            ));
        }
        self.read_bytes(length as usize)
    }

    /// Skip the payload of a frame whose key was already read.
    pub fn skip(&mut self, key: FieldKey) -> Result<()> {
        self.skip_nested(key, 0)
    }

    fn skip_nested(&mut self, key: FieldKey, depth: usize) -> Result<()> {
        match key.wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.read_bytes(8)?;
            }
            WireType::LengthDelimited => {
                self.read_length_delimited()?;
            }
            WireType::Fixed32 => {
                self.read_bytes(4)?;
            }
            WireType::StartGroup => {
                if depth >= MAX_GROUP_DEPTH {
                    return Err(WireError::malformed(
                        self.pos,
                        Malformed::GroupDepth(MAX_GROUP_DEPTH),
                    ));
                }
                loop {
                    if self.is_empty() {
                        return Err(WireError::malformed(
                            self.pos,
                            Malformed::UnterminatedGroup(key.tag),
                        ));
                    }
                    let start = self.pos;
                    let inner = self.read_key()?;
                    if inner.wire_type == WireType::EndGroup {
                        if inner.tag == key.tag {
                            break;
                        }
                        return Err(WireError::malformed(
                            start,
                            Malformed::UnexpectedEndGroup(inner.tag),
                        ));
                    }
                    self.skip_nested(inner, depth + 1)?;
                }
            }
            WireType::EndGroup => {
                return Err(WireError::malformed(
                    self.pos,
                    Malformed::UnexpectedEndGroup(key.tag),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint_bytes(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        put_varint(&mut buf, value);
        buf
    }

    #[test]
    fn varint_lengths_match_encoding() {
        for value in [0, 1, 127, 128, 300, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            assert_eq!(varint_bytes(value).len(), varint_len(value), "value {value}");
        }
        assert_eq!(varint_bytes(300), vec![0xAC, 0x02]);
        assert_eq!(varint_len(u64::MAX), MAX_VARINT_LEN);
    }

    #[test]
    fn reads_back_written_varints() {
        let mut buf = Vec::new();
        for value in [0u64, 150, 1 << 35, u64::MAX] {
            put_varint(&mut buf, value);
        }
        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_varint().unwrap(), 0);
        assert_eq!(reader.read_varint().unwrap(), 150);
        assert_eq!(reader.read_varint().unwrap(), 1 << 35);
        assert_eq!(reader.read_varint().unwrap(), u64::MAX);
        assert!(reader.is_empty());
    }

    #[test]
    fn truncated_varint_reports_start_offset() {
        let buf = [0x08, 0x96];
        let mut reader = Reader::new(&buf);
        reader.read_bytes(1).unwrap();
        let err = reader.read_varint().unwrap_err();
        assert_eq!(err.offset(), 1);
        assert_eq!(err.reason(), Malformed::TruncatedVarint);
    }

    #[test]
    fn overlong_varint_is_rejected() {
        let buf = [0xFF; 11];
        let err = Reader::new(&buf).read_varint().unwrap_err();
        assert_eq!(err.reason(), Malformed::VarintOverflow);
    }

    #[test]
    fn float_key_is_a_single_byte_for_small_tags() {
        let key = FieldKey::new(2, WireType::Fixed32);
        assert_eq!(key.to_raw(), 0x15);
        assert_eq!(key.encoded_len(), 1);
    }

    #[test]
    fn key_validation() {
        let err = Reader::new(&[0x05]).read_key().unwrap_err();
        assert_eq!(err.reason(), Malformed::InvalidTag(0));

        let err = Reader::new(&[0x0E]).read_key().unwrap_err();
        assert_eq!(err.reason(), Malformed::InvalidWireType(6));

        let key = Reader::new(&[0x2D]).read_key().unwrap();
        assert_eq!(key, FieldKey::new(5, WireType::Fixed32));
    }

    #[test]
    fn tags_above_the_key_range_are_rejected() {
        let mut buf = Vec::new();
        put_varint(&mut buf, ((u64::from(MAX_TAG) + 1) << 3) | 5);
        let err = Reader::new(&buf).read_key().unwrap_err();
        assert_eq!(err.reason(), Malformed::InvalidTag(536_870_912));
        assert_eq!(err.offset(), 0);

        let mut buf = Vec::new();
        put_key(&mut buf, FieldKey::new(MAX_TAG, WireType::Fixed32));
        let key = Reader::new(&buf).read_key().unwrap();
        assert_eq!(key.tag, MAX_TAG);
    }

    #[test]
    fn group_nesting_is_bounded() {
        let mut buf = Vec::new();
        for _ in 0..70 {
            put_key(&mut buf, FieldKey::new(1, WireType::StartGroup));
        }
        let mut reader = Reader::new(&buf);
        let key = reader.read_key().unwrap();
        let err = reader.skip(key).unwrap_err();
        assert_eq!(err.reason(), Malformed::GroupDepth(MAX_GROUP_DEPTH));
        assert_eq!(err.reason(), Malformed::GroupDepth(64));
    }

    #[test]
    fn groups_up_to_the_depth_limit_are_skipped() {
        let mut buf = Vec::new();
        for _ in 0..MAX_GROUP_DEPTH {
            put_key(&mut buf, FieldKey::new(1, WireType::StartGroup));
        }
        for _ in 0..MAX_GROUP_DEPTH {
            put_key(&mut buf, FieldKey::new(1, WireType::EndGroup));
        }
        let mut reader = Reader::new(&buf);
        let key = reader.read_key().unwrap();
        reader.skip(key).unwrap();
        assert!(reader.is_empty());
    }

    #[test]
    fn skips_every_wire_type() {
        let mut buf = Vec::new();
        put_key(&mut buf, FieldKey::new(10, WireType::Varint));
        put_varint(&mut buf, 99_999);
        put_key(&mut buf, FieldKey::new(11, WireType::Fixed64));
        buf.extend_from_slice(&[0; 8]);
        put_key(&mut buf, FieldKey::new(12, WireType::LengthDelimited));
        put_varint(&mut buf, 3);
        buf.extend_from_slice(b"abc");
        put_key(&mut buf, FieldKey::new(13, WireType::StartGroup));
        put_key(&mut buf, FieldKey::new(1, WireType::Fixed32));
        buf.extend_from_slice(&[0; 4]);
        put_key(&mut buf, FieldKey::new(13, WireType::EndGroup));
        put_key(&mut buf, FieldKey::new(14, WireType::Fixed32));
        buf.extend_from_slice(&[0; 4]);

        let mut reader = Reader::new(&buf);
        while !reader.is_empty() {
            let key = reader.read_key().unwrap();
            reader.skip(key).unwrap();
        }
        assert_eq!(reader.position(), buf.len());
    }

    #[test]
    fn length_prefix_past_end_is_rejected() {
        let mut buf = Vec::new();
        put_varint(&mut buf, 10);
        buf.extend_from_slice(b"short");
        let err = Reader::new(&buf).read_length_delimited().unwrap_err();
        assert_eq!(
            err.reason(),
            Malformed::LengthOverrun {
                length: 10,
                remaining: 5
            }
        );
        assert_eq!(err.offset(), 0);
    }

    #[test]
    fn mismatched_group_end_is_rejected() {
        let mut buf = Vec::new();
        put_key(&mut buf, FieldKey::new(7, WireType::EndGroup));
        let mut reader = Reader::new(&buf);
        let err = reader.skip(FieldKey::new(6, WireType::StartGroup)).unwrap_err();
        assert_eq!(err.reason(), Malformed::UnexpectedEndGroup(7));

        let mut reader = Reader::new(&[]);
        let err = reader.skip(FieldKey::new(6, WireType::StartGroup)).unwrap_err();
        assert_eq!(err.reason(), Malformed::UnterminatedGroup(6));
    }
}
