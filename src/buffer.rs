//! Cursor-based binary reader/writer (C1).
//!
//! Plays the role the teacher crate splits across `&[u8]`/`Vec<u8>` plus the
//! `PacketReadExt`/`PacketWriteExt` extension traits in
//! `protocol/format.rs` — except here a single owning buffer carries both an
//! independent read and write cursor, because the framing layer (C7/C8)
//! needs to grow a buffer on the write side and drain it on the read side
//! without juggling two separate types.

use anyhow::{anyhow, Context, Result};
use byteorder::{BigEndian, ByteOrder};

use crate::error::CodecError;

/// Default cap on decoded string length, matching vanilla Minecraft's limit.
pub const DEFAULT_MAX_STRING_CHARS: usize = 32767;

/// A mutable byte container with independent read and write cursors.
///
/// Invariant: `read_pos <= data.len() <= data.capacity()` always holds;
/// every method that advances `read_pos` checks this first.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read_pos: usize,
    /// Capacity hint used to size pass-through buffers for unknown packets;
    /// independent of `data`'s actual growth.
    single_capacity: usize,
}

impl ByteBuffer {
    /// Creates an empty buffer pre-sized for `capacity` bytes of writes.
    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            data: Vec::with_capacity(capacity),
            read_pos: 0,
            single_capacity: capacity,
        }
    }

    /// Wraps already-filled bytes for reading, e.g. one inbound frame body.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let single_capacity = data.len();
        ByteBuffer {
            data,
            read_pos: 0,
            single_capacity,
        }
    }

    /// Number of bytes remaining to be read.
    pub fn readable_bytes(&self) -> usize {
        self.data.len() - self.read_pos
    }

    /// The capacity hint this buffer was constructed with.
    pub fn single_capacity(&self) -> usize {
        self.single_capacity
    }

    /// Total bytes written so far.
    pub fn written_len(&self) -> usize {
        self.data.len()
    }

    /// Consumes the buffer, returning the underlying bytes regardless of
    /// read position — used once a frame has been fully assembled for write.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        if self.readable_bytes() < n {
            return Err(anyhow!("unexpected end of buffer: wanted {n} bytes, have {}", self.readable_bytes()));
        }
        let start = self.read_pos;
        self.read_pos += n;
        Ok(&self.data[start..start + n])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    /// Decodes a VarInt: 1..5 bytes, 7 data bits each, MSB = continuation.
    pub fn read_var_int(&mut self) -> Result<u32> {
        let mut value: u32 = 0;
        for i in 0..5 {
            let byte = self.read_u8()?;
            value |= ((byte & 0x7f) as u32) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::MalformedVarInt.into())
    }

    /// The encoded size in bytes of `value`, without writing anything.
    pub fn var_int_bytes(mut value: u32) -> usize {
        let mut count = 1;
        loop {
            value >>= 7;
            if value == 0 {
                return count;
            }
            count += 1;
        }
    }

    /// Reads a VarInt byte length, then that many UTF-8 bytes, then checks
    /// the decoded character count against `max_chars`.
    pub fn read_string(&mut self, max_chars: usize) -> Result<String> {
        let len = self.read_var_int()? as usize;
        let bytes = self.take(len)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|_| CodecError::InvalidUtf8)?
            .to_string();
        let char_count = s.chars().count();
        if char_count > max_chars {
            return Err(CodecError::StringTooLong { len: char_count, max: max_chars }.into());
        }
        Ok(s)
    }

    pub fn write_u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.write_u8(v as u8);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(if v { 1 } else { 0 });
    }

    pub fn write_u16(&mut self, v: u16) {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, v);
        self.data.extend_from_slice(&buf);
    }

    pub fn write_i16(&mut self, v: i16) {
        let mut buf = [0u8; 2];
        BigEndian::write_i16(&mut buf, v);
        self.data.extend_from_slice(&buf);
    }

    pub fn write_u32(&mut self, v: u32) {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, v);
        self.data.extend_from_slice(&buf);
    }

    pub fn write_i32(&mut self, v: i32) {
        let mut buf = [0u8; 4];
        BigEndian::write_i32(&mut buf, v);
        self.data.extend_from_slice(&buf);
    }

    pub fn write_u64(&mut self, v: u64) {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, v);
        self.data.extend_from_slice(&buf);
    }

    pub fn write_i64(&mut self, v: i64) {
        let mut buf = [0u8; 8];
        BigEndian::write_i64(&mut buf, v);
        self.data.extend_from_slice(&buf);
    }

    pub fn write_var_int(&mut self, mut value: u32) {
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.write_u8(byte);
            if value == 0 {
                break;
            }
        }
    }

    pub fn write_string(&mut self, s: &str) {
        self.write_var_int(s.len() as u32);
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Copies `n` readable bytes from `src`'s read cursor into `self`,
    /// advancing both buffers' cursors. Mirrors the original C++
    /// `ByteBuffer::WriteBytes(ByteBuffer*, n)`, which reads from another
    /// buffer rather than a raw slice.
    pub fn write_bytes_from(&mut self, src: &mut ByteBuffer, n: usize) -> Result<()> {
        let bytes = src.take(n).context("source buffer underrun during write_bytes_from")?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Reads exactly `n` raw bytes. Used by formats nested inside a payload
    /// (NBT) that don't share the outer VarInt-length-prefixed string
    /// convention.
    pub fn read_raw_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// §8 invariant 5: every u32 value round-trips through the VarInt
        /// codec, and the encoded length never exceeds 5 bytes.
        #[test]
        fn var_int_round_trips_for_any_u32(value: u32) {
            let mut buf = ByteBuffer::with_capacity(5);
            buf.write_var_int(value);
            prop_assert!(buf.written_len() <= 5);
            prop_assert_eq!(buf.written_len(), ByteBuffer::var_int_bytes(value));

            let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
            prop_assert_eq!(read_buf.read_var_int().unwrap(), value);
            prop_assert_eq!(read_buf.readable_bytes(), 0);
        }
    }

    #[test]
    fn var_int_edges() {
        let cases: &[(u32, usize)] = &[
            (0, 1),
            (127, 1),
            (128, 2),
            (16383, 2),
            (16384, 3),
            (2097151, 3),
            (2097152, 4),
            (2147483647, 4),
            (4294967295, 5),
        ];
        for &(n, expected_len) in cases {
            let mut buf = ByteBuffer::with_capacity(8);
            buf.write_var_int(n);
            assert_eq!(buf.written_len(), expected_len, "length mismatch for {n}");
            assert_eq!(ByteBuffer::var_int_bytes(n), expected_len);

            let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
            assert_eq!(read_buf.read_var_int().unwrap(), n);
        }
    }

    #[test]
    fn malformed_var_int_after_five_bytes() {
        let mut buf = ByteBuffer::from_vec(vec![0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);
        let err = buf.read_var_int().unwrap_err();
        assert!(err.downcast_ref::<CodecError>().is_some());
    }

    #[test]
    fn string_round_trip() {
        let mut buf = ByteBuffer::with_capacity(16);
        buf.write_string("hello");
        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        assert_eq!(read_buf.read_string(DEFAULT_MAX_STRING_CHARS).unwrap(), "hello");
    }

    #[test]
    fn string_too_long_rejected() {
        let mut buf = ByteBuffer::with_capacity(16);
        buf.write_string("hello");
        let mut read_buf = ByteBuffer::from_vec(buf.into_bytes());
        let err = read_buf.read_string(2).unwrap_err();
        assert!(matches!(err.downcast_ref::<CodecError>(), Some(CodecError::StringTooLong { .. })));
    }

    #[test]
    fn write_bytes_from_advances_both_cursors() {
        let mut src = ByteBuffer::from_vec(vec![1, 2, 3, 4, 5]);
        let _ = src.read_u8().unwrap();
        let mut dst = ByteBuffer::with_capacity(8);
        dst.write_bytes_from(&mut src, 3).unwrap();
        assert_eq!(dst.as_bytes(), &[2, 3, 4]);
        assert_eq!(src.readable_bytes(), 1);
    }
}
