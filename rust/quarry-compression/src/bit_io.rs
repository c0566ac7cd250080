//! Bit-granular writer and reader over byte buffers.
//!
//! Bits are stored MSB-first within each byte: the first bit written lands in bit 7
//! of byte 0. A position inside a stream is therefore a `(byte_offset, bit_offset)`
//! pair, with `bit_offset` in `0..8` counting from the most significant bit. Posting
//! lists are addressed by such pairs, so a list may start in the middle of a byte.
//!
//! # Codes
//!
//! - **Unary**: `n >= 1` is written as `n - 1` zero bits followed by a single one bit.
//! - **Gamma**: `n >= 1` is written as `unary(floor(log2 n) + 1)` followed by the
//!   `floor(log2 n)` low-order bits of `n` (the leading one bit is implicit).
//! - **Variable-byte**: 7 payload bits per byte, least significant group first, high
//!   bit set on every byte except the last. Only valid on a byte boundary.
//!
//! Zero is not representable in unary or gamma; callers bias such values by one.

use quarry_common::{Result, error::Error};

/// Position of a bit inside a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct BitPosition {
    pub byte_offset: u64,
    pub bit_offset: u8,
}

impl BitPosition {
    pub fn new(byte_offset: u64, bit_offset: u8) -> BitPosition {
        debug_assert!(bit_offset < 8);
        BitPosition {
            byte_offset,
            bit_offset,
        }
    }

    /// Absolute position in bits from the start of the stream.
    pub fn in_bits(&self) -> u64 {
        self.byte_offset * 8 + self.bit_offset as u64
    }
}

/// Accumulates a bit stream in memory.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    buf: Vec<u8>,
    /// Number of bits already used in the last byte of `buf`; zero when aligned.
    bit_offset: u8,
}

impl BitWriter {
    pub fn new() -> BitWriter {
        BitWriter::default()
    }

    pub fn with_capacity(bytes: usize) -> BitWriter {
        BitWriter {
            buf: Vec::with_capacity(bytes),
            bit_offset: 0,
        }
    }

    /// Current write position.
    pub fn position(&self) -> BitPosition {
        if self.bit_offset == 0 {
            BitPosition::new(self.buf.len() as u64, 0)
        } else {
            BitPosition::new(self.buf.len() as u64 - 1, self.bit_offset)
        }
    }

    /// Total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.position().in_bits()
    }

    /// Number of bytes touched so far, including a trailing partial byte.
    pub fn byte_len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_aligned(&self) -> bool {
        self.bit_offset == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer, returning the stream padded with zero bits to a byte boundary.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Pads the stream with zero bits up to the next byte boundary.
    pub fn align(&mut self) {
        self.bit_offset = 0;
    }

    pub fn write_bit(&mut self, bit: bool) {
        if self.bit_offset == 0 {
            self.buf.push(0);
        }
        if bit {
            let last = self.buf.len() - 1;
            self.buf[last] |= 0x80 >> self.bit_offset;
        }
        self.bit_offset = (self.bit_offset + 1) & 7;
    }

    /// Writes the `len` low-order bits of `value`, most significant first.
    pub fn write_binary(&mut self, len: u32, value: u32) {
        debug_assert!(len <= 32);
        let mut remaining = len;
        while remaining > 0 {
            if self.bit_offset == 0 {
                self.buf.push(0);
            }
            let free = 8 - self.bit_offset as u32;
            let take = free.min(remaining);
            let chunk = ((value as u64 >> (remaining - take)) & ((1u64 << take) - 1)) as u8;
            let last = self.buf.len() - 1;
            self.buf[last] |= chunk << (free - take);
            self.bit_offset = ((self.bit_offset as u32 + take) & 7) as u8;
            remaining -= take;
        }
    }

    fn write_zeros(&mut self, mut count: u64) {
        if count == 0 {
            return;
        }
        if self.bit_offset != 0 {
            let free = 8 - self.bit_offset as u64;
            let take = free.min(count);
            self.bit_offset = ((self.bit_offset as u64 + take) & 7) as u8;
            count -= take;
        }
        let whole = (count / 8) as usize;
        self.buf.resize(self.buf.len() + whole, 0);
        let rest = (count % 8) as u8;
        if rest != 0 {
            self.buf.push(0);
            self.bit_offset = rest;
        }
    }

    /// Writes `n` in unary: `n - 1` zero bits and a terminating one bit.
    pub fn write_unary(&mut self, n: u32) -> Result<()> {
        if n == 0 {
            return Err(Error::invalid_arg("n", "unary code requires n >= 1"));
        }
        self.write_zeros(n as u64 - 1);
        self.write_bit(true);
        Ok(())
    }

    /// Writes `n` in Elias gamma code.
    pub fn write_gamma(&mut self, n: u32) -> Result<()> {
        if n == 0 {
            return Err(Error::invalid_arg("n", "gamma code requires n >= 1"));
        }
        let low_bits = 31 - n.leading_zeros();
        self.write_unary(low_bits + 1)?;
        self.write_binary(low_bits, n);
        Ok(())
    }

    /// Writes a variable-byte integer. The stream must be byte-aligned.
    pub fn write_vbyte(&mut self, value: u32) {
        debug_assert!(self.is_aligned());
        self.align();
        write_vbyte_to(&mut self.buf, value);
    }

    /// Appends raw bytes. The stream must be byte-aligned.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        debug_assert!(self.is_aligned());
        self.align();
        self.buf.extend_from_slice(bytes);
    }
}

/// Appends a variable-byte integer to a byte vector.
pub fn write_vbyte_to(target: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        target.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    target.push(value as u8);
}

/// Reads a variable-byte integer from the front of `data`, returning the value and the
/// number of bytes consumed.
pub fn read_vbyte_from(data: &[u8]) -> Result<(u32, usize)> {
    let mut value = 0u64;
    for (i, &byte) in data.iter().enumerate().take(5) {
        value |= ((byte & 0x7f) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            if value > u32::MAX as u64 {
                break;
            }
            return Ok((value as u32, i + 1));
        }
    }
    Err(Error::format_inconsistency(
        "vbyte",
        "truncated or overlong variable-byte integer",
    ))
}

/// Sequential bit reader over a borrowed byte slice.
///
/// Every read checks the slice bound and fails with a format inconsistency instead of
/// reading past the end, so a corrupted length field cannot bleed into neighbouring
/// structures.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    byte: usize,
    bit: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> BitReader<'a> {
        BitReader {
            data,
            byte: 0,
            bit: 0,
        }
    }

    /// Creates a reader positioned at `start` within `data`.
    pub fn at(data: &'a [u8], start: BitPosition) -> Result<BitReader<'a>> {
        if start.bit_offset >= 8 || start.byte_offset as usize > data.len() {
            return Err(Error::format_inconsistency(
                "bit stream",
                format!(
                    "start position {}:{} outside of {} bytes",
                    start.byte_offset,
                    start.bit_offset,
                    data.len()
                ),
            ));
        }
        Ok(BitReader {
            data,
            byte: start.byte_offset as usize,
            bit: start.bit_offset,
        })
    }

    pub fn position(&self) -> BitPosition {
        BitPosition::new(self.byte as u64, self.bit)
    }

    pub fn remaining_bits(&self) -> u64 {
        (self.data.len() as u64 * 8).saturating_sub(self.position().in_bits())
    }

    pub fn is_aligned(&self) -> bool {
        self.bit == 0
    }

    #[cold]
    fn eos() -> Error {
        Error::format_inconsistency("bit stream", "read past end of stream")
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        let byte = *self.data.get(self.byte).ok_or_else(Self::eos)?;
        let bit = byte & (0x80 >> self.bit) != 0;
        self.advance_bits(1);
        Ok(bit)
    }

    #[inline]
    fn advance_bits(&mut self, bits: u64) {
        let total = self.bit as u64 + bits;
        self.byte += (total / 8) as usize;
        self.bit = (total % 8) as u8;
    }

    /// Reads `len` bits (at most 32) as an unsigned integer, most significant first.
    pub fn read_binary(&mut self, len: u32) -> Result<u32> {
        debug_assert!(len <= 32);
        if (len as u64) > self.remaining_bits() {
            return Err(Self::eos());
        }
        let mut value = 0u64;
        let mut remaining = len;
        while remaining > 0 {
            let avail = 8 - self.bit as u32;
            let take = avail.min(remaining);
            let byte = self.data[self.byte] as u32;
            let chunk = (byte >> (avail - take)) & ((1u32 << take) - 1);
            value = (value << take) | chunk as u64;
            self.advance_bits(take as u64);
            remaining -= take;
        }
        Ok(value as u32)
    }

    /// Reads a unary-coded integer.
    pub fn read_unary(&mut self) -> Result<u32> {
        let mut zeros = 0u64;
        loop {
            let byte = *self.data.get(self.byte).ok_or_else(Self::eos)?;
            let window = byte << self.bit;
            if window == 0 {
                zeros += 8 - self.bit as u64;
                self.byte += 1;
                self.bit = 0;
            } else {
                let lz = window.leading_zeros() as u64;
                zeros += lz;
                self.advance_bits(lz + 1);
                break;
            }
            if zeros >= u32::MAX as u64 {
                return Err(Error::format_inconsistency(
                    "unary",
                    "unary code exceeds 32-bit range",
                ));
            }
        }
        Ok((zeros + 1) as u32)
    }

    /// Reads an Elias gamma coded integer.
    pub fn read_gamma(&mut self) -> Result<u32> {
        let low_bits = self.read_unary()? - 1;
        if low_bits > 31 {
            return Err(Error::format_inconsistency(
                "gamma",
                "gamma code exceeds 32-bit range",
            ));
        }
        let low = self.read_binary(low_bits)?;
        Ok(((1u64 << low_bits) as u32) | low)
    }

    pub fn skip_bits(&mut self, bits: u64) -> Result<()> {
        if bits > self.remaining_bits() {
            return Err(Self::eos());
        }
        self.advance_bits(bits);
        Ok(())
    }

    pub fn skip_unary(&mut self) -> Result<()> {
        self.read_unary().map(|_| ())
    }

    pub fn skip_gamma(&mut self) -> Result<()> {
        let low_bits = self.read_unary()? - 1;
        self.skip_bits(low_bits as u64)
    }

    /// Moves to the next byte boundary, skipping padding bits.
    pub fn align(&mut self) {
        if self.bit != 0 {
            self.byte += 1;
            self.bit = 0;
        }
    }

    /// Reads a variable-byte integer. The reader must be byte-aligned.
    pub fn read_vbyte(&mut self) -> Result<u32> {
        debug_assert!(self.is_aligned());
        self.align();
        let rest = self.data.get(self.byte..).ok_or_else(Self::eos)?;
        let (value, consumed) = read_vbyte_from(rest)?;
        self.byte += consumed;
        Ok(value)
    }

    /// Borrows the next `len` bytes. The reader must be byte-aligned.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        debug_assert!(self.is_aligned());
        self.align();
        let end = self.byte.checked_add(len).ok_or_else(Self::eos)?;
        let bytes = self.data.get(self.byte..end).ok_or_else(Self::eos)?;
        self.byte = end;
        Ok(bytes)
    }
}
