//! Patched frame-of-reference (PFOR) block codec.
//!
//! A block stores every value's low `width` bits in a dense bit-packed frame and keeps
//! the few values that do not fit as exceptions. Block payload layout, after the common
//! `vbyte(count) vbyte(byte_length)` header:
//!
//! ```text
//! width: u8
//! vbyte(exception_count)
//! packed frame: count * width bits, zero padded to a byte boundary
//! exceptions: (vbyte(index_gap), vbyte(value >> width)) * exception_count
//! ```
//!
//! Exception indices are gap-encoded from the previous exception (the first from zero).
//! The width is chosen per block to minimize the estimated encoded size, which puts
//! rare large gaps into the exception list instead of widening the whole frame.

use quarry_common::{Result, error::Error};

use super::{CodecKind, IntegerCodec, check_count, read_byte_block, write_byte_block};
use crate::bit_io::{BitReader, BitWriter, read_vbyte_from, write_vbyte_to};

/// Estimated cost of one exception in bits (index gap plus high part, both vbyte).
const EXCEPTION_COST_BITS: u64 = 24;

pub struct PForCodec;

impl PForCodec {
    /// Picks the frame width minimizing `count * width + exceptions * cost`.
    fn choose_width(values: &[u32]) -> u32 {
        let mut histogram = [0u64; 33];
        for &value in values {
            histogram[(32 - value.leading_zeros()) as usize] += 1;
        }
        let count = values.len() as u64;
        let mut best_width = 32;
        let mut best_cost = u64::MAX;
        // Values needing more than `width` bits become exceptions.
        let mut exceptions = 0u64;
        for width in (0..=32u32).rev() {
            let cost = count * width as u64 + exceptions * EXCEPTION_COST_BITS;
            if cost <= best_cost {
                best_cost = cost;
                best_width = width;
            }
            exceptions += histogram[width as usize];
        }
        best_width
    }

    fn encode_payload(values: &[u32], width: u32) -> Vec<u8> {
        let mask = if width == 32 {
            u32::MAX
        } else {
            (1u32 << width) - 1
        };
        let exceptions = values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| width < 32 && v > mask)
            .map(|(i, &v)| (i, v >> width))
            .collect::<Vec<_>>();

        let mut frame = BitWriter::with_capacity((values.len() * width as usize).div_ceil(8));
        for &value in values {
            frame.write_binary(width, value & mask);
        }

        let mut payload = Vec::with_capacity(frame.byte_len() + 2 + exceptions.len() * 3);
        payload.push(width as u8);
        write_vbyte_to(&mut payload, exceptions.len() as u32);
        payload.extend_from_slice(frame.as_bytes());
        let mut last = 0;
        for (index, high) in exceptions {
            write_vbyte_to(&mut payload, (index - last) as u32);
            write_vbyte_to(&mut payload, high);
            last = index;
        }
        payload
    }

    fn decode_payload(payload: &[u8], out: &mut [u32]) -> Result<()> {
        let invalid = |message: String| Error::format_inconsistency(CodecKind::PFor.name(), message);

        let (&width, rest) = payload
            .split_first()
            .ok_or_else(|| invalid("missing frame width".into()))?;
        let width = width as u32;
        if width > 32 {
            return Err(invalid(format!("frame width {width} exceeds 32 bits")));
        }
        let (exception_count, consumed) = read_vbyte_from(rest)?;
        let rest = &rest[consumed..];

        let frame_len = (out.len() * width as usize).div_ceil(8);
        if frame_len > rest.len() {
            return Err(invalid(format!(
                "frame of {frame_len} bytes exceeds payload of {} bytes",
                rest.len()
            )));
        }
        let mut frame = BitReader::new(&rest[..frame_len]);
        for slot in out.iter_mut() {
            *slot = frame.read_binary(width)?;
        }

        let mut tail = &rest[frame_len..];
        let mut index = 0usize;
        for _ in 0..exception_count {
            let (gap, consumed) = read_vbyte_from(tail)?;
            tail = &tail[consumed..];
            let (high, consumed) = read_vbyte_from(tail)?;
            tail = &tail[consumed..];
            index += gap as usize;
            let slot = out
                .get_mut(index)
                .ok_or_else(|| invalid(format!("exception index {index} out of block")))?;
            if width >= 32 {
                return Err(invalid("exception in a full-width frame".into()));
            }
            *slot |= high << width;
        }
        if !tail.is_empty() {
            return Err(invalid(format!(
                "{} trailing bytes after exceptions",
                tail.len()
            )));
        }
        Ok(())
    }
}

impl IntegerCodec for PForCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::PFor
    }

    fn encode(&self, values: &[u32], out: &mut BitWriter) -> Result<()> {
        let width = Self::choose_width(values);
        let payload = Self::encode_payload(values, width);
        log::trace!(
            "pfor block: {} values, width {width}, {} bytes",
            values.len(),
            payload.len()
        );
        write_byte_block(values.len(), &payload, out)
    }

    fn decode(&self, input: &mut BitReader<'_>, out: &mut [u32], count: usize) -> Result<()> {
        let (declared, payload) = read_byte_block(input)?;
        check_count(self.kind(), declared, count, out)?;
        Self::decode_payload(payload, &mut out[..count])
    }

    fn skip(&self, input: &mut BitReader<'_>) -> Result<()> {
        read_byte_block(input).map(|_| ())
    }
}
