use quarry_common::Result;

use super::{CodecKind, IntegerCodec, check_count, read_bit_block_header, write_bit_block_header};
use crate::bit_io::{BitReader, BitWriter};

/// Unary codec: cheapest for values that are almost always 1 or 2, such as term
/// frequencies in short documents and block counts.
pub struct UnaryCodec;

impl IntegerCodec for UnaryCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Unary
    }

    fn encode(&self, values: &[u32], out: &mut BitWriter) -> Result<()> {
        write_bit_block_header(values.len(), out)?;
        for &value in values {
            out.write_unary(value)?;
        }
        Ok(())
    }

    fn decode(&self, input: &mut BitReader<'_>, out: &mut [u32], count: usize) -> Result<()> {
        let declared = read_bit_block_header(input)?;
        check_count(self.kind(), declared, count, out)?;
        for slot in &mut out[..count] {
            *slot = input.read_unary()?;
        }
        Ok(())
    }

    fn skip(&self, input: &mut BitReader<'_>) -> Result<()> {
        let count = read_bit_block_header(input)?;
        for _ in 0..count {
            input.skip_unary()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let values = [1u32, 1, 2, 3, 1, 17, 64];
        let mut writer = BitWriter::new();
        UnaryCodec.encode(&values, &mut writer).unwrap();
        let bytes = writer.into_bytes();

        let mut out = [0u32; 7];
        UnaryCodec
            .decode(&mut BitReader::new(&bytes), &mut out, values.len())
            .unwrap();
        assert_eq!(out, values);
    }

    #[test]
    fn test_zero_rejected() {
        let mut writer = BitWriter::new();
        assert!(UnaryCodec.encode(&[1, 0], &mut writer).is_err());
    }
}
