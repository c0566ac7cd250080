use quarry_common::Result;

use super::{CodecKind, IntegerCodec, check_count, read_bit_block_header, write_bit_block_header};
use crate::bit_io::{BitReader, BitWriter};

/// Elias gamma codec, the default for document-id and position gaps.
pub struct GammaCodec;

impl IntegerCodec for GammaCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::Gamma
    }

    fn encode(&self, values: &[u32], out: &mut BitWriter) -> Result<()> {
        write_bit_block_header(values.len(), out)?;
        for &value in values {
            out.write_gamma(value)?;
        }
        Ok(())
    }

    fn decode(&self, input: &mut BitReader<'_>, out: &mut [u32], count: usize) -> Result<()> {
        let declared = read_bit_block_header(input)?;
        check_count(self.kind(), declared, count, out)?;
        for slot in &mut out[..count] {
            *slot = input.read_gamma()?;
        }
        Ok(())
    }

    fn skip(&self, input: &mut BitReader<'_>) -> Result<()> {
        let count = read_bit_block_header(input)?;
        for _ in 0..count {
            input.skip_gamma()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_trailing_data() {
        let values = [1u32, 2, 3, 1 << 20, (1 << 22) + 5, u32::MAX];
        let mut writer = BitWriter::new();
        GammaCodec.encode(&values, &mut writer).unwrap();
        writer.write_binary(5, 0b10110);
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        let mut out = vec![0u32; values.len()];
        GammaCodec.decode(&mut reader, &mut out, values.len()).unwrap();
        assert_eq!(out, values);
        assert_eq!(reader.read_binary(5).unwrap(), 0b10110);
    }

    #[test]
    fn test_empty_block() {
        let mut writer = BitWriter::new();
        GammaCodec.encode(&[], &mut writer).unwrap();
        let bytes = writer.into_bytes();
        let mut out = Vec::new();
        GammaCodec
            .decode_block(&mut BitReader::new(&bytes), &mut out)
            .unwrap();
        assert!(out.is_empty());
    }
}
