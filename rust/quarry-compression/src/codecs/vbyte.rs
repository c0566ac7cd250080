use quarry_common::{Result, error::Error};

use super::{CodecKind, IntegerCodec, check_count, read_byte_block, write_byte_block};
use crate::bit_io::{BitReader, BitWriter, read_vbyte_from, write_vbyte_to};

/// Variable-byte codec. Blocks declare their byte length so that skipping a block is a
/// single seek.
pub struct VariableByteCodec;

impl IntegerCodec for VariableByteCodec {
    fn kind(&self) -> CodecKind {
        CodecKind::VariableByte
    }

    fn encode(&self, values: &[u32], out: &mut BitWriter) -> Result<()> {
        let mut payload = Vec::with_capacity(values.len() * 2);
        for &value in values {
            write_vbyte_to(&mut payload, value);
        }
        write_byte_block(values.len(), &payload, out)
    }

    fn decode(&self, input: &mut BitReader<'_>, out: &mut [u32], count: usize) -> Result<()> {
        let (declared, payload) = read_byte_block(input)?;
        check_count(self.kind(), declared, count, out)?;
        let mut pos = 0;
        for slot in &mut out[..count] {
            let (value, consumed) = read_vbyte_from(&payload[pos..])?;
            *slot = value;
            pos += consumed;
        }
        if pos != payload.len() {
            return Err(Error::format_inconsistency(
                self.kind().name(),
                format!(
                    "declared {} payload bytes, decoded {pos}",
                    payload.len()
                ),
            ));
        }
        Ok(())
    }

    fn skip(&self, input: &mut BitReader<'_>) -> Result<()> {
        read_byte_block(input).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_zeros() {
        let values = [0u32, 127, 128, 16383, 16384, u32::MAX, 3];
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        VariableByteCodec.encode(&values, &mut writer).unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        let mut out = vec![0u32; values.len()];
        VariableByteCodec
            .decode(&mut reader, &mut out, values.len())
            .unwrap();
        assert_eq!(out, values);
        assert_eq!(reader.remaining_bits(), 0);
    }

    #[test]
    fn test_declared_length_is_a_boundary() {
        // count = 2, byte_length = 1, but the single payload byte holds one value only
        let bytes = [2u8, 1, 5, 6];
        let mut out = [0u32; 2];
        let err = VariableByteCodec
            .decode(&mut BitReader::new(&bytes), &mut out, 2)
            .unwrap_err();
        assert!(err.is_format_inconsistency());

        // count = 1, byte_length = 2, the payload holds trailing garbage
        let bytes = [1u8, 2, 5, 6];
        let mut out = [0u32; 1];
        let err = VariableByteCodec
            .decode(&mut BitReader::new(&bytes), &mut out, 1)
            .unwrap_err();
        assert!(err.is_format_inconsistency());
    }
}
