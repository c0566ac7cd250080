//! Integer codecs for posting structures.
//!
//! Each physical posting structure (document-id gaps, term frequencies, block counts,
//! positions, field frequencies) names the codec it was written with, and readers build
//! their decoders from that persisted name. The name is effectively the on-disk schema
//! version of the structure.
//!
//! Every encoded block is self-delimiting, so [`IntegerCodec::skip`] can step over a
//! block without materializing its values:
//!
//! - bit codecs (`unary`, `gamma`) prefix the block with `gamma(count + 1)`;
//! - byte codecs (`vbyte`, `pfor`) start on a byte boundary and prefix the payload
//!   with `vbyte(count)` and `vbyte(byte_length)`; the decoder never reads past the
//!   declared length and fails if the payload does not consume it exactly.

use std::{fmt, str::FromStr};

use quarry_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

use crate::bit_io::{BitReader, BitWriter};

pub mod gamma;
pub mod pfor;
pub mod unary;
pub mod vbyte;

/// Number of integers a block codec is designed to hold in one chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum CodecKind {
    Unary = 1,
    Gamma = 2,
    #[serde(rename = "vbyte")]
    VariableByte = 3,
    #[serde(rename = "pfor")]
    PFor = 4,
}

impl CodecKind {
    pub const ALL: [CodecKind; 4] = [
        CodecKind::Unary,
        CodecKind::Gamma,
        CodecKind::VariableByte,
        CodecKind::PFor,
    ];

    /// Configuration name of the codec.
    pub fn name(&self) -> &'static str {
        match self {
            CodecKind::Unary => "unary",
            CodecKind::Gamma => "gamma",
            CodecKind::VariableByte => "vbyte",
            CodecKind::PFor => "pfor",
        }
    }

    /// Whether the codec operates on whole bytes (and therefore aligns the stream).
    pub fn is_byte_oriented(&self) -> bool {
        matches!(self, CodecKind::VariableByte | CodecKind::PFor)
    }

    /// Returns the shared, stateless codec instance for this kind.
    pub fn codec(&self) -> &'static dyn IntegerCodec {
        static UNARY: unary::UnaryCodec = unary::UnaryCodec;
        static GAMMA: gamma::GammaCodec = gamma::GammaCodec;
        static VBYTE: vbyte::VariableByteCodec = vbyte::VariableByteCodec;
        static PFOR: pfor::PForCodec = pfor::PForCodec;
        match self {
            CodecKind::Unary => &UNARY,
            CodecKind::Gamma => &GAMMA,
            CodecKind::VariableByte => &VBYTE,
            CodecKind::PFor => &PFOR,
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodecKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "unary" => Ok(CodecKind::Unary),
            "gamma" => Ok(CodecKind::Gamma),
            "vbyte" | "variable-byte" | "vint" => Ok(CodecKind::VariableByte),
            "pfor" | "pfordelta" => Ok(CodecKind::PFor),
            _ => Err(Error::invalid_arg(
                "codec",
                format!("unknown integer codec '{name}'"),
            )),
        }
    }
}

impl TryFrom<u16> for CodecKind {
    type Error = ();

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(CodecKind::Unary),
            2 => Ok(CodecKind::Gamma),
            3 => Ok(CodecKind::VariableByte),
            4 => Ok(CodecKind::PFor),
            _ => Err(()),
        }
    }
}

/// Looks up a codec by its configuration name.
pub fn create_codec(name: &str) -> Result<&'static dyn IntegerCodec> {
    Ok(name.parse::<CodecKind>()?.codec())
}

/// Encoder/decoder of self-delimiting blocks of unsigned integers.
pub trait IntegerCodec: Send + Sync + 'static {
    fn kind(&self) -> CodecKind;

    /// Appends one block holding all of `values` to `out`.
    fn encode(&self, values: &[u32], out: &mut BitWriter) -> Result<()>;

    /// Decodes the next block into `out[..count]`.
    ///
    /// Fails with a format inconsistency when the block declares a different element
    /// count than `count`.
    fn decode(&self, input: &mut BitReader<'_>, out: &mut [u32], count: usize) -> Result<()>;

    /// Advances `input` past the next block without materializing it.
    fn skip(&self, input: &mut BitReader<'_>) -> Result<()>;

    /// Decodes the next block into a freshly sized vector, taking the element count from
    /// the block header.
    fn decode_block(&self, input: &mut BitReader<'_>, out: &mut Vec<u32>) -> Result<()> {
        let count = self.peek_count(input)?;
        out.clear();
        out.resize(count, 0);
        self.decode(input, out, count)
    }

    /// Reads the element count declared by the next block without consuming it.
    fn peek_count(&self, input: &BitReader<'_>) -> Result<usize> {
        let mut probe = input.clone();
        if self.kind().is_byte_oriented() {
            probe.align();
            Ok(probe.read_vbyte()? as usize)
        } else {
            Ok(probe.read_gamma()? as usize - 1)
        }
    }
}

/// Checks the output slice and the declared block count against the requested count.
pub(crate) fn check_count(
    codec: CodecKind,
    declared: usize,
    count: usize,
    out: &[u32],
) -> Result<()> {
    if declared != count {
        return Err(Error::format_inconsistency(
            codec.name(),
            format!("block declares {declared} values, {count} requested"),
        ));
    }
    if out.len() < count {
        return Err(Error::invalid_arg(
            "out",
            format!("output holds {} values, {count} requested", out.len()),
        ));
    }
    Ok(())
}

/// Writes the `gamma(count + 1)` prefix of a bit-codec block.
pub(crate) fn write_bit_block_header(count: usize, out: &mut BitWriter) -> Result<()> {
    let count = u32::try_from(count)
        .ok()
        .and_then(|c| c.checked_add(1))
        .ok_or_else(|| Error::invalid_arg("values", "block too large"))?;
    out.write_gamma(count)
}

/// Reads the `gamma(count + 1)` prefix of a bit-codec block.
pub(crate) fn read_bit_block_header(input: &mut BitReader<'_>) -> Result<usize> {
    Ok(input.read_gamma()? as usize - 1)
}

/// Writes a byte-codec block: alignment, `vbyte(count)`, `vbyte(byte_length)`, payload.
pub(crate) fn write_byte_block(count: usize, payload: &[u8], out: &mut BitWriter) -> Result<()> {
    let count =
        u32::try_from(count).map_err(|_| Error::invalid_arg("values", "block too large"))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| Error::invalid_arg("values", "block payload too large"))?;
    out.align();
    out.write_vbyte(count);
    out.write_vbyte(len);
    out.write_bytes(payload);
    Ok(())
}

/// Reads a byte-codec block header and borrows its declared payload.
pub(crate) fn read_byte_block<'a>(input: &mut BitReader<'a>) -> Result<(usize, &'a [u8])> {
    input.align();
    let count = input.read_vbyte()? as usize;
    let len = input.read_vbyte()? as usize;
    let payload = input.read_bytes(len)?;
    Ok((count, payload))
}
