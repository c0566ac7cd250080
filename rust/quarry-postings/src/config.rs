//! Codec negotiation for the posting structures of an index.
//!
//! Every physical structure names the codec it is written with. The names are
//! persisted in `properties.json` next to the posting files, and readers build their
//! decoders from the persisted names only, never from the reader's own defaults.

use quarry_common::{Result, verify_arg};
use quarry_compression::{CodecKind, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};

use crate::layout::PostingFormat;

/// Compression settings of an index, one codec per physical structure.
///
/// Serialized with the configuration key names:
///
/// ```json
/// {
///   "compression.format": "chunked",
///   "compression.inverted.ids.codec": "pfor",
///   "compression.chunk.size": 1024
/// }
/// ```
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    #[serde(rename = "compression.format")]
    pub format: PostingFormat,
    #[serde(rename = "compression.direct.ids.codec")]
    pub direct_ids: CodecKind,
    #[serde(rename = "compression.direct.tfs.codec")]
    pub direct_tfs: CodecKind,
    #[serde(rename = "compression.inverted.ids.codec")]
    pub inverted_ids: CodecKind,
    #[serde(rename = "compression.inverted.tfs.codec")]
    pub inverted_tfs: CodecKind,
    #[serde(rename = "compression.blocks.codec")]
    pub blocks: CodecKind,
    #[serde(rename = "compression.fields.codec")]
    pub fields: CodecKind,
    #[serde(rename = "compression.chunk.size")]
    pub chunk_size: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig {
            format: PostingFormat::Bit,
            direct_ids: CodecKind::Gamma,
            direct_tfs: CodecKind::Unary,
            inverted_ids: CodecKind::Gamma,
            inverted_tfs: CodecKind::Unary,
            blocks: CodecKind::Gamma,
            fields: CodecKind::Unary,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// The two posting structures of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Structure {
    /// Term to documents.
    Inverted,
    /// Document to terms.
    Direct,
}

impl Structure {
    pub fn file_name(&self) -> &'static str {
        match self {
            Structure::Inverted => "inverted.bf",
            Structure::Direct => "direct.bf",
        }
    }
}

impl CompressionConfig {
    /// A chunked configuration using `codec` for identifiers and positions.
    pub fn chunked(codec: CodecKind) -> CompressionConfig {
        CompressionConfig {
            format: PostingFormat::Chunked,
            direct_ids: codec,
            inverted_ids: codec,
            blocks: codec,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(chunk_size, self.chunk_size > 0);
        Ok(())
    }

    /// Resolves the encoding of one posting structure.
    pub fn encoding(&self, structure: Structure) -> PostingEncoding {
        match self.format {
            PostingFormat::Bit => PostingEncoding::Bit,
            PostingFormat::Chunked => {
                let (ids, tfs) = match structure {
                    Structure::Inverted => (self.inverted_ids, self.inverted_tfs),
                    Structure::Direct => (self.direct_ids, self.direct_tfs),
                };
                PostingEncoding::Chunked(ChunkCodecs {
                    ids,
                    tfs,
                    blocks: self.blocks,
                    fields: self.fields,
                    chunk_size: self.chunk_size,
                })
            }
        }
    }
}

/// Codecs of the structures inside one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCodecs {
    pub ids: CodecKind,
    pub tfs: CodecKind,
    pub blocks: CodecKind,
    pub fields: CodecKind,
    pub chunk_size: usize,
}

/// Resolved encoding of one posting structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingEncoding {
    Bit,
    Chunked(ChunkCodecs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_keys() {
        let config: CompressionConfig = serde_json::from_str(
            r#"{
                "compression.format": "chunked",
                "compression.inverted.ids.codec": "pfor",
                "compression.direct.tfs.codec": "vbyte",
                "compression.chunk.size": 128
            }"#,
        )
        .unwrap();
        assert_eq!(config.format, PostingFormat::Chunked);
        assert_eq!(config.inverted_ids, CodecKind::PFor);
        assert_eq!(config.direct_tfs, CodecKind::VariableByte);
        assert_eq!(config.blocks, CodecKind::Gamma);
        assert_eq!(config.chunk_size, 128);

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["compression.inverted.ids.codec"], "pfor");
        assert_eq!(json["compression.fields.codec"], "unary");
    }

    #[test]
    fn test_encoding_per_structure() {
        let config = CompressionConfig {
            direct_ids: CodecKind::VariableByte,
            ..CompressionConfig::chunked(CodecKind::PFor)
        };
        let PostingEncoding::Chunked(direct) = config.encoding(Structure::Direct) else {
            panic!("expected chunked encoding");
        };
        assert_eq!(direct.ids, CodecKind::VariableByte);
        let PostingEncoding::Chunked(inverted) = config.encoding(Structure::Inverted) else {
            panic!("expected chunked encoding");
        };
        assert_eq!(inverted.ids, CodecKind::PFor);
        assert_eq!(
            CompressionConfig::default().encoding(Structure::Inverted),
            PostingEncoding::Bit
        );
    }

    #[test]
    fn test_unknown_codec_rejected() {
        let result = serde_json::from_str::<CompressionConfig>(
            r#"{"compression.blocks.codec": "lz4"}"#,
        );
        assert!(result.is_err());
        let config = CompressionConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
