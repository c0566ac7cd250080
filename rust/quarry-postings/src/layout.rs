//! Posting record layout.
//!
//! The layout of one posting is fixed per physical structure when the index is built
//! and recorded in the index properties:
//!
//! ```text
//! basic        doc gap, tf
//! block        doc gap, tf, block count, positions
//! field        doc gap, tf, field tfs
//! block+field  doc gap, tf, block count, positions, field tfs
//! ```

use std::fmt;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Payload variant of a posting structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostingType {
    Basic,
    Block,
    Field,
    BlockField,
}

impl PostingType {
    pub fn has_blocks(&self) -> bool {
        matches!(self, PostingType::Block | PostingType::BlockField)
    }

    pub fn has_fields(&self) -> bool {
        matches!(self, PostingType::Field | PostingType::BlockField)
    }
}

impl fmt::Display for PostingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PostingType::Basic => "basic",
            PostingType::Block => "block",
            PostingType::Field => "field",
            PostingType::BlockField => "block+field",
        })
    }
}

/// Which optional payloads a posting carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct PostingLayout {
    /// Postings carry the positions (blocks) of every occurrence.
    pub blocks: bool,
    /// Number of per-field term frequencies stored with each posting; zero for
    /// indexes without fields.
    pub field_count: usize,
}

impl PostingLayout {
    pub fn new(blocks: bool, field_count: usize) -> PostingLayout {
        PostingLayout {
            blocks,
            field_count,
        }
    }

    pub fn basic() -> PostingLayout {
        PostingLayout::default()
    }

    pub fn has_fields(&self) -> bool {
        self.field_count > 0
    }

    pub fn posting_type(&self) -> PostingType {
        match (self.blocks, self.has_fields()) {
            (false, false) => PostingType::Basic,
            (true, false) => PostingType::Block,
            (false, true) => PostingType::Field,
            (true, true) => PostingType::BlockField,
        }
    }
}

/// Physical encoding of posting lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingFormat {
    /// Posting-major bit stream: gamma doc gaps, unary frequencies, unary/gamma
    /// block and field payloads.
    #[default]
    Bit,
    /// Structure-major chunks, each structure encoded with its configured codec.
    Chunked,
}
