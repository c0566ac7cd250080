use bincode::{Decode, Encode};
use quarry_compression::BitPosition;
use serde::{Deserialize, Serialize};

/// Location of one posting list inside a posting file.
///
/// The list starts at bit `bit_offset` of byte `byte_offset` and its encoded bits lie
/// within `byte_length` bytes from `byte_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct BitIndexPointer {
    pub byte_offset: u64,
    pub bit_offset: u8,
    pub number_of_entries: u32,
    pub byte_length: u64,
}

impl BitIndexPointer {
    pub fn start(&self) -> BitPosition {
        BitPosition::new(self.byte_offset, self.bit_offset)
    }

    pub fn byte_range(&self) -> std::ops::Range<u64> {
        self.byte_offset..self.byte_offset + self.byte_length
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_entries == 0
    }
}
