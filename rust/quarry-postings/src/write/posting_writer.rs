//! Posting list encoder for both posting formats.
//!
//! Bit format, per posting:
//!
//! ```text
//! gamma(doc gap)  unary(tf)  [unary(count + 1) gamma(first position + 1) gamma(gap)...]
//!                            [unary(field tf + 1)...]
//! ```
//!
//! The first doc gap of a list is taken from a virtual previous id of -1. Lists are
//! packed back to back without alignment, so a list may start mid-byte.
//!
//! Chunked lists start on a byte boundary; see [`crate::read::chunked`] for their
//! layout.

use quarry_common::Result;
use quarry_compression::BitWriter;

use crate::{
    config::{ChunkCodecs, PostingEncoding},
    layout::PostingLayout,
    pointer::BitIndexPointer,
    posting::{Posting, validate_postings},
};

/// Appends posting lists to one posting file buffer.
pub struct PostingListWriter {
    out: BitWriter,
    layout: PostingLayout,
    encoding: PostingEncoding,
    lists: usize,
}

impl PostingListWriter {
    pub fn new(layout: PostingLayout, encoding: PostingEncoding) -> PostingListWriter {
        PostingListWriter {
            out: BitWriter::new(),
            layout,
            encoding,
            lists: 0,
        }
    }

    pub fn layout(&self) -> PostingLayout {
        self.layout
    }

    /// Number of lists written so far.
    pub fn lists(&self) -> usize {
        self.lists
    }

    /// Bytes of the file buffer, including a trailing partial byte.
    pub fn byte_len(&self) -> usize {
        self.out.byte_len()
    }

    /// Encodes one list and returns its location.
    pub fn write_list(&mut self, postings: &[Posting]) -> Result<BitIndexPointer> {
        validate_postings(postings, &self.layout)?;
        if let PostingEncoding::Chunked(_) = self.encoding {
            self.out.align();
        }
        let start = self.out.position();
        match self.encoding {
            PostingEncoding::Bit => self.write_bit_list(postings)?,
            PostingEncoding::Chunked(codecs) => self.write_chunked_list(postings, &codecs)?,
        }
        self.lists += 1;
        Ok(BitIndexPointer {
            byte_offset: start.byte_offset,
            bit_offset: start.bit_offset,
            number_of_entries: postings.len() as u32,
            byte_length: self.out.byte_len() as u64 - start.byte_offset,
        })
    }

    /// Returns the encoded file contents.
    pub fn finish(self) -> Vec<u8> {
        self.out.into_bytes()
    }

    fn write_bit_list(&mut self, postings: &[Posting]) -> Result<()> {
        let mut previous = -1i64;
        for posting in postings {
            self.out.write_gamma((posting.id as i64 - previous) as u32)?;
            previous = posting.id as i64;
            self.out.write_unary(posting.frequency)?;
            if self.layout.blocks {
                self.out.write_unary(posting.positions.len() as u32 + 1)?;
                let mut previous_position = -1i64;
                for &position in &posting.positions {
                    self.out
                        .write_gamma((position as i64 - previous_position) as u32)?;
                    previous_position = position as i64;
                }
            }
            if self.layout.has_fields() {
                for &tf in &posting.field_frequencies {
                    self.out.write_unary(tf + 1)?;
                }
            }
        }
        Ok(())
    }

    fn write_chunked_list(&mut self, postings: &[Posting], codecs: &ChunkCodecs) -> Result<()> {
        let mut previous = -1i64;
        let mut values = Vec::with_capacity(codecs.chunk_size);
        for chunk in postings.chunks(codecs.chunk_size) {
            values.clear();
            for posting in chunk {
                values.push((posting.id as i64 - previous) as u32);
                previous = posting.id as i64;
            }
            codecs.ids.codec().encode(&values, &mut self.out)?;

            values.clear();
            values.extend(chunk.iter().map(|p| p.frequency));
            codecs.tfs.codec().encode(&values, &mut self.out)?;

            if self.layout.blocks {
                values.clear();
                values.extend(chunk.iter().map(|p| p.positions.len() as u32 + 1));
                codecs.blocks.codec().encode(&values, &mut self.out)?;

                values.clear();
                for posting in chunk {
                    let mut previous_position = -1i64;
                    for &position in &posting.positions {
                        values.push((position as i64 - previous_position) as u32);
                        previous_position = position as i64;
                    }
                }
                codecs.blocks.codec().encode(&values, &mut self.out)?;
            }

            if self.layout.has_fields() {
                values.clear();
                for posting in chunk {
                    values.extend(posting.field_frequencies.iter().map(|&tf| tf + 1));
                }
                codecs.fields.codec().encode(&values, &mut self.out)?;
            }
        }
        log::trace!(
            "chunked list of {} postings, {} chunks",
            postings.len(),
            postings.len().div_ceil(codecs.chunk_size)
        );
        Ok(())
    }
}
