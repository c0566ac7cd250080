//! Iterator over the chunked, codec-negotiated posting format.
//!
//! A list is a sequence of chunks of up to `chunk_size` postings. Each chunk holds,
//! in order, one self-delimiting codec block per structure:
//!
//! ```text
//! ids      doc gaps (first gap of the list from -1, later chunks continue the chain)
//! tfs      frequencies
//! blocks   position counts + 1, then position gaps (first position + 1)   if BLOCKS
//! fields   field frequencies + 1, posting-major                           if FIELDS
//! ```
//!
//! The id block comes first, so [`PostingIterator::next_target`] can decode only the
//! ids of a chunk and skip the remaining blocks when the whole chunk lies before the
//! target.

use quarry_common::{DocId, Result, error::Error};
use quarry_compression::{BitPosition, BitReader, IntegerCodec};

use super::iterator::{DocumentLookup, END_OF_LIST, IteratorState, PostingIterator};
use crate::config::ChunkCodecs;

pub struct ChunkedPostingIterator<const BLOCKS: bool, const FIELDS: bool> {
    data: Vec<u8>,
    position: BitPosition,
    ids_codec: &'static dyn IntegerCodec,
    tfs_codec: &'static dyn IntegerCodec,
    blocks_codec: &'static dyn IntegerCodec,
    fields_codec: &'static dyn IntegerCodec,
    chunk_size: usize,
    entries: u32,
    /// Postings in the chunks loaded so far, including the current one.
    loaded: u32,
    /// Last id of the previous chunk, -1 before the first.
    previous_id: i64,
    state: IteratorState,
    field_count: usize,
    /// Index of the current posting in the chunk buffers.
    index: usize,
    ids: Vec<u32>,
    tfs: Vec<u32>,
    counts: Vec<u32>,
    /// `position_offsets[i]..position_offsets[i + 1]` are the positions of posting `i`.
    position_offsets: Vec<usize>,
    positions: Vec<u32>,
    fields: Vec<u32>,
    documents: DocumentLookup,
}

impl<const BLOCKS: bool, const FIELDS: bool> ChunkedPostingIterator<BLOCKS, FIELDS> {
    pub fn new(
        data: Vec<u8>,
        start: BitPosition,
        entries: u32,
        field_count: usize,
        codecs: &ChunkCodecs,
        documents: DocumentLookup,
    ) -> Result<Self> {
        BitReader::at(&data, start)?;
        if codecs.chunk_size == 0 {
            return Err(Error::invalid_arg("chunk_size", "must be positive"));
        }
        Ok(ChunkedPostingIterator {
            data,
            position: start,
            ids_codec: codecs.ids.codec(),
            tfs_codec: codecs.tfs.codec(),
            blocks_codec: codecs.blocks.codec(),
            fields_codec: codecs.fields.codec(),
            chunk_size: codecs.chunk_size,
            entries,
            loaded: 0,
            previous_id: -1,
            state: IteratorState::BeforeFirst,
            field_count: if FIELDS { field_count } else { 0 },
            index: 0,
            ids: Vec::new(),
            tfs: Vec::new(),
            counts: Vec::new(),
            position_offsets: Vec::new(),
            positions: Vec::new(),
            fields: Vec::new(),
            documents,
        })
    }

    fn finish(&mut self) -> DocId {
        self.state = IteratorState::EndOfList;
        self.ids.clear();
        self.tfs.clear();
        self.positions.clear();
        self.position_offsets.clear();
        self.fields.clear();
        self.index = 0;
        END_OF_LIST
    }

    fn invalid(message: String) -> Error {
        Error::format_inconsistency("posting chunk", message)
    }

    /// Loads the next chunk whose last id is `>= target`, skipping chunks that lie
    /// entirely before it. Returns `false` once the list is exhausted.
    fn load_chunk(&mut self, data: &[u8], target: DocId) -> Result<bool> {
        let mut reader = BitReader::at(data, self.position)?;
        loop {
            let remaining = self.entries - self.loaded;
            if remaining == 0 {
                self.position = reader.position();
                return Ok(false);
            }
            let count = (remaining as usize).min(self.chunk_size);

            self.ids.resize(count, 0);
            self.ids_codec.decode(&mut reader, &mut self.ids, count)?;
            let mut id = self.previous_id;
            for slot in self.ids.iter_mut() {
                id += *slot as i64;
                if *slot == 0 || id >= END_OF_LIST as i64 {
                    return Err(Self::invalid(format!("invalid document gap {}", *slot)));
                }
                *slot = id as u32;
            }
            self.previous_id = id;
            self.loaded += count as u32;

            if (id as u64) < target as u64 {
                log::trace!("skipping chunk of {count} postings ending at {id}");
                self.tfs_codec.skip(&mut reader)?;
                if BLOCKS {
                    self.blocks_codec.skip(&mut reader)?;
                    self.blocks_codec.skip(&mut reader)?;
                }
                if FIELDS {
                    self.fields_codec.skip(&mut reader)?;
                }
                continue;
            }

            self.tfs.resize(count, 0);
            self.tfs_codec.decode(&mut reader, &mut self.tfs, count)?;
            if BLOCKS {
                self.decode_positions(&mut reader, count)?;
            }
            if FIELDS {
                let values = count * self.field_count;
                self.fields.resize(values, 0);
                self.fields_codec
                    .decode(&mut reader, &mut self.fields, values)?;
                for value in self.fields.iter_mut() {
                    *value = value
                        .checked_sub(1)
                        .ok_or_else(|| Self::invalid("unbiased field frequency".into()))?;
                }
            }
            self.position = reader.position();
            self.index = 0;
            return Ok(true);
        }
    }

    fn decode_positions(&mut self, reader: &mut BitReader<'_>, count: usize) -> Result<()> {
        self.counts.resize(count, 0);
        self.blocks_codec.decode(reader, &mut self.counts, count)?;
        self.position_offsets.clear();
        self.position_offsets.push(0);
        let mut total = 0usize;
        for &count in &self.counts {
            let count = count
                .checked_sub(1)
                .ok_or_else(|| Self::invalid("unbiased block count".into()))?;
            total += count as usize;
            self.position_offsets.push(total);
        }
        self.positions.resize(total, 0);
        self.blocks_codec
            .decode(reader, &mut self.positions, total)?;
        for window in self.position_offsets.windows(2) {
            let mut position = -1i64;
            for slot in &mut self.positions[window[0]..window[1]] {
                position += *slot as i64;
                *slot = position as u32;
            }
        }
        Ok(())
    }

    fn current(&self) -> Option<usize> {
        (self.state == IteratorState::Positioned).then_some(self.index)
    }
}

impl<const BLOCKS: bool, const FIELDS: bool> PostingIterator
    for ChunkedPostingIterator<BLOCKS, FIELDS>
{
    fn next(&mut self) -> Result<DocId> {
        match self.state {
            IteratorState::EndOfList => return Ok(END_OF_LIST),
            IteratorState::Positioned if self.index + 1 < self.ids.len() => {
                self.index += 1;
                return Ok(self.ids[self.index]);
            }
            _ => {}
        }
        let data = std::mem::take(&mut self.data);
        let loaded = self.load_chunk(&data, 0);
        self.data = data;
        if loaded? {
            self.state = IteratorState::Positioned;
            Ok(self.ids[0])
        } else {
            Ok(self.finish())
        }
    }

    fn next_target(&mut self, target: DocId) -> Result<DocId> {
        match self.state {
            IteratorState::EndOfList => return Ok(END_OF_LIST),
            IteratorState::Positioned => {
                if self.ids[self.index] >= target {
                    return Ok(self.ids[self.index]);
                }
                if self.ids.last().is_some_and(|&last| last >= target) {
                    self.index += self.ids[self.index..].partition_point(|&id| id < target);
                    return Ok(self.ids[self.index]);
                }
            }
            IteratorState::BeforeFirst => {}
        }
        let data = std::mem::take(&mut self.data);
        let loaded = self.load_chunk(&data, target);
        self.data = data;
        if loaded? {
            self.state = IteratorState::Positioned;
            self.index = self.ids.partition_point(|&id| id < target);
            Ok(self.ids[self.index])
        } else {
            Ok(self.finish())
        }
    }

    fn id(&self) -> DocId {
        self.current().map_or(END_OF_LIST, |i| self.ids[i])
    }

    fn frequency(&self) -> u32 {
        self.current().map_or(0, |i| self.tfs[i])
    }

    fn document_length(&self) -> u32 {
        self.documents.length(self.id())
    }

    fn positions(&self) -> &[u32] {
        match self.current() {
            Some(i) if BLOCKS => {
                &self.positions[self.position_offsets[i]..self.position_offsets[i + 1]]
            }
            _ => &[],
        }
    }

    fn field_frequencies(&self) -> &[u32] {
        match self.current() {
            Some(i) if FIELDS => &self.fields[i * self.field_count..(i + 1) * self.field_count],
            _ => &[],
        }
    }

    fn field_lengths(&self) -> &[u32] {
        self.documents.field_lengths(self.id())
    }

    fn state(&self) -> IteratorState {
        self.state
    }

    fn entry_count(&self) -> u32 {
        self.entries
    }

    fn has_positions(&self) -> bool {
        BLOCKS
    }

    fn close(&mut self) {
        self.data = Vec::new();
        self.finish();
    }
}
