//! Iterator over the posting-major bit format.

use quarry_common::{DocId, Result, error::Error};
use quarry_compression::{BitPosition, BitReader};

use super::iterator::{DocumentLookup, END_OF_LIST, IteratorState, PostingIterator};

/// Decodes one bit-format posting list lazily.
///
/// `BLOCKS` and `FIELDS` select the payload layout once, at open time, so the decode
/// loop carries no per-posting layout checks.
pub struct BitPostingIterator<const BLOCKS: bool, const FIELDS: bool> {
    data: Vec<u8>,
    position: BitPosition,
    entries: u32,
    decoded: u32,
    state: IteratorState,
    id: DocId,
    frequency: u32,
    positions: Vec<u32>,
    field_count: usize,
    field_frequencies: Vec<u32>,
    documents: DocumentLookup,
}

impl<const BLOCKS: bool, const FIELDS: bool> BitPostingIterator<BLOCKS, FIELDS> {
    /// Creates an iterator over `entries` postings starting at bit `start` of `data`.
    pub fn new(
        data: Vec<u8>,
        start: BitPosition,
        entries: u32,
        field_count: usize,
        documents: DocumentLookup,
    ) -> Result<Self> {
        // Validates the start position against the region.
        BitReader::at(&data, start)?;
        Ok(BitPostingIterator {
            data,
            position: start,
            entries,
            decoded: 0,
            state: IteratorState::BeforeFirst,
            id: END_OF_LIST,
            frequency: 0,
            positions: Vec::new(),
            field_count: if FIELDS { field_count } else { 0 },
            field_frequencies: Vec::with_capacity(field_count),
            documents,
        })
    }

    fn finish(&mut self) -> DocId {
        self.state = IteratorState::EndOfList;
        self.id = END_OF_LIST;
        self.frequency = 0;
        self.positions.clear();
        self.field_frequencies.clear();
        END_OF_LIST
    }

    /// Decodes the id and frequency of the next posting; the payload is left unread.
    fn read_head(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        let gap = reader.read_gamma()? as i64;
        let previous = match self.state {
            IteratorState::BeforeFirst => -1,
            _ => self.id as i64,
        };
        let id = previous + gap;
        if id >= END_OF_LIST as i64 {
            return Err(Error::format_inconsistency(
                "posting list",
                format!("document id {id} overflows"),
            ));
        }
        self.id = id as DocId;
        self.frequency = reader.read_unary()?;
        self.decoded += 1;
        self.state = IteratorState::Positioned;
        Ok(())
    }

    fn read_payload(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        if BLOCKS {
            let count = reader.read_unary()? - 1;
            self.positions.clear();
            let mut position = -1i64;
            for _ in 0..count {
                position += reader.read_gamma()? as i64;
                self.positions.push(position as u32);
            }
        }
        if FIELDS {
            self.field_frequencies.clear();
            for _ in 0..self.field_count {
                self.field_frequencies.push(reader.read_unary()? - 1);
            }
        }
        Ok(())
    }

    fn skip_payload(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        if BLOCKS {
            let count = reader.read_unary()? - 1;
            for _ in 0..count {
                reader.skip_gamma()?;
            }
        }
        if FIELDS {
            for _ in 0..self.field_count {
                reader.skip_unary()?;
            }
        }
        Ok(())
    }

    fn decode_next(&mut self, data: &[u8]) -> Result<DocId> {
        let mut reader = BitReader::at(data, self.position)?;
        self.read_head(&mut reader)?;
        self.read_payload(&mut reader)?;
        self.position = reader.position();
        Ok(self.id)
    }

    /// Decodes postings until one with id `>= target`, skipping the payload of the
    /// postings passed over. Returns `None` when the list runs out.
    fn decode_until(&mut self, data: &[u8], target: DocId) -> Result<Option<DocId>> {
        let mut reader = BitReader::at(data, self.position)?;
        while self.decoded < self.entries {
            self.read_head(&mut reader)?;
            if self.id >= target {
                self.read_payload(&mut reader)?;
                self.position = reader.position();
                return Ok(Some(self.id));
            }
            self.skip_payload(&mut reader)?;
        }
        self.position = reader.position();
        Ok(None)
    }
}

impl<const BLOCKS: bool, const FIELDS: bool> PostingIterator for BitPostingIterator<BLOCKS, FIELDS> {
    fn next(&mut self) -> Result<DocId> {
        if self.state == IteratorState::EndOfList {
            return Ok(END_OF_LIST);
        }
        if self.decoded == self.entries {
            return Ok(self.finish());
        }
        // The buffer is moved out while decoding so the reader can borrow it
        // alongside `&mut self`.
        let data = std::mem::take(&mut self.data);
        let result = self.decode_next(&data);
        self.data = data;
        result
    }

    fn next_target(&mut self, target: DocId) -> Result<DocId> {
        match self.state {
            IteratorState::EndOfList => return Ok(END_OF_LIST),
            IteratorState::Positioned if self.id >= target => return Ok(self.id),
            _ => {}
        }
        let data = std::mem::take(&mut self.data);
        let result = self.decode_until(&data, target);
        self.data = data;
        match result? {
            Some(id) => Ok(id),
            None => Ok(self.finish()),
        }
    }

    fn id(&self) -> DocId {
        match self.state {
            IteratorState::Positioned => self.id,
            _ => END_OF_LIST,
        }
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn document_length(&self) -> u32 {
        self.documents.length(self.id())
    }

    fn positions(&self) -> &[u32] {
        &self.positions
    }

    fn field_frequencies(&self) -> &[u32] {
        &self.field_frequencies
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
