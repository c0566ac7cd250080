use std::sync::Arc;

use quarry_common::{Result, error::Error};
use quarry_io::ReadAt;

use super::{
    bit::BitPostingIterator,
    chunked::ChunkedPostingIterator,
    iterator::{DocumentLookup, PostingIterator},
    memory::MemoryPostingIterator,
};
use crate::{
    config::{ChunkCodecs, PostingEncoding, Structure},
    layout::PostingLayout,
    pointer::BitIndexPointer,
};

/// Read access to one posting file (inverted or direct).
///
/// Shared by all queries. Opening an iterator reads the list's byte region from
/// storage in one call; decoding then works on the returned buffer without touching
/// the storage again.
#[derive(Clone)]
pub struct PostingIndex {
    storage: Arc<dyn ReadAt>,
    structure: Structure,
    layout: PostingLayout,
    encoding: PostingEncoding,
    documents: DocumentLookup,
}

impl PostingIndex {
    pub fn new(
        storage: Arc<dyn ReadAt>,
        structure: Structure,
        layout: PostingLayout,
        encoding: PostingEncoding,
        documents: DocumentLookup,
    ) -> PostingIndex {
        PostingIndex {
            storage,
            structure,
            layout,
            encoding,
            documents,
        }
    }

    pub fn structure(&self) -> Structure {
        self.structure
    }

    pub fn layout(&self) -> PostingLayout {
        self.layout
    }

    pub fn encoding(&self) -> PostingEncoding {
        self.encoding
    }

    pub fn storage(&self) -> &Arc<dyn ReadAt> {
        &self.storage
    }

    /// Opens an iterator over the list at `pointer`.
    ///
    /// An empty list yields an iterator that reports end-of-list on its first
    /// `next()`, without reading storage.
    pub fn open_iterator(&self, pointer: &BitIndexPointer) -> Result<Box<dyn PostingIterator>> {
        if pointer.is_empty() {
            return Ok(Box::new(
                MemoryPostingIterator::empty().with_positions(self.layout.blocks),
            ));
        }
        let data = self.storage.read_exact_at(pointer.byte_range()).map_err(|e| {
            Error::io(
                format!(
                    "{} list at {}:{}",
                    self.structure.file_name(),
                    pointer.byte_offset,
                    pointer.bit_offset
                ),
                e,
            )
        })?;
        let start = quarry_compression::BitPosition::new(0, pointer.bit_offset);
        let entries = pointer.number_of_entries;
        let fields = self.layout.field_count;
        let documents = self.documents.clone();
        match (self.encoding, self.layout.blocks, self.layout.has_fields()) {
            (PostingEncoding::Bit, false, false) => {
                open_bit::<false, false>(data, start, entries, fields, documents)
            }
            (PostingEncoding::Bit, true, false) => {
                open_bit::<true, false>(data, start, entries, fields, documents)
            }
            (PostingEncoding::Bit, false, true) => {
                open_bit::<false, true>(data, start, entries, fields, documents)
            }
            (PostingEncoding::Bit, true, true) => {
                open_bit::<true, true>(data, start, entries, fields, documents)
            }
            (PostingEncoding::Chunked(codecs), false, false) => {
                open_chunked::<false, false>(data, start, entries, fields, &codecs, documents)
            }
            (PostingEncoding::Chunked(codecs), true, false) => {
                open_chunked::<true, false>(data, start, entries, fields, &codecs, documents)
            }
            (PostingEncoding::Chunked(codecs), false, true) => {
                open_chunked::<false, true>(data, start, entries, fields, &codecs, documents)
            }
            (PostingEncoding::Chunked(codecs), true, true) => {
                open_chunked::<true, true>(data, start, entries, fields, &codecs, documents)
            }
        }
    }
}

fn open_bit<const BLOCKS: bool, const FIELDS: bool>(
    data: Vec<u8>,
    start: quarry_compression::BitPosition,
    entries: u32,
    field_count: usize,
    documents: DocumentLookup,
) -> Result<Box<dyn PostingIterator>> {
    Ok(Box::new(BitPostingIterator::<BLOCKS, FIELDS>::new(
        data,
        start,
        entries,
        field_count,
        documents,
    )?))
}

fn open_chunked<const BLOCKS: bool, const FIELDS: bool>(
    data: Vec<u8>,
    start: quarry_compression::BitPosition,
    entries: u32,
    field_count: usize,
    codecs: &ChunkCodecs,
    documents: DocumentLookup,
) -> Result<Box<dyn PostingIterator>> {
    Ok(Box::new(ChunkedPostingIterator::<BLOCKS, FIELDS>::new(
        data,
        start,
        entries,
        field_count,
        codecs,
        documents,
    )?))
}
