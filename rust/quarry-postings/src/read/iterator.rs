//! The posting cursor contract shared by every posting list variant and by the
//! merged iterators of compound query operators.

use std::sync::Arc;

use quarry_common::{DocId, Result};

use crate::document_index::DocumentIndex;

/// Sentinel id reported once a list is exhausted. Never a valid document or term id.
pub const END_OF_LIST: DocId = DocId::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    BeforeFirst,
    Positioned,
    EndOfList,
}

/// Cursor over a posting list in increasing id order.
///
/// A new iterator is [`IteratorState::BeforeFirst`]; the first [`next`](Self::next)
/// positions it on the first posting. Payload accessors (`frequency`, `positions`,
/// `field_frequencies`, ...) describe the current posting and are only meaningful while
/// [`IteratorState::Positioned`]; otherwise they report zero or empty values and
/// [`id`](Self::id) reports [`END_OF_LIST`].
///
/// Iterators hold sequential decode state and are driven from one thread.
pub trait PostingIterator: Send {
    /// Advances to the next posting, returning its id or [`END_OF_LIST`].
    fn next(&mut self) -> Result<DocId>;

    /// Advances to the first posting with id `>= target`. Does not move when already
    /// positioned on such a posting.
    fn next_target(&mut self, target: DocId) -> Result<DocId> {
        match self.state() {
            IteratorState::EndOfList => return Ok(END_OF_LIST),
            IteratorState::Positioned if self.id() >= target => return Ok(self.id()),
            _ => {}
        }
        loop {
            let id = self.next()?;
            if id >= target {
                return Ok(id);
            }
        }
    }

    fn id(&self) -> DocId;

    fn frequency(&self) -> u32;

    /// Length of the current document in tokens, or zero when unknown.
    fn document_length(&self) -> u32;

    /// Ascending positions of the current posting; empty without blocks.
    fn positions(&self) -> &[u32];

    /// Per-field frequencies of the current posting; empty without fields.
    fn field_frequencies(&self) -> &[u32];

    /// Per-field lengths of the current document; empty when unknown.
    fn field_lengths(&self) -> &[u32];

    fn state(&self) -> IteratorState;

    /// Number of postings declared for the list.
    fn entry_count(&self) -> u32;

    /// Whether postings carry positions.
    fn has_positions(&self) -> bool;

    /// Releases the decoded stream region. Idempotent; the iterator reports
    /// [`END_OF_LIST`] afterwards.
    fn close(&mut self);

    fn is_end(&self) -> bool {
        self.state() == IteratorState::EndOfList
    }
}

impl<T: PostingIterator + ?Sized> PostingIterator for Box<T> {
    fn next(&mut self) -> Result<DocId> {
        self.as_mut().next()
    }

    fn next_target(&mut self, target: DocId) -> Result<DocId> {
        self.as_mut().next_target(target)
    }

    fn id(&self) -> DocId {
        self.as_ref().id()
    }

    fn frequency(&self) -> u32 {
        self.as_ref().frequency()
    }

    fn document_length(&self) -> u32 {
        self.as_ref().document_length()
    }

    fn positions(&self) -> &[u32] {
        self.as_ref().positions()
    }

    fn field_frequencies(&self) -> &[u32] {
        self.as_ref().field_frequencies()
    }

    fn field_lengths(&self) -> &[u32] {
        self.as_ref().field_lengths()
    }

    fn state(&self) -> IteratorState {
        self.as_ref().state()
    }

    fn entry_count(&self) -> u32 {
        self.as_ref().entry_count()
    }

    fn has_positions(&self) -> bool {
        self.as_ref().has_positions()
    }

    fn close(&mut self) {
        self.as_mut().close()
    }
}

/// Document metadata lookups for iterators of the inverted index.
#[derive(Debug, Clone, Default)]
pub struct DocumentLookup(Option<Arc<DocumentIndex>>);

impl DocumentLookup {
    pub fn new(documents: Arc<DocumentIndex>) -> DocumentLookup {
        DocumentLookup(Some(documents))
    }

    pub fn none() -> DocumentLookup {
        DocumentLookup(None)
    }

    pub fn length(&self, id: DocId) -> u32 {
        match &self.0 {
            Some(documents) if id != END_OF_LIST => documents.document_length(id),
            _ => 0,
        }
    }

    pub fn field_lengths(&self, id: DocId) -> &[u32] {
        match &self.0 {
            Some(documents) if id != END_OF_LIST => documents.field_lengths(id),
            _ => &[],
        }
    }
}
