use quarry_common::{DocId, Result};

use super::iterator::{DocumentLookup, END_OF_LIST, IteratorState, PostingIterator};
use crate::posting::Posting;

/// Posting iterator over an owned, already decoded list.
pub struct MemoryPostingIterator {
    postings: Vec<Posting>,
    /// Index of the current posting; `postings.len()` at the end.
    index: usize,
    state: IteratorState,
    has_positions: bool,
    documents: DocumentLookup,
}

impl MemoryPostingIterator {
    /// Creates an iterator over `postings`, which must be sorted by strictly increasing id.
    pub fn new(postings: Vec<Posting>) -> MemoryPostingIterator {
        debug_assert!(postings.windows(2).all(|w| w[0].id < w[1].id));
        let has_positions = postings.iter().any(|p| !p.positions.is_empty());
        MemoryPostingIterator {
            postings,
            index: 0,
            state: IteratorState::BeforeFirst,
            has_positions,
            documents: DocumentLookup::none(),
        }
    }

    pub fn empty() -> MemoryPostingIterator {
        MemoryPostingIterator::new(Vec::new())
    }

    pub fn with_documents(mut self, documents: DocumentLookup) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_positions(mut self, has_positions: bool) -> Self {
        self.has_positions = has_positions;
        self
    }

    fn current(&self) -> Option<&Posting> {
        match self.state {
            IteratorState::Positioned => self.postings.get(self.index),
            _ => None,
        }
    }

    fn settle(&mut self) -> DocId {
        match self.postings.get(self.index) {
            Some(posting) => {
                self.state = IteratorState::Positioned;
                posting.id
            }
            None => {
                self.state = IteratorState::EndOfList;
                END_OF_LIST
            }
        }
    }
}

impl PostingIterator for MemoryPostingIterator {
    fn next(&mut self) -> Result<DocId> {
        match self.state {
            IteratorState::EndOfList => return Ok(END_OF_LIST),
            IteratorState::Positioned => self.index += 1,
            IteratorState::BeforeFirst => {}
        }
        Ok(self.settle())
    }

    fn next_target(&mut self, target: DocId) -> Result<DocId> {
        match self.state {
            IteratorState::EndOfList => return Ok(END_OF_LIST),
            IteratorState::Positioned if self.postings[self.index].id >= target => {
                return Ok(self.postings[self.index].id);
            }
            _ => {}
        }
        self.index += self.postings[self.index..].partition_point(|p| p.id < target);
        Ok(self.settle())
    }

    fn id(&self) -> DocId {
        self.current().map_or(END_OF_LIST, |p| p.id)
    }

    fn frequency(&self) -> u32 {
        self.current().map_or(0, |p| p.frequency)
    }

    fn document_length(&self) -> u32 {
        self.documents.length(self.id())
    }

    fn positions(&self) -> &[u32] {
        match self.current() {
            Some(posting) => &posting.positions,
            None => &[],
        }
    }

    fn field_frequencies(&self) -> &[u32] {
        match self.current() {
            Some(posting) => &posting.field_frequencies,
            None => &[],
        }
    }

    fn field_lengths(&self) -> &[u32] {
        self.documents.field_lengths(self.id())
    }

    fn state(&self) -> IteratorState {
        self.state
    }

    fn entry_count(&self) -> u32 {
        self.postings.len() as u32
    }

    fn has_positions(&self) -> bool {
        self.has_positions
    }

    fn close(&mut self) {
        self.postings = Vec::new();
        self.index = 0;
        self.state = IteratorState::EndOfList;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states() {
        let mut it = MemoryPostingIterator::new(vec![Posting::new(2, 1), Posting::new(9, 4)]);
        assert_eq!(it.state(), IteratorState::BeforeFirst);
        assert_eq!(it.id(), END_OF_LIST);
        assert_eq!(it.next().unwrap(), 2);
        assert_eq!(it.next_target(2).unwrap(), 2);
        assert_eq!(it.next_target(3).unwrap(), 9);
        assert_eq!(it.frequency(), 4);
        assert_eq!(it.next().unwrap(), END_OF_LIST);
        assert!(it.is_end());
        assert_eq!(it.frequency(), 0);
        assert_eq!(it.next().unwrap(), END_OF_LIST);
    }

    #[test]
    fn test_empty_reports_end_immediately() {
        let mut it = MemoryPostingIterator::empty();
        assert_eq!(it.next_target(0).unwrap(), END_OF_LIST);
        it.close();
        it.close();
        assert!(it.is_end());
    }
}
