use quarry_common::{DocId, Result};

use super::iterator::{END_OF_LIST, IteratorState, PostingIterator};

/// Restricts a term's postings to one field.
///
/// Postings without occurrences in the field are skipped; `frequency()` and
/// `document_length()` report the field's frequency and length.
pub struct FieldOnlyPostingIterator<I> {
    inner: I,
    field: usize,
}

impl<I: PostingIterator> FieldOnlyPostingIterator<I> {
    pub fn new(inner: I, field: usize) -> Self {
        FieldOnlyPostingIterator { inner, field }
    }

    fn in_field(&self) -> bool {
        self.inner
            .field_frequencies()
            .get(self.field)
            .is_some_and(|&tf| tf > 0)
    }

    fn settle(&mut self, mut id: DocId) -> Result<DocId> {
        while id != END_OF_LIST && !self.in_field() {
            id = self.inner.next()?;
        }
        Ok(id)
    }
}

impl<I: PostingIterator> PostingIterator for FieldOnlyPostingIterator<I> {
    fn next(&mut self) -> Result<DocId> {
        let id = self.inner.next()?;
        self.settle(id)
    }

    fn next_target(&mut self, target: DocId) -> Result<DocId> {
        let id = self.inner.next_target(target)?;
        self.settle(id)
    }

    fn id(&self) -> DocId {
        self.inner.id()
    }

    fn frequency(&self) -> u32 {
        self.inner
            .field_frequencies()
            .get(self.field)
            .copied()
            .unwrap_or(0)
    }

    fn document_length(&self) -> u32 {
        self.inner
            .field_lengths()
            .get(self.field)
            .copied()
            .unwrap_or(0)
    }

    fn positions(&self) -> &[u32] {
        self.inner.positions()
    }

    fn field_frequencies(&self) -> &[u32] {
        self.inner.field_frequencies()
    }

    fn field_lengths(&self) -> &[u32] {
        self.inner.field_lengths()
    }

    fn state(&self) -> IteratorState {
        self.inner.state()
    }

    fn entry_count(&self) -> u32 {
        self.inner.entry_count()
    }

    fn has_positions(&self) -> bool {
        self.inner.has_positions()
    }

    fn close(&mut self) {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{posting::Posting, read::memory::MemoryPostingIterator};

    #[test]
    fn test_field_restriction() {
        let postings = vec![
            Posting::new(1, 2).with_field_frequencies(vec![2, 0]),
            Posting::new(4, 3).with_field_frequencies(vec![1, 2]),
            Posting::new(6, 1).with_field_frequencies(vec![0, 1]),
            Posting::new(8, 1).with_field_frequencies(vec![1, 0]),
        ];
        let mut it = FieldOnlyPostingIterator::new(MemoryPostingIterator::new(postings), 1);
        assert_eq!(it.next().unwrap(), 4);
        assert_eq!(it.frequency(), 2);
        assert_eq!(it.next().unwrap(), 6);
        assert_eq!(it.next_target(7).unwrap(), END_OF_LIST);
        assert!(it.is_end());
    }
}
