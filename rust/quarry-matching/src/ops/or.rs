use quarry_common::{DocId, Result};
use quarry_postings::{END_OF_LIST, IteratorState, PostingIterator};

/// Union of alternative posting lists, as if every alternative were one term.
///
/// At each document the frequency is the sum of the contributing children's
/// frequencies, positions are the union of theirs and field frequencies are summed
/// element-wise.
pub struct OrIterator {
    children: Vec<Box<dyn PostingIterator>>,
    entry_count: u32,
    id: DocId,
    frequency: u32,
    document_length: u32,
    positions: Vec<u32>,
    field_frequencies: Vec<u32>,
    field_lengths: Vec<u32>,
    matched: u32,
    state: IteratorState,
}

impl OrIterator {
    pub fn new(children: Vec<Box<dyn PostingIterator>>) -> OrIterator {
        let entry_count = children
            .iter()
            .fold(0u32, |sum, child| sum.saturating_add(child.entry_count()));
        OrIterator {
            children,
            entry_count,
            id: END_OF_LIST,
            frequency: 0,
            document_length: 0,
            positions: Vec::new(),
            field_frequencies: Vec::new(),
            field_lengths: Vec::new(),
            matched: 0,
            state: IteratorState::BeforeFirst,
        }
    }

    /// Positions on the smallest child id and merges the children found there.
    fn settle(&mut self) -> DocId {
        self.id = self
            .children
            .iter()
            .map(|child| child.id())
            .min()
            .unwrap_or(END_OF_LIST);
        self.frequency = 0;
        self.positions.clear();
        self.field_frequencies.clear();
        self.field_lengths.clear();
        if self.id == END_OF_LIST {
            self.document_length = 0;
            self.state = IteratorState::EndOfList;
            return END_OF_LIST;
        }
        self.state = IteratorState::Positioned;
        self.matched += 1;

        let id = self.id;
        let mut first = true;
        for child in self.children.iter().filter(|child| child.id() == id) {
            self.frequency = self.frequency.saturating_add(child.frequency());
            self.positions.extend_from_slice(child.positions());
            let fields = child.field_frequencies();
            if self.field_frequencies.len() < fields.len() {
                self.field_frequencies.resize(fields.len(), 0);
            }
            for (sum, &tf) in self.field_frequencies.iter_mut().zip(fields) {
                *sum += tf;
            }
            if first {
                self.document_length = child.document_length();
                self.field_lengths.extend_from_slice(child.field_lengths());
                first = false;
            }
        }
        self.positions.sort_unstable();
        self.positions.dedup();
        id
    }

    /// Distinct documents produced so far. After a full traversal this is the exact
    /// document frequency of the union, which the summed entry statistics only
    /// bound from above.
    pub fn documents_matched(&self) -> u32 {
        self.matched
    }
}

impl PostingIterator for OrIterator {
    fn next(&mut self) -> Result<DocId> {
        match self.state {
            IteratorState::EndOfList => return Ok(END_OF_LIST),
            IteratorState::BeforeFirst => {
                for child in self.children.iter_mut() {
                    child.next()?;
                }
            }
            IteratorState::Positioned => {
                let current = self.id;
                for child in self.children.iter_mut().filter(|c| c.id() == current) {
                    child.next()?;
                }
            }
        }
        Ok(self.settle())
    }

    fn next_target(&mut self, target: DocId) -> Result<DocId> {
        match self.state {
            IteratorState::EndOfList => return Ok(END_OF_LIST),
            IteratorState::Positioned if self.id >= target => return Ok(self.id),
            _ => {}
        }
        for child in self.children.iter_mut() {
            child.next_target(target)?;
        }
        Ok(self.settle())
    }

    fn id(&self) -> DocId {
        self.id
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn document_length(&self) -> u32 {
        self.document_length
    }

    fn positions(&self) -> &[u32] {
        &self.positions
    }

    fn field_frequencies(&self) -> &[u32] {
        &self.field_frequencies
    }

    fn field_lengths(&self) -> &[u32] {
        &self.field_lengths
    }

    fn state(&self) -> IteratorState {
        self.state
    }

    fn entry_count(&self) -> u32 {
        self.entry_count
    }

    fn has_positions(&self) -> bool {
        self.children.iter().all(|child| child.has_positions())
    }

    fn close(&mut self) {
        for child in self.children.iter_mut() {
            child.close();
        }
        self.id = END_OF_LIST;
        self.state = IteratorState::EndOfList;
    }
}

#[cfg(test)]
mod tests {
    use quarry_postings::{Posting, read::MemoryPostingIterator};

    use super::*;

    fn list(postings: Vec<Posting>) -> Box<dyn PostingIterator> {
        Box::new(MemoryPostingIterator::new(postings))
    }

    #[test]
    fn test_frequencies_sum() {
        let mut or = OrIterator::new(vec![
            list(vec![Posting::new(1, 2)]),
            list(vec![Posting::new(1, 3), Posting::new(2, 1)]),
        ]);
        assert_eq!(or.entry_count(), 3);
        assert_eq!(or.next().unwrap(), 1);
        assert_eq!(or.frequency(), 5);
        assert_eq!(or.next().unwrap(), 2);
        assert_eq!(or.frequency(), 1);
        assert_eq!(or.next().unwrap(), END_OF_LIST);
        assert_eq!(or.next().unwrap(), END_OF_LIST);
        assert_eq!(or.documents_matched(), 2);
    }

    #[test]
    fn test_payloads_merge() {
        let mut or = OrIterator::new(vec![
            list(vec![
                Posting::new(4, 2)
                    .with_positions(vec![1, 6])
                    .with_field_frequencies(vec![1, 1]),
            ]),
            list(vec![
                Posting::new(0, 1)
                    .with_positions(vec![0])
                    .with_field_frequencies(vec![0, 1]),
                Posting::new(4, 1)
                    .with_positions(vec![3])
                    .with_field_frequencies(vec![0, 1]),
            ]),
        ]);
        assert_eq!(or.next_target(2).unwrap(), 4);
        assert_eq!(or.positions(), &[1, 3, 6]);
        assert_eq!(or.field_frequencies(), &[1, 2]);
        assert!(or.has_positions());
        or.close();
        assert!(or.is_end());
    }

    #[test]
    fn test_empty_children() {
        let mut or = OrIterator::new(vec![list(vec![]), list(vec![])]);
        assert_eq!(or.next().unwrap(), END_OF_LIST);
        assert!(OrIterator::new(Vec::new()).next().unwrap() == END_OF_LIST);
    }
}
