//! Intersection of posting lists, optionally filtered by term positions.

use quarry_common::{DocId, Result};
use quarry_postings::{END_OF_LIST, IteratorState, PostingIterator};

/// Positional condition a co-occurring document must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFilter {
    /// Plain co-occurrence; the frequency is the smallest child frequency.
    None,
    /// Children in order with consecutive positions `1..=gap` apart; the frequency
    /// is the number of positions of the first child that start such a chain.
    Phrase { gap: u32 },
    /// One occurrence of every child within `distance` positions; the frequency is
    /// the number of non-overlapping windows found scanning left to right.
    Window { distance: u32 },
}

/// Documents present in every child list.
///
/// Children advance by repeated max-advance: the lead child proposes a candidate,
/// every other child skips to it, and a child landing past it becomes the new
/// candidate.
pub struct AndIterator {
    children: Vec<Box<dyn PostingIterator>>,
    filter: PositionFilter,
    entry_count: u32,
    id: DocId,
    frequency: u32,
    /// Start positions of the matches at the current document.
    positions: Vec<u32>,
    state: IteratorState,
}

impl AndIterator {
    /// `entry_count` is the declared number of matching documents when known, an
    /// upper bound otherwise.
    pub fn new(
        children: Vec<Box<dyn PostingIterator>>,
        filter: PositionFilter,
        entry_count: Option<u32>,
    ) -> AndIterator {
        let entry_count = entry_count.unwrap_or_else(|| {
            children
                .iter()
                .map(|child| child.entry_count())
                .min()
                .unwrap_or(0)
        });
        AndIterator {
            children,
            filter,
            entry_count,
            id: END_OF_LIST,
            frequency: 0,
            positions: Vec::new(),
            state: IteratorState::BeforeFirst,
        }
    }

    fn align(&mut self, mut candidate: DocId) -> Result<DocId> {
        'candidates: loop {
            if candidate == END_OF_LIST || self.children.is_empty() {
                self.finish();
                return Ok(END_OF_LIST);
            }
            for child in self.children.iter_mut() {
                let id = child.next_target(candidate)?;
                if id != candidate {
                    candidate = id;
                    continue 'candidates;
                }
            }
            if let Some(frequency) = self.evaluate() {
                self.id = candidate;
                self.frequency = frequency;
                self.state = IteratorState::Positioned;
                return Ok(candidate);
            }
            candidate = self.children[0].next()?;
        }
    }

    fn finish(&mut self) {
        self.id = END_OF_LIST;
        self.frequency = 0;
        self.positions.clear();
        self.state = IteratorState::EndOfList;
    }

    /// Frequency of the aligned document, or `None` when the positional filter rejects it.
    fn evaluate(&mut self) -> Option<u32> {
        self.positions.clear();
        let frequency = match self.filter {
            PositionFilter::None => self
                .children
                .iter()
                .map(|child| child.frequency())
                .min()
                .unwrap_or(0),
            PositionFilter::Phrase { gap } => {
                let lists = self.children.iter().map(|c| c.positions()).collect::<Vec<_>>();
                phrase_starts(&lists, gap, &mut self.positions);
                self.positions.len() as u32
            }
            PositionFilter::Window { distance } => {
                let lists = self.children.iter().map(|c| c.positions()).collect::<Vec<_>>();
                window_starts(&lists, distance, &mut self.positions);
                self.positions.len() as u32
            }
        };
        (frequency > 0).then_some(frequency)
    }
}

/// Collects the positions of `lists[0]` that start an ordered chain through every
/// list with each step `1..=gap` positions long.
pub(crate) fn phrase_starts(lists: &[&[u32]], gap: u32, starts: &mut Vec<u32>) {
    let Some((last, rest)) = lists.split_last() else {
        return;
    };
    // Positions of list i that can reach the end of the chain, built backwards.
    let mut reachable = last.to_vec();
    for list in rest.iter().rev() {
        reachable = list
            .iter()
            .copied()
            .filter(|&position| {
                let next = reachable.partition_point(|&p| p <= position);
                reachable.get(next).is_some_and(|&p| p - position <= gap)
            })
            .collect();
        if reachable.is_empty() {
            break;
        }
    }
    starts.extend(reachable);
}

/// Collects the first position of every non-overlapping window of at most
/// `distance` positions holding one occurrence of each list.
pub(crate) fn window_starts(lists: &[&[u32]], distance: u32, starts: &mut Vec<u32>) {
    let mut occurrences = lists
        .iter()
        .enumerate()
        .flat_map(|(list, positions)| positions.iter().map(move |&p| (p, list)))
        .collect::<Vec<_>>();
    occurrences.sort_unstable();
    let mut latest: Vec<Option<u32>> = vec![None; lists.len()];
    for (position, list) in occurrences {
        latest[list] = Some(position);
        let first = latest
            .iter()
            .try_fold(u32::MAX, |first, p| p.map(|p| first.min(p)));
        if let Some(first) = first {
            if position - first < distance {
                starts.push(first);
                latest.iter_mut().for_each(|p| *p = None);
            }
        }
    }
}

impl PostingIterator for AndIterator {
    fn next(&mut self) -> Result<DocId> {
        if self.state == IteratorState::EndOfList || self.children.is_empty() {
            self.finish();
            return Ok(END_OF_LIST);
        }
        let candidate = self.children[0].next()?;
        self.align(candidate)
    }

    fn next_target(&mut self, target: DocId) -> Result<DocId> {
        match self.state {
            IteratorState::EndOfList => return Ok(END_OF_LIST),
            IteratorState::Positioned if self.id >= target => return Ok(self.id),
            _ => {}
        }
        if self.children.is_empty() {
            self.finish();
            return Ok(END_OF_LIST);
        }
        let candidate = self.children[0].next_target(target)?;
        self.align(candidate)
    }

    fn id(&self) -> DocId {
        self.id
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn document_length(&self) -> u32 {
        match self.state {
            IteratorState::Positioned => self.children[0].document_length(),
            _ => 0,
        }
    }

    fn positions(&self) -> &[u32] {
        &self.positions
    }

    fn field_frequencies(&self) -> &[u32] {
        &[]
    }

    fn field_lengths(&self) -> &[u32] {
        match self.state {
            IteratorState::Positioned => self.children[0].field_lengths(),
            _ => &[],
        }
    }

    fn state(&self) -> IteratorState {
        self.state
    }

    fn entry_count(&self) -> u32 {
        self.entry_count
    }

    fn has_positions(&self) -> bool {
        self.filter != PositionFilter::None
    }

    fn close(&mut self) {
        for child in self.children.iter_mut() {
            child.close();
        }
        self.finish();
    }
}
