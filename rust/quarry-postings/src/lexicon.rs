//! Term vocabulary: term string to aggregate statistics and posting list pointer.
//!
//! Entries are kept sorted by term, and term ids are assigned in term order, so the
//! entry of term id `i` is the `i`-th entry. Entries are immutable once the index is
//! published.

use bincode::{Decode, Encode};
use quarry_common::{Result, TermId, verify_data};

use crate::{pointer::BitIndexPointer, statistics::EntryStatistics};

#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
pub struct LexiconEntry {
    pub term_id: TermId,
    pub statistics: EntryStatistics,
    /// Location of the term's inverted posting list.
    pub pointer: BitIndexPointer,
}

impl LexiconEntry {
    pub fn document_frequency(&self) -> u32 {
        self.statistics.document_frequency
    }

    pub fn collection_frequency(&self) -> u64 {
        self.statistics.collection_frequency
    }

    /// Adds the statistics of `other` (another run's entry for the same term).
    pub fn add(&mut self, other: &LexiconEntry) {
        self.statistics.add(&other.statistics);
    }
}

#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct Lexicon {
    terms: Vec<String>,
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Builds a lexicon from entries in any order, re-assigning term ids in term
    /// order. Duplicate terms are aggregated.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, LexiconEntry)>) -> Lexicon {
        let mut entries = entries.into_iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut lexicon = Lexicon::default();
        for (term, entry) in entries {
            if lexicon.terms.last() == Some(&term) {
                if let Some(last) = lexicon.entries.last_mut() {
                    last.add(&entry);
                }
                continue;
            }
            let term_id = lexicon.entries.len() as TermId;
            lexicon.terms.push(term);
            lexicon.entries.push(LexiconEntry { term_id, ..entry });
        }
        lexicon
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<&LexiconEntry> {
        self.terms
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn by_id(&self, term_id: TermId) -> Option<(&str, &LexiconEntry)> {
        let i = term_id as usize;
        Some((self.terms.get(i)?.as_str(), self.entries.get(i)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LexiconEntry)> {
        self.terms.iter().map(String::as_str).zip(&self.entries)
    }

    /// Merges the lexicons of two indexing runs.
    ///
    /// Statistics of terms present in both runs are summed, field frequency vectors
    /// element-wise, and term ids are re-assigned in term order. Each pointer still
    /// addresses the posting file of the run it came from: `self` for terms both
    /// runs have, `other` for terms only it has.
    pub fn merge(&self, other: &Lexicon) -> Lexicon {
        Lexicon::from_entries(self.iter().chain(other.iter()).map(|(term, entry)| {
            (term.to_string(), entry.clone())
        }))
    }

    /// Checks the ordering and id invariants after loading from storage.
    pub fn validate(&self) -> Result<()> {
        verify_data!(lexicon, self.terms.len() == self.entries.len());
        verify_data!(lexicon, self.terms.windows(2).all(|w| w[0] < w[1]));
        verify_data!(
            lexicon,
            self.entries
                .iter()
                .enumerate()
                .all(|(i, e)| e.term_id as usize == i)
        );
        Ok(())
    }
}
