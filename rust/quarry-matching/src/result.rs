//! Result sets and the term-at-a-time score accumulator.

use ahash::AHashMap;
use quarry_common::DocId;
use serde::Serialize;

use crate::diagnostic::Diagnostic;

/// Ranked documents of one query, read-only once built.
///
/// Documents are ordered by score descending, ties by document id ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub query_id: String,
    pub doc_ids: Vec<DocId>,
    pub scores: Vec<f64>,
    /// Occurrence bits of the terms that matched the document: required terms
    /// first, then optional terms, at most 16.
    pub occurrences: Vec<u16>,
    /// Number of documents that matched before truncation.
    pub exact_result_size: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResultSet {
    pub fn empty(query_id: impl Into<String>) -> ResultSet {
        ResultSet {
            query_id: query_id.into(),
            ..Default::default()
        }
    }

    /// Every document of a collection, unscored and in id order.
    pub fn all_documents(query_id: impl Into<String>, number_of_documents: u32) -> ResultSet {
        let n = number_of_documents as usize;
        ResultSet {
            query_id: query_id.into(),
            doc_ids: (0..number_of_documents).collect(),
            scores: vec![0.0; n],
            occurrences: vec![0; n],
            exact_result_size: n,
            diagnostics: Vec::new(),
        }
    }

    /// Builds a result set from unordered `(doc, score, occurrence)` matches.
    pub(crate) fn from_matches(
        query_id: impl Into<String>,
        mut matches: Vec<(DocId, f64, u16)>,
        exact_result_size: usize,
        result_set_size: usize,
    ) -> ResultSet {
        matches.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        if result_set_size > 0 {
            matches.truncate(result_set_size);
        }
        let mut result = ResultSet {
            query_id: query_id.into(),
            exact_result_size,
            ..Default::default()
        };
        for (doc, score, occurrence) in matches {
            result.doc_ids.push(doc);
            result.scores.push(score);
            result.occurrences.push(occurrence);
        }
        result
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Whether matching documents were cut off by the result set size.
    pub fn is_truncated(&self) -> bool {
        self.exact_result_size > self.doc_ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, f64, u16)> + '_ {
        self.doc_ids
            .iter()
            .zip(&self.scores)
            .zip(&self.occurrences)
            .map(|((&doc, &score), &occurrence)| (doc, score, occurrence))
    }

    pub fn score_of(&self, doc: DocId) -> Option<f64> {
        self.doc_ids
            .iter()
            .position(|&d| d == doc)
            .map(|i| self.scores[i])
    }
}

/// Per-query score accumulator keyed by document id.
///
/// A score of negative infinity excludes a document. The accumulator keeps a tally
/// of documents with a finite score, so excluding a counted document un-counts it
/// and restoring a finite score counts it again.
#[derive(Debug, Default)]
pub struct Accumulator {
    scores: AHashMap<DocId, (f64, u16)>,
    retrieved: usize,
}

impl Accumulator {
    pub fn new() -> Accumulator {
        Accumulator::default()
    }

    /// Adds `score` to the document and records the contributing term's occurrence bit.
    pub fn add_score(&mut self, doc: DocId, score: f64, occurrence: u16) {
        let was_counted = self
            .scores
            .get(&doc)
            .is_some_and(|(score, _)| score.is_finite());
        let entry = self.scores.entry(doc).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 |= occurrence;
        let counted = entry.0.is_finite();
        self.update_tally(was_counted, counted);
    }

    /// Replaces the document's score.
    pub fn set_score(&mut self, doc: DocId, score: f64) {
        let entry = self.scores.entry(doc).or_insert((f64::NEG_INFINITY, 0));
        let was_counted = entry.0.is_finite();
        entry.0 = score;
        self.update_tally(was_counted, score.is_finite());
    }

    /// Excludes the document if it is present.
    pub fn exclude(&mut self, doc: DocId) {
        if self.scores.contains_key(&doc) {
            self.set_score(doc, f64::NEG_INFINITY);
        }
    }

    fn update_tally(&mut self, was_counted: bool, counted: bool) {
        match (was_counted, counted) {
            (false, true) => self.retrieved += 1,
            (true, false) => self.retrieved -= 1,
            _ => {}
        }
    }

    pub fn score(&self, doc: DocId) -> Option<f64> {
        self.scores.get(&doc).map(|&(score, _)| score)
    }

    pub fn occurrence(&self, doc: DocId) -> u16 {
        self.scores.get(&doc).map_or(0, |&(_, occurrence)| occurrence)
    }

    /// Number of documents with a finite score.
    pub fn retrieved(&self) -> usize {
        self.retrieved
    }

    /// Documents accumulated so far, including excluded ones.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Excludes every document whose occurrences lack one of the `required` bits.
    pub fn require(&mut self, required: u16) {
        if required == 0 {
            return;
        }
        let mut removed = 0;
        for (score, occurrence) in self.scores.values_mut() {
            if *occurrence & required != required && score.is_finite() {
                *score = f64::NEG_INFINITY;
                removed += 1;
            }
        }
        self.retrieved -= removed;
    }

    pub fn finalize(self, query_id: impl Into<String>, result_set_size: usize) -> ResultSet {
        let exact_result_size = self.retrieved;
        let matches = self
            .scores
            .into_iter()
            .filter(|(_, (score, _))| score.is_finite())
            .map(|(doc, (score, occurrence))| (doc, score, occurrence))
            .collect();
        ResultSet::from_matches(query_id, matches, exact_result_size, result_set_size)
    }
}
