//! Query-time statistics of terms and of the collection.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Aggregate statistics of one term, or of several alternatives merged into one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct EntryStatistics {
    /// Number of documents containing the term (Nt).
    pub document_frequency: u32,
    /// Total number of occurrences in the collection (TF).
    pub collection_frequency: u64,
    /// Largest within-document frequency.
    pub max_tf: u32,
    /// Per-field collection frequencies; empty for indexes without fields.
    pub field_frequencies: Vec<u64>,
}

impl EntryStatistics {
    pub fn new(document_frequency: u32, collection_frequency: u64, max_tf: u32) -> Self {
        EntryStatistics {
            document_frequency,
            collection_frequency,
            max_tf,
            field_frequencies: Vec::new(),
        }
    }

    /// Adds `other` into these statistics.
    ///
    /// Every component is summed, including `document_frequency` and `max_tf`. When
    /// merged alternatives co-occur in a document that document is counted once per
    /// alternative; weighting models are calibrated against these summed values.
    pub fn add(&mut self, other: &EntryStatistics) {
        self.document_frequency = self
            .document_frequency
            .saturating_add(other.document_frequency);
        self.collection_frequency = self
            .collection_frequency
            .saturating_add(other.collection_frequency);
        self.max_tf = self.max_tf.saturating_add(other.max_tf);
        if self.field_frequencies.len() < other.field_frequencies.len() {
            self.field_frequencies.resize(other.field_frequencies.len(), 0);
        }
        for (sum, value) in self.field_frequencies.iter_mut().zip(&other.field_frequencies) {
            *sum += value;
        }
    }

    pub fn field_frequency(&self, field: usize) -> u64 {
        self.field_frequencies.get(field).copied().unwrap_or(0)
    }
}

/// Collection-wide statistics, refreshed only by index construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionStatistics {
    pub number_of_documents: u32,
    pub number_of_tokens: u64,
    pub number_of_unique_terms: u32,
    pub number_of_postings: u64,
    pub field_names: Vec<String>,
    /// Token count per field, parallel to `field_names`.
    pub field_tokens: Vec<u64>,
}

impl CollectionStatistics {
    pub fn average_document_length(&self) -> f64 {
        if self.number_of_documents == 0 {
            0.0
        } else {
            self.number_of_tokens as f64 / self.number_of_documents as f64
        }
    }

    pub fn average_field_length(&self, field: usize) -> f64 {
        match self.field_tokens.get(field) {
            Some(&tokens) if self.number_of_documents > 0 => {
                tokens as f64 / self.number_of_documents as f64
            }
            _ => 0.0,
        }
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_names
            .iter()
            .position(|f| f.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_merge() {
        let mut merged = EntryStatistics::new(1, 2, 2);
        merged.field_frequencies = vec![2];
        let mut other = EntryStatistics::new(2, 4, 3);
        other.field_frequencies = vec![1, 3];
        merged.add(&other);
        assert_eq!(merged.document_frequency, 3);
        assert_eq!(merged.collection_frequency, 6);
        assert_eq!(merged.max_tf, 5);
        assert_eq!(merged.field_frequencies, vec![3, 3]);
    }

    #[test]
    fn test_averages() {
        let stats = CollectionStatistics {
            number_of_documents: 4,
            number_of_tokens: 10,
            field_names: vec!["title".into(), "body".into()],
            field_tokens: vec![2, 8],
            ..Default::default()
        };
        assert_eq!(stats.average_document_length(), 2.5);
        assert_eq!(stats.average_field_length(1), 2.0);
        assert_eq!(stats.field_index("BODY"), Some(1));
        assert_eq!(CollectionStatistics::default().average_document_length(), 0.0);
    }
}
