use quarry_common::{Result, error::Error};
use quarry_postings::PostingIterator;

use super::{ModelStatistics, WeightingModel};

/// Applies an inner model to the frequency and length of a single field.
///
/// `prepare` resolves the field by name against the collection's field names and
/// hands the inner model field-level statistics: the term's frequency in that
/// field replaces its collection frequency, the field's token count replaces the
/// collection's, and the average field length replaces the average document length.
#[derive(Debug, Clone)]
pub struct FieldModel {
    inner: Box<dyn WeightingModel>,
    field_name: String,
    field: Option<usize>,
}

impl FieldModel {
    pub fn new(inner: Box<dyn WeightingModel>, field_name: impl Into<String>) -> FieldModel {
        FieldModel {
            inner,
            field_name: field_name.into(),
            field: None,
        }
    }

    pub fn field(&self) -> Option<usize> {
        self.field
    }
}

impl WeightingModel for FieldModel {
    fn name(&self) -> String {
        format!("{}({})", self.inner.name(), self.field_name)
    }

    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()> {
        let collection = &statistics.collection;
        let field = collection.field_index(&self.field_name).ok_or_else(|| {
            Error::invalid_arg(
                "field",
                format!("index has no field named '{}'", self.field_name),
            )
        })?;
        let mut field_statistics = statistics.clone();
        field_statistics.term_frequency = statistics.entry.field_frequency(field) as f64;
        field_statistics.number_of_tokens =
            collection.field_tokens.get(field).copied().unwrap_or(0) as f64;
        field_statistics.average_document_length = collection.average_field_length(field);
        self.inner.prepare(&field_statistics)?;
        self.field = Some(field);
        Ok(())
    }

    fn score(&self, tf: f64, document_length: f64) -> f64 {
        self.inner.score(tf, document_length)
    }

    fn score_posting(&self, posting: &dyn PostingIterator) -> f64 {
        let Some(field) = self.field else {
            return 0.0;
        };
        let tf = posting.field_frequencies().get(field).copied().unwrap_or(0);
        if tf == 0 {
            return 0.0;
        }
        let length = posting.field_lengths().get(field).copied().unwrap_or(0);
        self.inner.score(tf as f64, length as f64)
    }

    fn clone_box(&self) -> Box<dyn WeightingModel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use quarry_postings::{
        CollectionStatistics, DocumentIndex, EntryStatistics, Posting,
        read::{DocumentLookup, MemoryPostingIterator},
    };

    use super::*;
    use crate::models::create_model;

    fn collection() -> Arc<CollectionStatistics> {
        Arc::new(CollectionStatistics {
            number_of_documents: 2,
            number_of_tokens: 20,
            number_of_unique_terms: 8,
            number_of_postings: 12,
            field_names: vec!["title".into(), "body".into()],
            field_tokens: vec![4, 16],
        })
    }

    #[test]
    fn test_scores_only_the_field() {
        let mut entry = EntryStatistics::new(2, 3, 2);
        entry.field_frequencies = vec![1, 2];
        let statistics = ModelStatistics::new(1.0, &entry, collection());

        let mut model = FieldModel::new(create_model("Dl").unwrap(), "TITLE");
        model.prepare(&statistics).unwrap();
        assert_eq!(model.field(), Some(0));
        assert_eq!(model.name(), "Dl(TITLE)");

        let mut documents = DocumentIndex::new(2);
        documents.push("d0".into(), 10, &[2, 8]);
        documents.push("d1".into(), 10, &[2, 8]);
        let mut postings = MemoryPostingIterator::new(vec![
            Posting::new(0, 2).with_field_frequencies(vec![1, 1]),
            Posting::new(1, 1).with_field_frequencies(vec![0, 1]),
        ])
        .with_documents(DocumentLookup::new(Arc::new(documents)));
        postings.next().unwrap();
        assert_eq!(model.score_posting(&postings), 1.0);
        postings.next().unwrap();
        assert_eq!(model.score_posting(&postings), 0.0);
    }

    #[test]
    fn test_unknown_field() {
        let statistics = ModelStatistics::new(1.0, &EntryStatistics::new(1, 1, 1), collection());
        let mut model = FieldModel::new(create_model("BM25").unwrap(), "anchor");
        assert!(model.prepare(&statistics).is_err());
    }
}
