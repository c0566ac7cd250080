//! Weighting models: score contributions from posting and collection statistics.
//!
//! A model is instantiated once per query term, configured with the term's
//! statistics through [`WeightingModel::prepare`] and then scores postings. Models
//! are pure functions of their inputs after `prepare`.
//!
//! DFR models are compositions `<basic model><after effect><normalisation>` (see
//! [`dfr`]); the remaining models are standalone formulas.

use std::{fmt, sync::Arc};

use quarry_common::{Result, error::Error};
use quarry_postings::{CollectionStatistics, EntryStatistics, PostingIterator};

pub mod classic;
pub mod dfr;
pub mod field;
pub mod hypergeometric;
pub mod idf;
pub mod language;

pub use field::FieldModel;
pub use idf::Idf;

/// Everything a model may use to score postings of one query term.
#[derive(Debug, Clone)]
pub struct ModelStatistics {
    /// Query-side weight of the term.
    pub key_frequency: f64,
    /// Number of documents containing the term, at most the number of documents.
    pub document_frequency: f64,
    /// Number of occurrences of the term in the collection.
    pub term_frequency: f64,
    pub max_tf: f64,
    pub number_of_documents: f64,
    pub number_of_tokens: f64,
    pub number_of_unique_terms: f64,
    pub average_document_length: f64,
    pub entry: EntryStatistics,
    pub collection: Arc<CollectionStatistics>,
}

impl ModelStatistics {
    pub fn new(
        key_frequency: f64,
        entry: &EntryStatistics,
        collection: Arc<CollectionStatistics>,
    ) -> ModelStatistics {
        // Additively merged alternatives may claim more documents than exist.
        let document_frequency =
            entry.document_frequency.min(collection.number_of_documents) as f64;
        ModelStatistics {
            key_frequency,
            document_frequency,
            term_frequency: entry.collection_frequency as f64,
            max_tf: entry.max_tf as f64,
            number_of_documents: collection.number_of_documents as f64,
            number_of_tokens: collection.number_of_tokens as f64,
            number_of_unique_terms: collection.number_of_unique_terms as f64,
            average_document_length: collection.average_document_length(),
            entry: entry.clone(),
            collection,
        }
    }
}

impl Default for ModelStatistics {
    fn default() -> Self {
        ModelStatistics::new(1.0, &EntryStatistics::default(), Arc::default())
    }
}

pub trait WeightingModel: Send + Sync {
    fn name(&self) -> String;

    /// Configures the model for one query term. Must run before any `score` call.
    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()>;

    /// Score contribution of a posting with frequency `tf` in a document of
    /// `document_length` tokens.
    fn score(&self, tf: f64, document_length: f64) -> f64;

    /// Score contribution of the iterator's current posting.
    fn score_posting(&self, posting: &dyn PostingIterator) -> f64 {
        self.score(posting.frequency() as f64, posting.document_length() as f64)
    }

    fn clone_box(&self) -> Box<dyn WeightingModel>;
}

impl Clone for Box<dyn WeightingModel> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Debug for dyn WeightingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Builds a model by name, e.g. `BM25`, `PL2`, `In_expB2`, `DirichletLM`.
/// `Model(field)` applies the model to one field only, e.g. `BM25(title)`.
///
/// Names are matched case-sensitively for DFR compositions (`In` and `I` differ
/// from `in`), case-insensitively for the named models.
pub fn create_model(name: &str) -> Result<Box<dyn WeightingModel>> {
    let name = name.trim();
    if let Some((inner, field)) = name
        .strip_suffix(')')
        .and_then(|rest| rest.split_once('('))
    {
        if field.trim().is_empty() {
            return Err(Error::invalid_arg(
                "model",
                format!("missing field name in '{name}'"),
            ));
        }
        return Ok(Box::new(FieldModel::new(
            create_model(inner)?,
            field.trim(),
        )));
    }
    let model: Box<dyn WeightingModel> = match name.to_ascii_uppercase().as_str() {
        "TF_IDF" | "TFIDF" => Box::new(classic::TfIdf::default()),
        "BM25" => Box::new(classic::Bm25::default()),
        "DL" => Box::new(classic::Dl::default()),
        "DPH" => Box::new(hypergeometric::Dph::default()),
        "DLH13" => Box::new(hypergeometric::Dlh13::default()),
        "DIRICHLETLM" => Box::new(language::DirichletLm::default()),
        "HIEMSTRA_LM" | "HIEMSTRALM" => Box::new(language::HiemstraLm::default()),
        _ => match dfr::DfrModel::parse(name) {
            Some(model) => Box::new(model),
            None => {
                return Err(Error::invalid_arg(
                    "model",
                    format!("unknown weighting model '{name}'"),
                ));
            }
        },
    };
    Ok(model)
}


#[cfg(test)]
mod tests {
    use super::test_support::prepared;
    use super::*;

    const MODELS: [&str; 12] = [
        "TF_IDF",
        "BM25",
        "PL2",
        "DPH",
        "DLH13",
        "In_expB2",
        "InL2",
        "DirichletLM",
        "Hiemstra_LM",
        "Dl",
        "PB2",
        "GL1",
    ];

    #[test]
    fn test_create_by_name() {
        for name in MODELS {
            assert_eq!(create_model(name).unwrap().name(), name, "{name}");
        }
        assert!(create_model("Okapi").is_err());
        assert!(create_model("XL2").is_err());
        assert_eq!(create_model("PL2(title)").unwrap().name(), "PL2(title)");
        assert!(create_model("PL2()").is_err());
        assert!(create_model("Okapi(title)").is_err());
    }

    #[test]
    fn test_scores_are_finite_and_monotone_in_tf() {
        for name in MODELS {
            let model = prepared(name, 20, 60);
            let low = model.score(1.0, 100.0);
            let high = model.score(5.0, 100.0);
            assert!(low.is_finite() && high.is_finite(), "{name}: {low} {high}");
            assert!(high > low, "{name}: score must grow with tf ({low} vs {high})");
        }
    }

    #[test]
    fn test_rarer_terms_score_higher() {
        for name in ["TF_IDF", "BM25", "PL2", "In_expB2", "DPH", "DLH13"] {
            let rare = prepared(name, 5, 6).score(2.0, 100.0);
            let common = prepared(name, 500, 2000).score(2.0, 100.0);
            assert!(rare > common, "{name}: {rare} vs {common}");
        }
    }

    #[test]
    fn test_document_frequency_capped_at_collection_size() {
        let statistics = test_support::statistics(3000, 4000);
        assert_eq!(statistics.document_frequency, 1000.0);
        assert_eq!(statistics.entry.document_frequency, 3000);
        for name in MODELS {
            let model = prepared(name, 3000, 4000);
            assert!(model.score(2.0, 100.0).is_finite(), "{name}");
        }
    }

    #[test]
    fn test_zero_length_documents() {
        for name in MODELS {
            let model = prepared(name, 20, 60);
            assert!(!model.score(1.0, 0.0).is_nan(), "{name}");
        }
    }

    #[test]
    fn test_key_frequency_scales() {
        let mut statistics = test_support::statistics(20, 60);
        let mut model = create_model("BM25").unwrap();
        model.prepare(&statistics).unwrap();
        let single = model.score(2.0, 100.0);
        statistics.key_frequency = 2.0;
        model.prepare(&statistics).unwrap();
        assert!(model.score(2.0, 100.0) > single);
    }
}
