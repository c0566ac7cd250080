use std::path::Path;

use quarry_common::{Result, error::Error, verify_arg};
use serde::{Deserialize, Serialize};

use crate::models::create_model;

/// Posting traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Document at a time: bounded memory, top-k selection.
    #[default]
    Daat,
    /// Term at a time: one score accumulator per matching document.
    Taat,
}

/// Options of one matching engine. Every field has a default, so a partial JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub strategy: Strategy,
    /// Maximum number of documents returned; zero keeps every match.
    pub result_set_size: usize,
    /// Whether a query with no resolvable terms retrieves the whole collection.
    pub match_empty_query: bool,
    /// A term is dropped when its document frequency exceeds this fraction of the
    /// number of documents.
    pub df_guard_ratio: f64,
    /// Collections above this size are reported when matched term at a time.
    pub taat_document_limit: u32,
    /// Weighting model of terms that do not name their own.
    pub model: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            strategy: Strategy::Daat,
            result_set_size: 1000,
            match_empty_query: false,
            df_guard_ratio: 1.0,
            taat_document_limit: 4_000_000,
            model: "BM25".into(),
        }
    }
}

impl MatchingConfig {
    pub fn from_json(json: &str) -> Result<MatchingConfig> {
        let config: MatchingConfig =
            serde_json::from_str(json).map_err(|e| Error::serialization("matching config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<MatchingConfig> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::io(path.display().to_string(), e))?;
        MatchingConfig::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(
            df_guard_ratio,
            self.df_guard_ratio.is_finite() && self.df_guard_ratio > 0.0
        );
        create_model(&self.model)?;
        Ok(())
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_result_set_size(mut self, result_set_size: usize) -> Self {
        self.result_set_size = result_set_size;
        self
    }

    pub fn with_match_empty_query(mut self, match_empty_query: bool) -> Self {
        self.match_empty_query = match_empty_query;
        self
    }

    /// Largest document frequency a term may have in a collection of
    /// `number_of_documents`.
    pub fn document_frequency_limit(&self, number_of_documents: u32) -> f64 {
        self.df_guard_ratio * number_of_documents as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config = MatchingConfig::from_json(r#"{"strategy": "taat", "model": "PL2"}"#).unwrap();
        assert_eq!(config.strategy, Strategy::Taat);
        assert_eq!(config.model, "PL2");
        assert_eq!(config.result_set_size, 1000);
        assert!(!config.match_empty_query);
        assert_eq!(config.taat_document_limit, 4_000_000);
    }

    #[test]
    fn test_invalid() {
        assert!(MatchingConfig::from_json(r#"{"model": "Okapi"}"#).is_err());
        assert!(MatchingConfig::from_json(r#"{"df_guard_ratio": 0.0}"#).is_err());
        assert!(MatchingConfig::from_json(r#"{"strategy": "saat"}"#).is_err());
    }
}
