//! Probabilistic and vector-space models: TF-IDF, BM25 and raw document frequency.

use quarry_common::Result;

use super::{ModelStatistics, WeightingModel, idf::log2};

/// Robertson's tf with Terrier-style idf `log2(N / df + 1)`.
#[derive(Debug, Clone)]
pub struct TfIdf {
    pub k1: f64,
    pub b: f64,
    statistics: ModelStatistics,
}

impl Default for TfIdf {
    fn default() -> Self {
        TfIdf {
            k1: 1.2,
            b: 0.75,
            statistics: ModelStatistics::default(),
        }
    }
}

impl WeightingModel for TfIdf {
    fn name(&self) -> String {
        "TF_IDF".into()
    }

    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()> {
        self.statistics = statistics.clone();
        Ok(())
    }

    fn score(&self, tf: f64, document_length: f64) -> f64 {
        let s = &self.statistics;
        let length_ratio = if s.average_document_length > 0.0 {
            document_length / s.average_document_length
        } else {
            1.0
        };
        let robertson_tf = self.k1 * tf / (tf + self.k1 * (1.0 - self.b + self.b * length_ratio));
        let idf = log2(s.number_of_documents / s.document_frequency + 1.0);
        s.key_frequency * robertson_tf * idf
    }

    fn clone_box(&self) -> Box<dyn WeightingModel> {
        Box::new(self.clone())
    }
}

/// Okapi BM25.
#[derive(Debug, Clone)]
pub struct Bm25 {
    pub k1: f64,
    pub b: f64,
    pub k3: f64,
    statistics: ModelStatistics,
}

impl Default for Bm25 {
    fn default() -> Self {
        Bm25 {
            k1: 1.2,
            b: 0.75,
            k3: 8.0,
            statistics: ModelStatistics::default(),
        }
    }
}

impl WeightingModel for Bm25 {
    fn name(&self) -> String {
        "BM25".into()
    }

    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()> {
        self.statistics = statistics.clone();
        Ok(())
    }

    fn score(&self, tf: f64, document_length: f64) -> f64 {
        let s = &self.statistics;
        let length_ratio = if s.average_document_length > 0.0 {
            document_length / s.average_document_length
        } else {
            1.0
        };
        let k = self.k1 * ((1.0 - self.b) + self.b * length_ratio);
        let idf = log2((s.number_of_documents - s.document_frequency + 0.5)
            / (s.document_frequency + 0.5));
        let query_weight = (self.k3 + 1.0) * s.key_frequency / (self.k3 + s.key_frequency);
        idf * ((self.k1 + 1.0) * tf / (k + tf)) * query_weight
    }

    fn clone_box(&self) -> Box<dyn WeightingModel> {
        Box::new(self.clone())
    }
}

/// Scores a posting by its raw within-document frequency.
#[derive(Debug, Clone, Default)]
pub struct Dl {
    key_frequency: f64,
}

impl WeightingModel for Dl {
    fn name(&self) -> String {
        "Dl".into()
    }

    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()> {
        self.key_frequency = statistics.key_frequency;
        Ok(())
    }

    fn score(&self, tf: f64, _document_length: f64) -> f64 {
        self.key_frequency * tf
    }

    fn clone_box(&self) -> Box<dyn WeightingModel> {
        Box::new(self.clone())
    }
}
