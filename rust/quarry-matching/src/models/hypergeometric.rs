//! Parameter-free hypergeometric DFR models.
//!
//! Both models are undefined when the term covers the whole document, so postings
//! with `tf >= dl` (and empty documents) score zero.

use std::f64::consts::PI;

use quarry_common::Result;

use super::{ModelStatistics, WeightingModel, idf::log2};

fn information(tf: f64, document_length: f64, statistics: &ModelStatistics) -> f64 {
    let f = tf / document_length;
    tf * log2(
        (tf * statistics.average_document_length / document_length)
            * (statistics.number_of_documents / statistics.term_frequency),
    ) + 0.5 * log2(2.0 * PI * tf * (1.0 - f))
}

#[derive(Debug, Clone, Default)]
pub struct Dph {
    statistics: ModelStatistics,
}

impl WeightingModel for Dph {
    fn name(&self) -> String {
        "DPH".into()
    }

    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()> {
        self.statistics = statistics.clone();
        Ok(())
    }

    fn score(&self, tf: f64, document_length: f64) -> f64 {
        if document_length == 0.0 || tf >= document_length {
            return 0.0;
        }
        let f = tf / document_length;
        let norm = (1.0 - f) * (1.0 - f) / (tf + 1.0);
        self.statistics.key_frequency
            * norm
            * information(tf, document_length, &self.statistics)
    }

    fn clone_box(&self) -> Box<dyn WeightingModel> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Dlh13 {
    pub k: f64,
    statistics: ModelStatistics,
}

impl Default for Dlh13 {
    fn default() -> Self {
        Dlh13 {
            k: 0.5,
            statistics: ModelStatistics::default(),
        }
    }
}

impl WeightingModel for Dlh13 {
    fn name(&self) -> String {
        "DLH13".into()
    }

    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()> {
        self.statistics = statistics.clone();
        Ok(())
    }

    fn score(&self, tf: f64, document_length: f64) -> f64 {
        if document_length == 0.0 || tf >= document_length {
            return 0.0;
        }
        self.statistics.key_frequency * information(tf, document_length, &self.statistics)
            / (tf + self.k)
    }

    fn clone_box(&self) -> Box<dyn WeightingModel> {
        Box::new(self.clone())
    }
}
