//! Smoothed query-likelihood language models.

use quarry_common::Result;

use super::{ModelStatistics, WeightingModel, idf::log2};

/// Dirichlet-smoothed language model.
#[derive(Debug, Clone)]
pub struct DirichletLm {
    pub mu: f64,
    statistics: ModelStatistics,
}

impl Default for DirichletLm {
    fn default() -> Self {
        DirichletLm {
            mu: 2500.0,
            statistics: ModelStatistics::default(),
        }
    }
}

impl WeightingModel for DirichletLm {
    fn name(&self) -> String {
        "DirichletLM".into()
    }

    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()> {
        self.statistics = statistics.clone();
        Ok(())
    }

    fn score(&self, tf: f64, document_length: f64) -> f64 {
        let s = &self.statistics;
        let background = self.mu * s.term_frequency / s.number_of_tokens;
        s.key_frequency
            * (log2(1.0 + tf / background) + log2(self.mu / (document_length + self.mu)))
    }

    fn clone_box(&self) -> Box<dyn WeightingModel> {
        Box::new(self.clone())
    }
}

/// Hiemstra's linearly interpolated language model.
#[derive(Debug, Clone)]
pub struct HiemstraLm {
    pub lambda: f64,
    statistics: ModelStatistics,
}

impl Default for HiemstraLm {
    fn default() -> Self {
        HiemstraLm {
            lambda: 0.15,
            statistics: ModelStatistics::default(),
        }
    }
}

impl WeightingModel for HiemstraLm {
    fn name(&self) -> String {
        "Hiemstra_LM".into()
    }

    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()> {
        self.statistics = statistics.clone();
        Ok(())
    }

    fn score(&self, tf: f64, document_length: f64) -> f64 {
        let s = &self.statistics;
        let document_length = if document_length == 0.0 { tf } else { document_length };
        s.key_frequency
            * log2(
                1.0 + (self.lambda * tf * s.number_of_tokens)
                    / ((1.0 - self.lambda) * s.term_frequency * document_length),
            )
    }

    fn clone_box(&self) -> Box<dyn WeightingModel> {
        Box::new(self.clone())
    }
}
