//! Divergence From Randomness compositions.
//!
//! A DFR score is `key_frequency * after_effect(tfn) * basic_model(tfn)`, where `tfn`
//! is the term frequency normalised by document length. Each component is chosen
//! independently, and the model name is the concatenation of the component names:
//! `InL2` is basic model `In`, after effect `L`, normalisation `2`.

use std::f64::consts::PI;

use quarry_common::Result;

use super::{
    ModelStatistics, WeightingModel,
    idf::{Idf, REC_LOG_2_OF_E, log2},
};

/// Randomness model of term occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicModel {
    /// Inverse document frequency.
    In,
    /// Inverse expected document frequency.
    InExp,
    /// Poisson approximation of the binomial.
    P,
    /// Divergence approximation of the binomial.
    D,
    /// Geometric Bose-Einstein.
    G,
}

impl BasicModel {
    pub fn name(&self) -> &'static str {
        match self {
            BasicModel::In => "In",
            BasicModel::InExp => "In_exp",
            BasicModel::P => "P",
            BasicModel::D => "D",
            BasicModel::G => "G",
        }
    }

    pub fn score(&self, tfn: f64, statistics: &ModelStatistics) -> f64 {
        let n = statistics.number_of_documents;
        let term_frequency = statistics.term_frequency;
        let idf = Idf::new(n);
        match self {
            BasicModel::In => tfn * idf.idf_dfr(statistics.document_frequency),
            BasicModel::InExp => tfn * idf.idf_n_exp(term_frequency),
            BasicModel::P => {
                let f = term_frequency / n;
                tfn * log2(1.0 / f)
                    + f * REC_LOG_2_OF_E
                    + 0.5 * log2(2.0 * PI * tfn)
                    + tfn * (log2(tfn) - REC_LOG_2_OF_E)
            }
            BasicModel::D => {
                let p = 1.0 / n;
                let phi = tfn / term_frequency;
                let divergence = if phi < 1.0 {
                    phi * log2(phi / p) + (1.0 - phi) * log2((1.0 - phi) / (1.0 - p))
                } else {
                    phi * log2(phi / p)
                };
                let variance = 2.0 * PI * tfn * (1.0 - phi);
                if variance > 0.0 {
                    term_frequency * divergence + 0.5 * log2(variance)
                } else {
                    term_frequency * divergence
                }
            }
            BasicModel::G => {
                let f = term_frequency / n;
                log2(1.0 + f) + tfn * log2((1.0 + f) / f)
            }
        }
    }
}

/// Gain curve applied to the basic model score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterEffect {
    /// Laplace succession: `1 / (tfn + 1)`.
    L,
    /// Ratio of two Bernoulli processes: `(F + 1) / (df * (tfn + 1))`.
    B,
    None,
}

impl AfterEffect {
    pub fn name(&self) -> &'static str {
        match self {
            AfterEffect::L => "L",
            AfterEffect::B => "B",
            AfterEffect::None => "",
        }
    }

    pub fn gain(&self, tfn: f64, statistics: &ModelStatistics) -> f64 {
        match self {
            AfterEffect::L => 1.0 / (tfn + 1.0),
            AfterEffect::B => {
                (statistics.term_frequency + 1.0) / (statistics.document_frequency * (tfn + 1.0))
            }
            AfterEffect::None => 1.0,
        }
    }
}

/// Term frequency normalisation by document length.
///
/// Every variant returns `tf` unchanged for a zero-length document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalisation {
    /// No normalisation.
    N0,
    /// `tf * avgl / dl`.
    N1,
    /// `tf * log2(1 + c * avgl / dl)`.
    N2 { c: f64 },
    /// Dirichlet smoothing: `(tf + mu * F / tokens) / (dl + mu) * mu`.
    N3 { mu: f64 },
}

impl Normalisation {
    pub fn name(&self) -> &'static str {
        match self {
            Normalisation::N0 => "0",
            Normalisation::N1 => "1",
            Normalisation::N2 { .. } => "2",
            Normalisation::N3 { .. } => "3",
        }
    }

    pub fn normalise(&self, tf: f64, document_length: f64, statistics: &ModelStatistics) -> f64 {
        if document_length == 0.0 {
            return tf;
        }
        let average = statistics.average_document_length;
        match *self {
            Normalisation::N0 => tf,
            Normalisation::N1 => tf * average / document_length,
            Normalisation::N2 { c } => tf * log2(1.0 + c * average / document_length),
            Normalisation::N3 { mu } => {
                let background = if statistics.number_of_tokens > 0.0 {
                    statistics.term_frequency / statistics.number_of_tokens
                } else {
                    0.0
                };
                (tf + mu * background) / (document_length + mu) * mu
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DfrModel {
    pub basic_model: BasicModel,
    pub after_effect: AfterEffect,
    pub normalisation: Normalisation,
    statistics: ModelStatistics,
}

impl DfrModel {
    pub fn new(
        basic_model: BasicModel,
        after_effect: AfterEffect,
        normalisation: Normalisation,
    ) -> DfrModel {
        DfrModel {
            basic_model,
            after_effect,
            normalisation,
            statistics: ModelStatistics::default(),
        }
    }

    /// Parses a composition name such as `PL2`, `In_expB2` or `G0`.
    pub fn parse(name: &str) -> Option<DfrModel> {
        let (basic_model, rest) = [
            ("In_exp", BasicModel::InExp),
            ("In", BasicModel::In),
            ("P", BasicModel::P),
            ("D", BasicModel::D),
            ("G", BasicModel::G),
        ]
        .into_iter()
        .find_map(|(prefix, model)| name.strip_prefix(prefix).map(|rest| (model, rest)))?;
        let (after_effect, rest) = match rest.as_bytes().first() {
            Some(b'L') => (AfterEffect::L, &rest[1..]),
            Some(b'B') => (AfterEffect::B, &rest[1..]),
            _ => (AfterEffect::None, rest),
        };
        let normalisation = match rest {
            "0" => Normalisation::N0,
            "1" => Normalisation::N1,
            "2" => Normalisation::N2 { c: 1.0 },
            "3" => Normalisation::N3 { mu: 1000.0 },
            _ => return None,
        };
        Some(DfrModel::new(basic_model, after_effect, normalisation))
    }
}

impl WeightingModel for DfrModel {
    fn name(&self) -> String {
        format!(
            "{}{}{}",
            self.basic_model.name(),
            self.after_effect.name(),
            self.normalisation.name()
        )
    }

    fn prepare(&mut self, statistics: &ModelStatistics) -> Result<()> {
        self.statistics = statistics.clone();
        Ok(())
    }

    fn score(&self, tf: f64, document_length: f64) -> f64 {
        let statistics = &self.statistics;
        let tfn = self.normalisation.normalise(tf, document_length, statistics);
        statistics.key_frequency
            * self.after_effect.gain(tfn, statistics)
            * self.basic_model.score(tfn, statistics)
    }

    fn clone_box(&self) -> Box<dyn WeightingModel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::statistics;

    #[test]
    fn test_parse_names() {
        let model = DfrModel::parse("In_expB2").unwrap();
        assert_eq!(model.basic_model, BasicModel::InExp);
        assert_eq!(model.after_effect, AfterEffect::B);
        assert_eq!(model.normalisation, Normalisation::N2 { c: 1.0 });
        assert_eq!(DfrModel::parse("G0").unwrap().name(), "G0");
        assert!(DfrModel::parse("In").is_none());
        assert!(DfrModel::parse("InL4").is_none());
        assert!(DfrModel::parse("BM25").is_none());
    }

    #[test]
    fn test_normalisation_pass_through() {
        let statistics = statistics(20, 60);
        for normalisation in [
            Normalisation::N0,
            Normalisation::N1,
            Normalisation::N2 { c: 1.0 },
            Normalisation::N3 { mu: 1000.0 },
        ] {
            assert_eq!(normalisation.normalise(3.0, 0.0, &statistics), 3.0);
        }
        // Average length documents keep their frequency under normalisation 1 and 2.
        assert_eq!(Normalisation::N1.normalise(3.0, 100.0, &statistics), 3.0);
        assert_eq!(
            Normalisation::N2 { c: 1.0 }.normalise(3.0, 100.0, &statistics),
            3.0
        );
    }

    #[test]
    fn test_pl2_value() {
        let mut model = DfrModel::parse("PL2").unwrap();
        model.prepare(&statistics(20, 60)).unwrap();
        let f: f64 = 60.0 / 1000.0;
        let expected = (log2(1.0 / f) + f * REC_LOG_2_OF_E + 0.5 * log2(2.0 * PI)
            - REC_LOG_2_OF_E)
            / 2.0;
        assert!((model.score(1.0, 100.0) - expected).abs() < 1e-12);
    }
}
