use std::fmt;

use crate::models::WeightingModel;

use super::QueryTerm;

/// How a term constrains the documents a query retrieves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Requirement {
    /// Contributes to the score of documents containing it.
    #[default]
    Optional,
    /// Documents without the term are not retrieved.
    Required,
    /// Documents containing the term are not retrieved.
    Excluded,
}

/// One top-level term of a query with its query-side metadata.
#[derive(Debug, Clone)]
pub struct MatchingTerm {
    pub term: QueryTerm,
    /// Query-side weight of the term.
    pub key_frequency: f64,
    pub requirement: Requirement,
    /// Free-form label carried through to diagnostics.
    pub tag: Option<String>,
    /// Models scoring this term. Empty means the matching configuration's default.
    pub models: Vec<Box<dyn WeightingModel>>,
}

impl MatchingTerm {
    pub fn new(term: QueryTerm) -> MatchingTerm {
        MatchingTerm {
            term,
            key_frequency: 1.0,
            requirement: Requirement::Optional,
            tag: None,
            models: Vec::new(),
        }
    }

    pub fn with_key_frequency(mut self, key_frequency: f64) -> Self {
        self.key_frequency = key_frequency;
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_model(mut self, model: Box<dyn WeightingModel>) -> Self {
        self.models.push(model);
        self
    }

    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Required
    }

    pub fn is_excluded(&self) -> bool {
        self.requirement == Requirement::Excluded
    }
}

impl fmt::Display for MatchingTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.requirement {
            Requirement::Required => f.write_str("+")?,
            Requirement::Excluded => f.write_str("-")?,
            Requirement::Optional => {}
        }
        write!(f, "{}", self.term)?;
        if self.key_frequency != 1.0 {
            write!(f, "^{}", self.key_frequency)?;
        }
        Ok(())
    }
}

/// The resolved input of one matching invocation.
#[derive(Debug, Clone, Default)]
pub struct MatchingQueryTerms {
    pub query_id: String,
    pub terms: Vec<MatchingTerm>,
}

impl MatchingQueryTerms {
    pub fn new(query_id: impl Into<String>) -> MatchingQueryTerms {
        MatchingQueryTerms {
            query_id: query_id.into(),
            terms: Vec::new(),
        }
    }

    /// Adds a term. A term equal to an existing one with the same requirement is
    /// folded into it by summing key frequencies.
    pub fn add(&mut self, term: MatchingTerm) {
        match self
            .terms
            .iter_mut()
            .find(|t| t.term == term.term && t.requirement == term.requirement)
        {
            Some(existing) => {
                existing.key_frequency += term.key_frequency;
                existing.models.extend(term.models);
                if existing.tag.is_none() {
                    existing.tag = term.tag;
                }
            }
            None => self.terms.push(term),
        }
    }

    pub fn with_term(mut self, term: MatchingTerm) -> Self {
        self.add(term);
        self
    }

    /// Assigns `model` to every term that has none.
    pub fn set_default_model(&mut self, model: &dyn WeightingModel) {
        for term in self.terms.iter_mut().filter(|t| t.models.is_empty()) {
            term.models.push(model.clone_box());
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchingTerm> {
        self.terms.iter()
    }
}

impl fmt::Display for MatchingQueryTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::create_model;

    #[test]
    fn test_duplicates_merge() {
        let mut query = MatchingQueryTerms::new("q1");
        query.add(MatchingTerm::new(QueryTerm::single("fox")));
        query.add(MatchingTerm::new(QueryTerm::single("dog")));
        query.add(MatchingTerm::new(QueryTerm::single("fox")).with_key_frequency(2.0));
        query.add(
            MatchingTerm::new(QueryTerm::single("fox")).with_requirement(Requirement::Excluded),
        );
        assert_eq!(query.len(), 3);
        assert_eq!(query.terms[0].key_frequency, 3.0);
        assert_eq!(query.to_string(), "fox^3 dog -fox");
    }

    #[test]
    fn test_default_model() {
        let mut query = MatchingQueryTerms::new("q1")
            .with_term(
                MatchingTerm::new(QueryTerm::single("a")).with_model(create_model("PL2").unwrap()),
            )
            .with_term(MatchingTerm::new(QueryTerm::single("b")));
        query.set_default_model(create_model("BM25").unwrap().as_ref());
        assert_eq!(query.terms[0].models[0].name(), "PL2");
        assert_eq!(query.terms[1].models[0].name(), "BM25");
    }
}
