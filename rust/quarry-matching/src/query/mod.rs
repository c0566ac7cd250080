//! Query term trees and the textual query language.

pub mod matching_terms;
pub mod parser;

use std::fmt;

pub use matching_terms::{MatchingQueryTerms, MatchingTerm, Requirement};
pub use parser::parse_query;

/// A single vocabulary term, optionally restricted to one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SingleTerm {
    pub term: String,
    pub field: Option<String>,
}

impl SingleTerm {
    pub fn new(term: impl Into<String>) -> SingleTerm {
        SingleTerm {
            term: term.into(),
            field: None,
        }
    }

    pub fn in_field(term: impl Into<String>, field: impl Into<String>) -> SingleTerm {
        SingleTerm {
            term: term.into(),
            field: Some(field.into()),
        }
    }
}

impl fmt::Display for SingleTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{field}:{}", self.term),
            None => f.write_str(&self.term),
        }
    }
}

/// Compound operators over a list of child terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Documents containing every child.
    And,
    /// Children in order, consecutive occurrences `1..=gap` positions apart.
    Phrase { gap: u32 },
    /// Children in any order within a window of `distance` positions.
    Window { distance: u32 },
    /// Documents containing any child; frequencies and statistics are summed.
    Synonym,
}

impl Operator {
    pub fn needs_positions(&self) -> bool {
        matches!(self, Operator::Phrase { .. } | Operator::Window { .. })
    }
}

/// Query term tree. Built once per request from the query text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryTerm {
    Single(SingleTerm),
    Compound {
        operator: Operator,
        children: Vec<QueryTerm>,
    },
}

impl QueryTerm {
    pub fn single(term: impl Into<String>) -> QueryTerm {
        QueryTerm::Single(SingleTerm::new(term))
    }

    pub fn compound(operator: Operator, children: Vec<QueryTerm>) -> QueryTerm {
        QueryTerm::Compound { operator, children }
    }

    pub fn and<S: Into<String>>(terms: impl IntoIterator<Item = S>) -> QueryTerm {
        Self::of(Operator::And, terms)
    }

    pub fn phrase<S: Into<String>>(terms: impl IntoIterator<Item = S>) -> QueryTerm {
        Self::of(Operator::Phrase { gap: 1 }, terms)
    }

    pub fn window<S: Into<String>>(distance: u32, terms: impl IntoIterator<Item = S>) -> QueryTerm {
        Self::of(Operator::Window { distance }, terms)
    }

    pub fn synonym<S: Into<String>>(terms: impl IntoIterator<Item = S>) -> QueryTerm {
        Self::of(Operator::Synonym, terms)
    }

    fn of<S: Into<String>>(operator: Operator, terms: impl IntoIterator<Item = S>) -> QueryTerm {
        QueryTerm::Compound {
            operator,
            children: terms.into_iter().map(QueryTerm::single).collect(),
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, QueryTerm::Single(_))
    }

    /// Depth of the tree; a single term has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            QueryTerm::Single(_) => 1,
            QueryTerm::Compound { children, .. } => {
                1 + children.iter().map(QueryTerm::depth).max().unwrap_or(0)
            }
        }
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTerm::Single(term) => write!(f, "{term}"),
            QueryTerm::Compound { operator, children } => {
                match operator {
                    Operator::And => f.write_str("#band(")?,
                    Operator::Phrase { gap } => write!(f, "#o{gap}(")?,
                    Operator::Window { distance } => write!(f, "#uw{distance}(")?,
                    Operator::Synonym => f.write_str("#syn(")?,
                }
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(QueryTerm::phrase(["a", "b"]).to_string(), "#o1(a b)");
        assert_eq!(QueryTerm::window(8, ["a", "b"]).to_string(), "#uw8(a b)");
        assert_eq!(
            QueryTerm::Single(SingleTerm::in_field("fox", "title")).to_string(),
            "title:fox"
        );
        assert_eq!(QueryTerm::synonym(["x"]).depth(), 2);
    }
}
