//! Textual query language.
//!
//! ```text
//! query   := clause*
//! clause  := ['+' | '-'] body ['^' weight]
//! body    := leaf
//!          | '"' leaf+ '"' ['~' distance]
//!          | '#' operator '(' leaf+ ')'
//! leaf    := [field ':'] term
//! operator:= 'band' | 'syn' | 'o' gap | gap | 'uw' distance
//! ```
//!
//! A quoted phrase has gap 1; with `~n` it becomes an unordered window of `n`.
//! Operators hold leaves only.

use quarry_common::{Result, error::Error};

use super::{MatchingQueryTerms, MatchingTerm, Operator, QueryTerm, Requirement, SingleTerm};

/// Parses `text` into the matching terms of query `query_id`.
pub fn parse_query(query_id: &str, text: &str) -> Result<MatchingQueryTerms> {
    let mut parser = Parser::new(text);
    let mut query = MatchingQueryTerms::new(query_id);
    while let Some(term) = parser.clause()? {
        query.add(term);
    }
    Ok(query)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '^' | '~' | '(' | ')' | '"' | '#')
}

impl Parser {
    fn new(text: &str) -> Parser {
        Parser {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| !is_delimiter(c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Ensures a clause or leaf ends at whitespace, the end of input, or `allowed`.
    fn expect_boundary(&self, allowed: &[char]) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(c) if c.is_whitespace() || allowed.contains(&c) => Ok(()),
            Some(c) => Err(Error::unsupported_query(format!(
                "unexpected '{c}' at offset {}",
                self.pos
            ))),
        }
    }

    fn clause(&mut self) -> Result<Option<MatchingTerm>> {
        self.skip_whitespace();
        let requirement = match self.peek() {
            None => return Ok(None),
            Some('+') => Requirement::Required,
            Some('-') => Requirement::Excluded,
            Some(_) => Requirement::Optional,
        };
        if requirement != Requirement::Optional {
            self.pos += 1;
        }

        let term = match self.peek() {
            Some('"') => self.quoted()?,
            Some('#') => self.operator()?,
            Some(c @ ('(' | ')')) => {
                return Err(Error::unsupported_query(format!(
                    "unbalanced '{c}' at offset {}",
                    self.pos
                )));
            }
            _ => QueryTerm::Single(self.leaf()?),
        };

        let mut key_frequency = 1.0;
        if self.eat('^') {
            let weight = self.word();
            key_frequency = weight
                .parse::<f64>()
                .ok()
                .filter(|w| w.is_finite() && *w >= 0.0)
                .ok_or_else(|| {
                    Error::unsupported_query(format!("invalid term weight '{weight}'"))
                })?;
        }
        self.expect_boundary(&[])?;
        Ok(Some(
            MatchingTerm::new(term)
                .with_key_frequency(key_frequency)
                .with_requirement(requirement),
        ))
    }

    fn leaf(&mut self) -> Result<SingleTerm> {
        let start = self.pos;
        let word = self.word();
        if word.is_empty() {
            return Err(match self.peek() {
                Some(c @ ('#' | '(' | '"')) => Error::unsupported_query(format!(
                    "nested operator '{c}' at offset {start}"
                )),
                Some(c) => Error::unsupported_query(format!("unexpected '{c}' at offset {start}")),
                None => Error::unsupported_query("missing term at end of query"),
            });
        }
        Ok(match word.split_once(':') {
            Some((field, term)) if !field.is_empty() && !term.is_empty() => {
                SingleTerm::in_field(term, field)
            }
            _ => SingleTerm::new(word),
        })
    }

    /// Leaves up to `close`, which is consumed.
    fn leaves(&mut self, close: char) -> Result<Vec<QueryTerm>> {
        let mut leaves = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(Error::unsupported_query(format!(
                        "missing closing '{close}'"
                    )));
                }
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    leaves.push(QueryTerm::Single(self.leaf()?));
                    self.expect_boundary(&[close])?;
                }
            }
        }
        if leaves.is_empty() {
            return Err(Error::unsupported_query("operator without terms"));
        }
        Ok(leaves)
    }

    fn quoted(&mut self) -> Result<QueryTerm> {
        self.bump();
        let mut leaves = self.leaves('"')?;
        if self.eat('~') {
            let distance = self.number("window distance")?;
            return Ok(QueryTerm::compound(Operator::Window { distance }, leaves));
        }
        if leaves.len() == 1 {
            return Ok(leaves.remove(0));
        }
        Ok(QueryTerm::compound(Operator::Phrase { gap: 1 }, leaves))
    }

    fn operator(&mut self) -> Result<QueryTerm> {
        self.bump();
        let name = self.word();
        if !self.eat('(') {
            return Err(Error::unsupported_query(format!(
                "operator '#{name}' must be followed by '('"
            )));
        }
        let operator = operator_by_name(&name)?;
        let children = self.leaves(')')?;
        Ok(QueryTerm::compound(operator, children))
    }

    fn number(&mut self, what: &str) -> Result<u32> {
        let digits = self.word();
        digits
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| Error::unsupported_query(format!("invalid {what} '{digits}'")))
    }
}

fn operator_by_name(name: &str) -> Result<Operator> {
    let positive = |digits: &str, what: &str| {
        digits
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| Error::unsupported_query(format!("invalid {what} in '#{name}'")))
    };
    match name {
        "band" => Ok(Operator::And),
        "syn" => Ok(Operator::Synonym),
        _ if name.starts_with("uw") => Ok(Operator::Window {
            distance: positive(&name[2..], "window distance")?,
        }),
        _ if name.starts_with('o') => Ok(Operator::Phrase {
            gap: positive(&name[1..], "phrase gap")?,
        }),
        _ if name.starts_with(|c: char| c.is_ascii_digit()) => Ok(Operator::Phrase {
            gap: positive(name, "phrase gap")?,
        }),
        _ => Err(Error::unsupported_query(format!(
            "unknown operator '#{name}'"
        ))),
    }
}
