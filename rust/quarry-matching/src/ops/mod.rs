//! Merge operators: compound query terms exposed as a single posting iterator.

pub mod and;
pub mod or;
pub mod resolve;

pub use and::{AndIterator, PositionFilter};
pub use or::OrIterator;
pub use resolve::{ResolvedTerm, TermResolver};
