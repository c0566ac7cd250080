//! Shared vocabulary of the quarry crates: the error type, the `Result` alias,
//! the argument and data checks, and the identifier types.

pub mod error;
pub mod result;

pub use result::Result;

/// Document identifier within one index.
pub type DocId = u32;

/// Term identifier assigned by the lexicon.
pub type TermId = u32;
