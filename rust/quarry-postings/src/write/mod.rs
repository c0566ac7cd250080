//! Index construction: posting list encoding and inversion of tokenized documents.

pub mod builder;
pub mod posting_writer;

pub use builder::{IndexBuilder, IndexBuilderConfig, IndexDocument};
pub use posting_writer::PostingListWriter;
