//! Posting storage of a quarry index.
//!
//! - [`layout`], [`posting`]: posting record layout (basic, block, field, block+field).
//! - [`config`]: per-structure codec negotiation persisted with the index.
//! - [`write`]: posting list encoder and the in-memory [`write::IndexBuilder`].
//! - [`read`]: the [`read::PostingIterator`] contract and its decoders.
//! - [`lexicon`], [`document_index`], [`statistics`]: term and document metadata.
//! - [`index`]: the persisted index directory.

pub mod config;
pub mod document_index;
pub mod index;
pub mod layout;
pub mod lexicon;
pub mod pointer;
pub mod posting;
pub mod read;
pub mod statistics;
pub mod write;

pub use config::CompressionConfig;
pub use document_index::DocumentIndex;
pub use index::{Index, IndexProperties, StorageMode};
pub use layout::{PostingFormat, PostingLayout, PostingType};
pub use lexicon::{Lexicon, LexiconEntry};
pub use pointer::BitIndexPointer;
pub use posting::Posting;
pub use read::{END_OF_LIST, IteratorState, PostingIterator};
pub use statistics::{CollectionStatistics, EntryStatistics};
pub use write::{IndexBuilder, IndexBuilderConfig, IndexDocument};
