//! Posting list readers.

pub mod bit;
pub mod chunked;
pub mod field_only;
pub mod iterator;
pub mod memory;
pub mod posting_index;

pub use field_only::FieldOnlyPostingIterator;
pub use iterator::{DocumentLookup, END_OF_LIST, IteratorState, PostingIterator};
pub use memory::MemoryPostingIterator;
pub use posting_index::PostingIndex;
