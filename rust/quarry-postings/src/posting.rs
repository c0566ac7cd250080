use quarry_common::{DocId, Result, error::Error};
use serde::{Deserialize, Serialize};

use crate::layout::PostingLayout;

/// One occurrence record of a term in a document (inverted index), or of a document's
/// term (direct index, where `id` is the term id).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Posting {
    pub id: DocId,
    pub frequency: u32,
    /// Ascending token positions; empty unless the layout has blocks.
    pub positions: Vec<u32>,
    /// Per-field term frequencies; empty unless the layout has fields.
    pub field_frequencies: Vec<u32>,
}

impl Posting {
    pub fn new(id: DocId, frequency: u32) -> Posting {
        Posting {
            id,
            frequency,
            ..Default::default()
        }
    }

    pub fn with_positions(mut self, positions: Vec<u32>) -> Posting {
        self.positions = positions;
        self
    }

    pub fn with_field_frequencies(mut self, field_frequencies: Vec<u32>) -> Posting {
        self.field_frequencies = field_frequencies;
        self
    }
}

/// Checks that `postings` form a valid list for `layout`: strictly increasing ids,
/// positive frequencies, strictly increasing positions and one frequency per field.
pub fn validate_postings(postings: &[Posting], layout: &PostingLayout) -> Result<()> {
    let mut previous: Option<DocId> = None;
    for posting in postings {
        if previous.is_some_and(|p| posting.id <= p) {
            return Err(Error::invalid_arg(
                "postings",
                format!("id {} does not follow {}", posting.id, previous.unwrap_or(0)),
            ));
        }
        previous = Some(posting.id);
        if posting.id == DocId::MAX {
            return Err(Error::invalid_arg("postings", "id is reserved for end of list"));
        }
        if posting.frequency == 0 {
            return Err(Error::invalid_arg(
                "postings",
                format!("zero frequency for id {}", posting.id),
            ));
        }
        if layout.blocks && posting.positions.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::invalid_arg(
                "postings",
                format!("positions of id {} are not strictly increasing", posting.id),
            ));
        }
        if layout.field_count != posting.field_frequencies.len() && layout.has_fields() {
            return Err(Error::invalid_arg(
                "postings",
                format!(
                    "id {} has {} field frequencies, layout declares {}",
                    posting.id,
                    posting.field_frequencies.len(),
                    layout.field_count
                ),
            ));
        }
    }
    Ok(())
}
