use bincode::{Decode, Encode};
use quarry_common::{DocId, Result, verify_data};

use crate::pointer::BitIndexPointer;

/// Per-document metadata: external document number, length in tokens and per-field
/// lengths.
#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct DocumentIndex {
    docnos: Vec<String>,
    lengths: Vec<u32>,
    field_count: usize,
    /// Row-major `[document][field]` lengths.
    field_lengths: Vec<u32>,
    /// Direct index list of each document; empty when the index has no direct index.
    direct_pointers: Vec<BitIndexPointer>,
}

impl DocumentIndex {
    pub fn new(field_count: usize) -> DocumentIndex {
        DocumentIndex {
            field_count,
            ..Default::default()
        }
    }

    pub fn push(&mut self, docno: String, length: u32, field_lengths: &[u32]) -> DocId {
        let id = self.docnos.len() as DocId;
        self.docnos.push(docno);
        self.lengths.push(length);
        let mut fields = field_lengths.to_vec();
        fields.resize(self.field_count, 0);
        self.field_lengths.extend_from_slice(&fields);
        id
    }

    pub fn len(&self) -> usize {
        self.docnos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docnos.is_empty()
    }

    pub fn field_count(&self) -> usize {
        self.field_count
    }

    pub fn docno(&self, id: DocId) -> Option<&str> {
        self.docnos.get(id as usize).map(String::as_str)
    }

    /// Document length in tokens; zero for unknown ids.
    pub fn document_length(&self, id: DocId) -> u32 {
        self.lengths.get(id as usize).copied().unwrap_or(0)
    }

    pub fn field_lengths(&self, id: DocId) -> &[u32] {
        let start = id as usize * self.field_count;
        self.field_lengths
            .get(start..start + self.field_count)
            .unwrap_or(&[])
    }

    pub fn set_direct_pointers(&mut self, pointers: Vec<BitIndexPointer>) {
        self.direct_pointers = pointers;
    }

    pub fn direct_pointer(&self, id: DocId) -> Option<&BitIndexPointer> {
        self.direct_pointers.get(id as usize)
    }

    pub fn has_direct_pointers(&self) -> bool {
        !self.direct_pointers.is_empty() || self.docnos.is_empty()
    }

    pub fn find_docno(&self, docno: &str) -> Option<DocId> {
        self.docnos.iter().position(|d| d == docno).map(|i| i as DocId)
    }

    pub fn validate(&self) -> Result<()> {
        verify_data!(document_index, self.lengths.len() == self.docnos.len());
        verify_data!(
            document_index,
            self.field_lengths.len() == self.docnos.len() * self.field_count
        );
        verify_data!(
            document_index,
            self.direct_pointers.is_empty() || self.direct_pointers.len() == self.docnos.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_index() {
        let mut documents = DocumentIndex::new(2);
        assert_eq!(documents.push("d0".into(), 5, &[2, 3]), 0);
        assert_eq!(documents.push("d1".into(), 0, &[]), 1);
        documents.validate().unwrap();
        assert_eq!(documents.docno(1), Some("d1"));
        assert_eq!(documents.document_length(0), 5);
        assert_eq!(documents.field_lengths(0), &[2, 3]);
        assert_eq!(documents.field_lengths(1), &[0, 0]);
        assert!(documents.field_lengths(2).is_empty());
        assert_eq!(documents.document_length(9), 0);
        assert_eq!(documents.find_docno("d1"), Some(1));
    }
}
