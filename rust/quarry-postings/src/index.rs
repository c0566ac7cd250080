//! A complete, immutable index: properties, lexicon, document index and posting files.
//!
//! On disk an index is a directory:
//!
//! ```text
//! properties.json   format version, posting layout, codec names, collection statistics
//! lexicon.bin       bincode lexicon
//! documents.bin     bincode document index (with direct index pointers)
//! inverted.bf       inverted posting lists
//! direct.bf         direct posting lists (optional)
//! ```

use std::{path::Path, sync::Arc};

use quarry_common::{DocId, Result, error::Error, verify_data};
use quarry_io::{FileReader, FileWriter, ReadAt, SealingWrite, SeekingFileReader, memory};
use serde::{Deserialize, Serialize};

use crate::{
    config::{CompressionConfig, Structure},
    document_index::DocumentIndex,
    layout::PostingLayout,
    lexicon::{Lexicon, LexiconEntry},
    read::{DocumentLookup, PostingIndex, PostingIterator},
    statistics::CollectionStatistics,
};

pub const FORMAT_VERSION: u32 = 1;

const PROPERTIES_FILE: &str = "properties.json";
const LEXICON_FILE: &str = "lexicon.bin";
const DOCUMENTS_FILE: &str = "documents.bin";

/// Index-wide metadata persisted as `properties.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexProperties {
    pub format_version: u32,
    pub layout: PostingLayout,
    pub compression: CompressionConfig,
    pub statistics: CollectionStatistics,
    pub has_direct: bool,
}

/// How posting files are accessed after [`Index::open_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Positional reads on a shared handle.
    #[default]
    Positional,
    /// Seek-then-read on a single cursor, serialized per file.
    Seeking,
    /// Whole files loaded into memory.
    Memory,
}

pub struct Index {
    properties: IndexProperties,
    lexicon: Lexicon,
    documents: Arc<DocumentIndex>,
    inverted: PostingIndex,
    direct: Option<PostingIndex>,
}

impl Index {
    pub(crate) fn from_parts(
        properties: IndexProperties,
        lexicon: Lexicon,
        documents: Arc<DocumentIndex>,
        inverted: Arc<dyn ReadAt>,
        direct: Option<Arc<dyn ReadAt>>,
    ) -> Result<Index> {
        verify_data!(format_version, properties.format_version == FORMAT_VERSION);
        verify_data!(
            number_of_documents,
            properties.statistics.number_of_documents as usize == documents.len()
        );
        verify_data!(
            field_count,
            properties.layout.field_count == documents.field_count()
        );
        properties.compression.validate()?;
        let inverted = PostingIndex::new(
            inverted,
            Structure::Inverted,
            properties.layout,
            properties.compression.encoding(Structure::Inverted),
            DocumentLookup::new(documents.clone()),
        );
        let direct = direct.map(|storage| {
            PostingIndex::new(
                storage,
                Structure::Direct,
                properties.layout,
                properties.compression.encoding(Structure::Direct),
                DocumentLookup::none(),
            )
        });
        Ok(Index {
            properties,
            lexicon,
            documents,
            inverted,
            direct,
        })
    }

    pub fn open(dir: impl AsRef<Path>) -> Result<Index> {
        Index::open_with(dir, StorageMode::default())
    }

    pub fn open_with(dir: impl AsRef<Path>, mode: StorageMode) -> Result<Index> {
        let dir = dir.as_ref();
        let properties: IndexProperties = serde_json::from_slice(&read_file(dir, PROPERTIES_FILE)?)
            .map_err(|e| Error::serialization(PROPERTIES_FILE, e))?;
        let lexicon: Lexicon = decode(&read_file(dir, LEXICON_FILE)?, LEXICON_FILE)?;
        lexicon.validate()?;
        let documents: DocumentIndex = decode(&read_file(dir, DOCUMENTS_FILE)?, DOCUMENTS_FILE)?;
        documents.validate()?;

        let inverted = open_storage(dir, Structure::Inverted.file_name(), mode)?;
        let direct = if properties.has_direct {
            Some(open_storage(dir, Structure::Direct.file_name(), mode)?)
        } else {
            None
        };
        log::info!(
            "opened index {}: {} documents, {} terms, {} posting format",
            dir.display(),
            documents.len(),
            lexicon.len(),
            properties.layout.posting_type()
        );
        Index::from_parts(properties, lexicon, Arc::new(documents), inverted, direct)
    }

    /// Persists the index into `dir`, which is created if missing. Existing index
    /// files are not overwritten.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir.display().to_string(), e))?;
        let properties = serde_json::to_vec_pretty(&self.properties)
            .map_err(|e| Error::serialization(PROPERTIES_FILE, e))?;
        write_file(dir, PROPERTIES_FILE, &properties)?;
        write_file(dir, LEXICON_FILE, &encode(&self.lexicon, LEXICON_FILE)?)?;
        write_file(dir, DOCUMENTS_FILE, &encode(self.documents.as_ref(), DOCUMENTS_FILE)?)?;
        copy_storage(dir, Structure::Inverted.file_name(), self.inverted.storage())?;
        if let Some(direct) = &self.direct {
            copy_storage(dir, Structure::Direct.file_name(), direct.storage())?;
        }
        log::info!("wrote index to {}", dir.display());
        Ok(())
    }

    pub fn properties(&self) -> &IndexProperties {
        &self.properties
    }

    pub fn collection_statistics(&self) -> &CollectionStatistics {
        &self.properties.statistics
    }

    pub fn layout(&self) -> PostingLayout {
        self.properties.layout
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn documents(&self) -> &Arc<DocumentIndex> {
        &self.documents
    }

    pub fn inverted(&self) -> &PostingIndex {
        &self.inverted
    }

    pub fn direct(&self) -> Option<&PostingIndex> {
        self.direct.as_ref()
    }

    /// Opens the inverted list of a lexicon entry.
    pub fn postings(&self, entry: &LexiconEntry) -> Result<Box<dyn PostingIterator>> {
        self.inverted.open_iterator(&entry.pointer)
    }

    /// Looks up `term` and opens its inverted list.
    pub fn term_postings(&self, term: &str) -> Result<Box<dyn PostingIterator>> {
        let entry = self
            .lexicon
            .get(term)
            .ok_or_else(|| Error::not_found(term))?;
        self.postings(entry)
    }

    /// Opens the direct list (term ids) of a document.
    pub fn document_terms(&self, id: DocId) -> Result<Box<dyn PostingIterator>> {
        let direct = self
            .direct
            .as_ref()
            .ok_or_else(|| Error::invalid_operation("index has no direct index"))?;
        let pointer = self
            .documents
            .direct_pointer(id)
            .ok_or_else(|| Error::not_found(format!("document {id}")))?;
        direct.open_iterator(pointer)
    }
}

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard().with_fixed_int_encoding()
}

fn encode<T: bincode::Encode>(value: &T, name: &str) -> Result<Vec<u8>> {
    bincode::encode_to_vec(value, bincode_config()).map_err(|e| Error::serialization(name, e))
}

fn decode<T: bincode::Decode<()>>(bytes: &[u8], name: &str) -> Result<T> {
    let (value, consumed) = bincode::decode_from_slice(bytes, bincode_config())
        .map_err(|e| Error::serialization(name, e))?;
    if consumed != bytes.len() {
        return Err(Error::format_inconsistency(
            name,
            format!("{} trailing bytes", bytes.len() - consumed),
        ));
    }
    Ok(value)
}

fn read_file(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let path = dir.join(name);
    std::fs::read(&path).map_err(|e| Error::io(path.display().to_string(), e))
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let path = dir.join(name);
    let context = || path.display().to_string();
    let mut writer = FileWriter::create(&path).map_err(|e| Error::io(context(), e))?;
    writer.write_all(bytes).map_err(|e| Error::io(context(), e))?;
    writer.seal().map_err(|e| Error::io(context(), e))
}

fn copy_storage(dir: &Path, name: &str, storage: &Arc<dyn ReadAt>) -> Result<()> {
    let size = storage.size()?;
    let bytes = storage
        .read_exact_at(0..size)
        .map_err(|e| Error::io(name, e))?;
    write_file(dir, name, &bytes)
}

fn open_storage(dir: &Path, name: &str, mode: StorageMode) -> Result<Arc<dyn ReadAt>> {
    let path = dir.join(name);
    let context = || path.display().to_string();
    Ok(match mode {
        StorageMode::Positional => {
            Arc::new(FileReader::open(&path).map_err(|e| Error::io(context(), e))?)
        }
        StorageMode::Seeking => {
            Arc::new(SeekingFileReader::open(&path).map_err(|e| Error::io(context(), e))?)
        }
        StorageMode::Memory => memory::shared_buffer(read_file(dir, name)?),
    })
}
