//! Build command implementation

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    time::Instant,
};

use anyhow::{Context, Result, bail};
use quarry_compression::CodecKind;
use quarry_postings::{CompressionConfig, IndexBuilder, IndexBuilderConfig, IndexDocument};
use tracing::{info, warn};

const PROGRESS_INTERVAL: usize = 100_000;

pub struct BuildOptions {
    pub fields: Vec<String>,
    pub blocks: bool,
    pub direct: bool,
    pub compression: Option<PathBuf>,
    pub codec: Option<String>,
}

impl BuildOptions {
    fn builder_config(&self) -> Result<IndexBuilderConfig> {
        let compression = if let Some(path) = &self.compression {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<CompressionConfig>(&json)
                .with_context(|| format!("Invalid compression settings in {}", path.display()))?
        } else if let Some(codec) = &self.codec {
            CompressionConfig::chunked(codec.parse::<CodecKind>()?)
        } else {
            CompressionConfig::default()
        };
        Ok(IndexBuilderConfig {
            compression,
            blocks: self.blocks,
            field_names: self.fields.clone(),
            direct: self.direct,
        })
    }
}

pub fn run(input: Option<PathBuf>, options: BuildOptions, index_path: PathBuf) -> Result<()> {
    let mut builder = IndexBuilder::new(options.builder_config()?)?;
    let started = Instant::now();

    let count = match &input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            add_documents(&mut builder, BufReader::new(file))?
        }
        None => add_documents(&mut builder, io::stdin().lock())?,
    };
    if count == 0 {
        bail!("No documents to index");
    }

    let index = builder.build()?;
    index
        .write(&index_path)
        .with_context(|| format!("Failed to write index to {}", index_path.display()))?;

    let stats = index.collection_statistics();
    info!(
        "Indexed {} documents, {} tokens, {} terms in {:.2}s",
        stats.number_of_documents,
        stats.number_of_tokens,
        stats.number_of_unique_terms,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

fn add_documents<R: BufRead>(builder: &mut IndexBuilder, reader: R) -> Result<usize> {
    let mut count = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let document: IndexDocument = serde_json::from_str(&line)
            .with_context(|| format!("Invalid document at line {}", line_no + 1))?;
        if document.docno.is_empty() {
            warn!("Document at line {} has no docno", line_no + 1);
        }
        builder
            .add_document(&document)
            .with_context(|| format!("Failed to add document '{}'", document.docno))?;
        count += 1;
        if count % PROGRESS_INTERVAL == 0 {
            info!("Added {count} documents");
        }
    }
    Ok(count)
}
