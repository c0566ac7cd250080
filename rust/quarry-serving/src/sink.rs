//! Destinations for finished result sets.

use std::{
    fmt::Write as _,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Mutex, PoisonError},
};

use quarry_common::{Result, error::Error};
use quarry_matching::ResultSet;
use quarry_postings::DocumentIndex;

/// Receives result sets from concurrently running queries.
pub trait ResultSink: Send + Sync {
    /// Writes one query's results. Documents are named through `documents`.
    fn write(&self, documents: &DocumentIndex, result: &ResultSet) -> Result<()>;

    fn flush(&self) -> Result<()>;
}

/// Writes TREC run files: `qid Q0 docno rank score tag`, ranks starting at 0.
///
/// All lines of one query are written under a single lock, so concurrent queries
/// never interleave.
pub struct TrecSink<W: Write + Send> {
    writer: Mutex<BufWriter<W>>,
    run_tag: String,
}

impl TrecSink<File> {
    pub fn create(path: impl AsRef<Path>, run_tag: impl Into<String>) -> Result<TrecSink<File>> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        Ok(TrecSink::new(file, run_tag))
    }
}

impl<W: Write + Send> TrecSink<W> {
    pub fn new(writer: W, run_tag: impl Into<String>) -> TrecSink<W> {
        TrecSink {
            writer: Mutex::new(BufWriter::new(writer)),
            run_tag: run_tag.into(),
        }
    }

    pub fn run_tag(&self) -> &str {
        &self.run_tag
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_inner()
            .map_err(|e| Error::io("trec run", e.into_error()))
    }

    fn format(&self, documents: &DocumentIndex, result: &ResultSet) -> Result<String> {
        let mut lines = String::with_capacity(result.len() * 48);
        for (rank, (doc, score, _)) in result.iter().enumerate() {
            let docno = documents
                .docno(doc)
                .ok_or_else(|| Error::not_found(format!("docno of document {doc}")))?;
            // Writing into a String cannot fail.
            let _ = writeln!(
                lines,
                "{} Q0 {docno} {rank} {score} {}",
                result.query_id, self.run_tag
            );
        }
        Ok(lines)
    }
}

impl<W: Write + Send> ResultSink for TrecSink<W> {
    fn write(&self, documents: &DocumentIndex, result: &ResultSet) -> Result<()> {
        let lines = self.format(documents, result)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .write_all(lines.as_bytes())
            .map_err(|e| Error::io("trec run", e))
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
            .map_err(|e| Error::io("trec run", e))
    }
}

#[cfg(test)]
mod tests {
    use quarry_matching::{MatchingConfig, Searcher};
    use quarry_postings::{IndexBuilder, IndexBuilderConfig, IndexDocument};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_trec_lines() {
        let mut builder = IndexBuilder::new(IndexBuilderConfig::default()).unwrap();
        builder
            .add_document(&IndexDocument::new("LA-001", &["rain", "rain", "snow"]))
            .unwrap();
        builder
            .add_document(&IndexDocument::new("LA-002", &["rain", "sun", "wind", "fog"]))
            .unwrap();
        for (docno, token) in [("LA-003", "sun"), ("LA-004", "fog"), ("LA-005", "snow")] {
            builder
                .add_document(&IndexDocument::new(docno, &[token]))
                .unwrap();
        }
        let searcher = Searcher::new(Arc::new(builder.build().unwrap()), MatchingConfig::default())
            .unwrap();
        let result = searcher.search("401", "rain").unwrap();

        let sink = TrecSink::new(Vec::new(), "quarry");
        assert_eq!(sink.run_tag(), "quarry");
        sink.write(searcher.index().documents(), &result).unwrap();
        sink.write(searcher.index().documents(), &ResultSet::empty("402"))
            .unwrap();
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("401 Q0 LA-001 0 "), "{}", lines[0]);
        assert!(lines[1].starts_with("401 Q0 LA-002 1 "), "{}", lines[1]);
        assert!(lines.iter().all(|l| l.ends_with(" quarry")));
    }
}
