//! Search command implementation

use std::path::PathBuf;

use anyhow::Result;
use quarry_matching::Searcher;

use crate::commands::{MatchingArgs, open_index};

pub fn run(
    matching: MatchingArgs,
    query_id: String,
    json: bool,
    index_path: PathBuf,
    query: String,
) -> Result<()> {
    let index = open_index(&index_path)?;
    let searcher = Searcher::new(index, matching.to_config()?)?;
    let result = searcher.search(&query_id, &query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    for diagnostic in &result.diagnostics {
        tracing::warn!("{diagnostic}");
    }
    let documents = searcher.index().documents();
    for (rank, (doc, score, _)) in result.iter().enumerate() {
        println!(
            "{rank:>5}  {:<24} {score:.6}",
            documents.docno(doc).unwrap_or_default()
        );
    }
    println!(
        "{} of {} matching documents ({})",
        result.len(),
        result.exact_result_size,
        searcher.config().model
    );
    Ok(())
}
