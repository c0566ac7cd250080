//! Batch command implementation

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result, bail};
use quarry_matching::Searcher;
use quarry_serving::{BatchRunner, ServingConfig, TrecSink};
use tracing::{info, warn};

use crate::commands::{MatchingArgs, open_index};

pub struct BatchOptions {
    pub queries: PathBuf,
    pub output: PathBuf,
    pub serving: Option<PathBuf>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub run_tag: String,
}

impl BatchOptions {
    fn serving_config(&self) -> Result<ServingConfig> {
        let mut config = match &self.serving {
            Some(path) => ServingConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => ServingConfig::default(),
        };
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_shutdown_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run(matching: MatchingArgs, options: BatchOptions, index_path: PathBuf) -> Result<()> {
    let queries = read_queries(&options.queries)?;
    let index = open_index(&index_path)?;
    let searcher = Arc::new(Searcher::new(index, matching.to_config()?)?);
    let sink = Arc::new(
        TrecSink::create(&options.output, options.run_tag.clone())
            .with_context(|| format!("Failed to create {}", options.output.display()))?,
    );

    let runner = BatchRunner::new(searcher, sink, &options.serving_config()?)?;
    let report = runner.run(queries)?;

    info!(
        "{} of {} queries written to {} ({} documents)",
        report.completed,
        report.submitted,
        options.output.display(),
        report.documents_returned
    );
    for failure in &report.failures {
        warn!("Query {} failed: {}", failure.query_id, failure.message);
    }
    if !report.is_success() {
        bail!(
            "{} queries failed and {} timed out",
            report.failures.len(),
            report.timed_out.len()
        );
    }
    Ok(())
}

/// Reads `<query id> <query text>` lines, skipping blank ones.
fn read_queries(path: &Path) -> Result<Vec<(String, String)>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut queries = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (id, text) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));
        if id.is_empty() {
            bail!("Missing query id at line {}", line_no + 1);
        }
        queries.push((id.to_string(), text.trim().to_string()));
    }
    Ok(queries)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_read_queries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "401 foreign minorities germany").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "402\t+behavioral -genetics").unwrap();
        writeln!(file, "403").unwrap();
        let queries = read_queries(file.path()).unwrap();
        assert_eq!(
            queries,
            [
                ("401".to_string(), "foreign minorities germany".to_string()),
                ("402".to_string(), "+behavioral -genetics".to_string()),
                ("403".to_string(), String::new()),
            ]
        );
    }
}
