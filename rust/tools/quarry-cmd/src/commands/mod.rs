//! Command implementations for quarry-cmd

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use clap::Args;
use quarry_matching::{MatchingConfig, Strategy};
use quarry_postings::Index;

pub mod batch;
pub mod build;
pub mod inspect;
pub mod search;

/// Matching options shared by `search` and `batch`.
#[derive(Args, Debug, Clone)]
pub struct MatchingArgs {
    /// JSON file with matching settings; flags below override it
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Weighting model, e.g. BM25, PL2, DPH, DirichletLM, InL2(title)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Posting traversal strategy
    #[arg(long, value_parser = ["daat", "taat"])]
    pub strategy: Option<String>,

    /// Maximum number of documents per query (0 keeps every match)
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// Retrieve every document for queries without usable terms
    #[arg(long)]
    pub match_empty: bool,
}

impl MatchingArgs {
    pub fn to_config(&self) -> Result<MatchingConfig> {
        let mut config = match &self.config {
            Some(path) => MatchingConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => MatchingConfig::default(),
        };
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        match self.strategy.as_deref() {
            Some("taat") => config = config.with_strategy(Strategy::Taat),
            Some(_) => config = config.with_strategy(Strategy::Daat),
            None => {}
        }
        if let Some(size) = self.size {
            config = config.with_result_set_size(size);
        }
        if self.match_empty {
            config = config.with_match_empty_query(true);
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn open_index(path: &Path) -> Result<Arc<Index>> {
    let index =
        Index::open(path).with_context(|| format!("Failed to open index {}", path.display()))?;
    Ok(Arc::new(index))
}
