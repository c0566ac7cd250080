use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::MatchingArgs;

#[derive(Parser)]
#[command(name = "quarry-cmd")]
#[command(about = "Command-line utility for building, inspecting and querying quarry indexes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from pre-tokenized JSON lines ({"docno": .., "fields": [[..]]})
    Build {
        /// Input file; standard input when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Comma-separated field names, parallel to each document's token lists
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,

        /// Do not record token positions
        #[arg(long)]
        no_blocks: bool,

        /// Do not build the document-to-terms index
        #[arg(long)]
        no_direct: bool,

        /// JSON file with `compression.*` settings
        #[arg(long, conflicts_with = "codec")]
        compression: Option<PathBuf>,

        /// Write chunked postings with this codec (unary, gamma, vbyte, pfor)
        #[arg(long)]
        codec: Option<String>,

        /// Output index directory
        index_path: PathBuf,
    },

    /// Display index properties, term postings or document terms
    Inspect {
        /// Terms whose postings to list (can be specified multiple times)
        #[arg(short, long)]
        term: Vec<String>,

        /// Document numbers whose terms to list (can be specified multiple times)
        #[arg(short, long)]
        doc: Vec<String>,

        /// Increase verbosity (-v lists the vocabulary, -vv adds positions)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Index directory
        index_path: PathBuf,
    },

    /// Run one query and print the ranked documents
    Search {
        #[command(flatten)]
        matching: MatchingArgs,

        /// Identifier reported with the results
        #[arg(long, default_value = "1")]
        query_id: String,

        /// Print the result set as JSON
        #[arg(long)]
        json: bool,

        /// Index directory
        index_path: PathBuf,

        /// Query text
        query: String,
    },

    /// Run a file of queries in parallel and write a TREC run
    Batch {
        #[command(flatten)]
        matching: MatchingArgs,

        /// Query file: one `<query id> <query text>` per line
        #[arg(short, long)]
        queries: PathBuf,

        /// Output run file
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with serving settings (workers, shutdown_timeout_secs)
        #[arg(long)]
        serving: Option<PathBuf>,

        /// Number of concurrent queries
        #[arg(short, long)]
        workers: Option<usize>,

        /// Seconds to wait for in-flight queries after submission
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Run tag written in the last column
        #[arg(long, default_value = "quarry")]
        run_tag: String,

        /// Index directory
        index_path: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            fields,
            no_blocks,
            no_direct,
            compression,
            codec,
            index_path,
        } => commands::build::run(
            input,
            commands::build::BuildOptions {
                fields,
                blocks: !no_blocks,
                direct: !no_direct,
                compression,
                codec,
            },
            index_path,
        ),
        Commands::Inspect {
            term,
            doc,
            verbose,
            index_path,
        } => commands::inspect::run(term, doc, verbose, index_path),
        Commands::Search {
            matching,
            query_id,
            json,
            index_path,
            query,
        } => commands::search::run(matching, query_id, json, index_path, query),
        Commands::Batch {
            matching,
            queries,
            output,
            serving,
            workers,
            timeout_secs,
            run_tag,
            index_path,
        } => commands::batch::run(
            matching,
            commands::batch::BatchOptions {
                queries,
                output,
                serving,
                workers,
                timeout_secs,
                run_tag,
            },
            index_path,
        ),
    }
}
