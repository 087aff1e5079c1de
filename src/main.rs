//! # ragpipe CLI
//!
//! The `ragpipe` binary drives the full pipeline: PDF ingestion, one-shot
//! question answering, and the HTTP service.
//!
//! ## Usage
//!
//! ```bash
//! ragpipe --config ./config/ragpipe.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragpipe ingest` | Index every PDF under the input directory |
//! | `ragpipe query "<question>"` | Answer one question against the index |
//! | `ragpipe serve` | Start the HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! # Index the PDFs in data/
//! ragpipe ingest --config ./config/ragpipe.toml
//!
//! # Re-index a different folder into a scratch index
//! ragpipe ingest --input-dir ~/papers --index-dir /tmp/papers-index
//!
//! # Ask a question from the shell
//! ragpipe query "What does the report conclude?"
//!
//! # Serve the API for the web frontend
//! ragpipe serve --config ./config/ragpipe.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ragpipe::config;
use ragpipe::ingest;
use ragpipe::query::QueryPipeline;
use ragpipe::server;

/// ragpipe — retrieval-augmented question answering over local PDFs.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ragpipe.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ragpipe",
    about = "Retrieval-augmented question answering over local PDF collections",
    version,
    long_about = "ragpipe ingests PDF documents into a local vector index and answers \
    questions by retrieving the most relevant chunks and forwarding them to an \
    OpenAI-compatible chat-completion API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/ragpipe.toml`. Paths, chunking, embedding,
    /// retrieval, generation, and server settings are read from this file;
    /// every setting has a default, so an empty file works.
    #[arg(long, global = true, default_value = "./config/ragpipe.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest PDFs into the vector index.
    ///
    /// Discovers every PDF under the input directory, extracts per-page
    /// text, chunks and embeds it, and overwrites the persisted index
    /// pair. Reports "No PDFs found." / "No chunks generated." without
    /// writing anything when there is no usable input.
    Ingest {
        /// Override the configured input directory.
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Override the configured index directory.
        #[arg(long)]
        index_dir: Option<PathBuf>,
    },

    /// Answer a single question against the persisted index.
    ///
    /// Builds the query pipeline (requires the index artifacts and the
    /// generation API credential) and prints the answer to stdout.
    Query {
        /// The question to answer.
        question: String,
    },

    /// Start the HTTP API.
    ///
    /// Binds to `[server].bind` and serves `/`, `/api/query`, and
    /// `/api/upload`. Startup fails if the query pipeline cannot be
    /// constructed.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest {
            input_dir,
            index_dir,
        } => {
            if let Some(dir) = input_dir {
                cfg.paths.input_dir = dir;
            }
            if let Some(dir) = index_dir {
                cfg.paths.index_dir = dir;
            }
            ingest::run_ingestion(&cfg).await?;
        }
        Commands::Query { question } => {
            let pipeline = QueryPipeline::build(&cfg)?;
            let answer = pipeline.run_query(&question).await;
            println!("{}", answer);
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
