//! Ingestion pipeline orchestration.
//!
//! Coordinates the full flow: PDF discovery → per-page extraction →
//! chunking → embedding → index persistence. The index directory is
//! overwritten wholesale on every run; the two informational outcomes
//! (no PDFs, no extractable text) short-circuit without touching it.

use anyhow::Result;

use crate::chunk::split_document;
use crate::config::Config;
use crate::embedding;
use crate::index::VectorIndex;
use crate::loader;
use crate::models::Chunk;

/// How an ingestion run ended.
///
/// The first two variants are informational, not errors: nothing was
/// written and any existing index is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No PDF files found under the input directory.
    NoDocuments,
    /// PDFs were found but yielded no chunks (e.g. image-only scans).
    NoChunks,
    /// Index written.
    Complete {
        documents: usize,
        pages: usize,
        chunks: usize,
    },
}

impl IngestOutcome {
    /// The user-facing status line for this outcome.
    pub fn message(&self) -> &'static str {
        match self {
            IngestOutcome::NoDocuments => "No PDFs found.",
            IngestOutcome::NoChunks => "No chunks generated.",
            IngestOutcome::Complete { .. } => "Ingestion complete.",
        }
    }
}

/// Run the full ingestion pipeline against the configured directories.
///
/// Embedding every chunk is the slow step — on first use the local
/// provider downloads model weights, so wall-clock time varies widely.
/// Unrecoverable extraction or embedding errors propagate; there are no
/// retries at this level and partial writes are not cleaned up.
pub async fn run_ingestion(config: &Config) -> Result<IngestOutcome> {
    let input_dir = &config.paths.input_dir;
    let index_dir = &config.paths.index_dir;
    let chunk_size = config.chunking.chunk_size;
    let chunk_overlap = config.chunking.chunk_overlap;

    println!("ingest {}", input_dir.display());

    let documents = loader::load_documents(input_dir)?;
    if documents.is_empty() {
        let outcome = IngestOutcome::NoDocuments;
        println!("{}", outcome.message());
        return Ok(outcome);
    }

    let pages: usize = documents.iter().map(|d| d.pages.len()).sum();
    println!("  documents: {} ({} pages)", documents.len(), pages);

    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|doc| split_document(doc, chunk_size, chunk_overlap))
        .collect();
    if chunks.is_empty() {
        let outcome = IngestOutcome::NoChunks;
        println!("{}", outcome.message());
        return Ok(outcome);
    }
    println!("  chunks: {}", chunks.len());

    let provider = embedding::create_provider(&config.embedding)?;
    println!(
        "  embedding with {} (first run may download model weights)",
        provider.model_name()
    );

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let mut vectors = Vec::with_capacity(chunks.len());
    for batch in texts.chunks(config.embedding.batch_size) {
        vectors.extend(embedding::embed_texts(&config.embedding, batch).await?);
    }

    let outcome = IngestOutcome::Complete {
        documents: documents.len(),
        pages,
        chunks: chunks.len(),
    };

    let index = VectorIndex::build(
        provider.model_name(),
        provider.dims(),
        chunk_size,
        chunk_overlap,
        chunks,
        vectors,
    )?;
    index.save(index_dir)?;

    println!("  index: {}", index_dir.display());
    println!("ok");

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn outcome_messages_are_fixed() {
        assert_eq!(IngestOutcome::NoDocuments.message(), "No PDFs found.");
        assert_eq!(IngestOutcome::NoChunks.message(), "No chunks generated.");
    }

    #[tokio::test]
    async fn empty_input_directory_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.input_dir = tmp.path().join("data");
        config.paths.index_dir = tmp.path().join("index");
        std::fs::create_dir_all(&config.paths.input_dir).unwrap();

        let outcome = run_ingestion(&config).await.unwrap();
        assert_eq!(outcome, IngestOutcome::NoDocuments);
        assert!(!config.paths.index_dir.exists());
    }

    #[tokio::test]
    async fn missing_input_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.input_dir = tmp.path().join("nowhere");
        config.paths.index_dir = tmp.path().join("index");

        assert!(run_ingestion(&config).await.is_err());
    }
}
