//! Core data models used throughout ragpipe.
//!
//! These types represent the documents, pages, and chunks that flow through
//! the ingestion pipeline, and the scored chunks returned by retrieval.

use serde::{Deserialize, Serialize};

/// A source PDF after per-page text extraction.
#[derive(Debug, Clone)]
pub struct Document {
    /// Name used to attribute chunks back to their source (file name
    /// relative to the input directory).
    pub name: String,
    /// Extracted pages in order. Pages with no extractable text are kept
    /// so page numbering stays aligned with the source file.
    pub pages: Vec<Page>,
}

/// One page of extracted text.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number within the source PDF.
    pub number: usize,
    pub text: String,
}

/// A bounded span of one page's text — the unit stored and retrieved in the
/// vector index. Serialized into the index metadata file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    /// Source document name.
    pub document: String,
    /// 1-based page the chunk was carved from.
    pub page: usize,
    /// Contiguous index within the document, starting at 0.
    pub chunk_index: i64,
    /// Starting character offset within the page text.
    pub start_offset: usize,
    pub text: String,
}

/// A chunk returned from index search, with its similarity score.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    /// Cosine similarity against the query embedding, in [-1, 1].
    pub score: f32,
}
