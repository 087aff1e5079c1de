//! The persisted vector index.
//!
//! An index is a directory holding exactly two artifacts:
//!
//! | File | Contents |
//! |------|----------|
//! | `index.vec` | count/dims header + little-endian f32 vectors |
//! | `index.meta.json` | chunk records, embedding model, chunking parameters |
//!
//! The pair is opaque: both files must be present and agree on vector count
//! and dimensionality, or loading fails. Ingestion rebuilds and overwrites
//! the pair wholesale; there is no incremental update.
//!
//! Search is an exact brute-force cosine scan — at this corpus scale
//! (thousands of chunks) a linear pass is faster than maintaining an
//! approximate structure.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use crate::models::{Chunk, RetrievedChunk};

/// Vector artifact file name within the index directory.
pub const VECTOR_FILE: &str = "index.vec";
/// Metadata artifact file name within the index directory.
pub const META_FILE: &str = "index.meta.json";

/// Companion metadata persisted alongside the vectors.
///
/// Records the embedding model that produced the vectors so a query-time
/// configuration mismatch is detected instead of silently degrading
/// retrieval quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub embedding_model: String,
    pub dims: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub ingested_at: DateTime<Utc>,
    pub chunks: Vec<Chunk>,
}

/// An in-memory vector index over chunk embeddings.
#[derive(Debug)]
pub struct VectorIndex {
    metadata: IndexMetadata,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index from parallel chunk and vector lists.
    pub fn build(
        embedding_model: &str,
        dims: usize,
        chunk_size: usize,
        chunk_overlap: usize,
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if chunks.len() != vectors.len() {
            bail!(
                "Chunk/vector count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            );
        }
        for (i, v) in vectors.iter().enumerate() {
            if v.len() != dims {
                bail!(
                    "Vector {} has {} dimensions, expected {}",
                    i,
                    v.len(),
                    dims
                );
            }
        }

        Ok(Self {
            metadata: IndexMetadata {
                embedding_model: embedding_model.to_string(),
                dims,
                chunk_size,
                chunk_overlap,
                ingested_at: Utc::now(),
                chunks,
            },
            vectors,
        })
    }

    /// True when both index artifacts exist at `dir`.
    pub fn artifacts_present(dir: &Path) -> bool {
        dir.join(VECTOR_FILE).is_file() && dir.join(META_FILE).is_file()
    }

    /// Persist both artifacts to `dir`, creating the directory if absent.
    /// Pre-existing artifacts are overwritten entirely.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create index directory: {}", dir.display()))?;

        let mut bytes = Vec::with_capacity(8 + self.vectors.len() * self.metadata.dims * 4);
        bytes.extend_from_slice(&(self.vectors.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.metadata.dims as u32).to_le_bytes());
        for vector in &self.vectors {
            bytes.extend_from_slice(&vec_to_blob(vector));
        }

        let vec_path = dir.join(VECTOR_FILE);
        std::fs::write(&vec_path, bytes)
            .with_context(|| format!("Failed to write {}", vec_path.display()))?;

        let meta_path = dir.join(META_FILE);
        let meta_json = serde_json::to_vec_pretty(&self.metadata)?;
        std::fs::write(&meta_path, meta_json)
            .with_context(|| format!("Failed to write {}", meta_path.display()))?;

        Ok(())
    }

    /// Load the artifact pair from `dir`.
    ///
    /// Partial presence, a corrupt vector file, or a count/dims disagreement
    /// between the two artifacts is a hard failure.
    pub fn load(dir: &Path) -> Result<Self> {
        let vec_path = dir.join(VECTOR_FILE);
        let meta_path = dir.join(META_FILE);

        if !vec_path.is_file() || !meta_path.is_file() {
            bail!(
                "Index artifacts missing at {}: expected both {} and {}",
                dir.display(),
                VECTOR_FILE,
                META_FILE
            );
        }

        let meta_json = std::fs::read(&meta_path)
            .with_context(|| format!("Failed to read {}", meta_path.display()))?;
        let metadata: IndexMetadata = serde_json::from_slice(&meta_json)
            .with_context(|| format!("Failed to parse {}", meta_path.display()))?;

        let bytes = std::fs::read(&vec_path)
            .with_context(|| format!("Failed to read {}", vec_path.display()))?;
        if bytes.len() < 8 {
            bail!("Vector file {} is truncated", vec_path.display());
        }

        let count = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let dims = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        if dims == 0 {
            bail!("Vector file {} declares 0 dimensions", vec_path.display());
        }

        let expected = 8 + count * dims * 4;
        if bytes.len() != expected {
            bail!(
                "Vector file {} has {} bytes, expected {} for {} vectors × {} dims",
                vec_path.display(),
                bytes.len(),
                expected,
                count,
                dims
            );
        }

        if count != metadata.chunks.len() {
            bail!(
                "Index pair disagrees: {} vectors but {} chunk records",
                count,
                metadata.chunks.len()
            );
        }
        if dims != metadata.dims {
            bail!(
                "Index pair disagrees: vector file has {} dims, metadata says {}",
                dims,
                metadata.dims
            );
        }

        let vectors = bytes[8..]
            .chunks_exact(dims * 4)
            .map(blob_to_vec)
            .collect();

        Ok(Self { metadata, vectors })
    }

    /// Return the `k` chunks most similar to `query`, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<RetrievedChunk> {
        let mut scored: Vec<RetrievedChunk> = self
            .vectors
            .iter()
            .zip(self.metadata.chunks.iter())
            .map(|(vector, chunk)| RetrievedChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(query, vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        scored
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
