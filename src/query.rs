//! The query pipeline: retrieval + prompt assembly + generation.
//!
//! Construction loads the persisted index and providers and fails fast on
//! the two distinguishable preconditions — missing index artifacts and a
//! missing generation credential. Execution is total: every internal
//! failure is rendered as answer text at this boundary, so callers (HTTP
//! handlers, CLI) never see a query-time error propagate.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::config::{Config, EmbeddingConfig};
use crate::embedding;
use crate::generation::GenerationClient;
use crate::index::VectorIndex;

/// Fixed response for a blank or whitespace-only question.
pub const EMPTY_QUESTION_MESSAGE: &str = "Question cannot be empty.";
/// Fixed response when the provider answer fields are all absent.
pub const NO_RESPONSE_MESSAGE: &str = "No response generated.";

/// Prompt sent to the generation provider. `{context}` receives the
/// retrieved chunk texts, `{input}` the user question.
const PROMPT_TEMPLATE: &str = "\
You are a helpful assistant. Use the following context to answer the question accurately.
If the answer is not in the context, say \"I don't have enough information to answer that.\"

Context:
{context}

Question: {input}
";

/// Render the prompt template. No placeholder markers survive rendering.
pub fn render_prompt(context: &str, question: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{input}", question)
}

/// Why query pipeline construction failed.
///
/// The first two variants are precondition checks, reported distinctly so
/// startup and reload paths can explain exactly what is missing.
#[derive(Debug)]
pub enum BuildError {
    /// One or both index artifacts are absent at the configured directory.
    MissingIndex(PathBuf),
    /// The environment variable expected to hold the generation credential
    /// is unset or empty.
    MissingCredential(String),
    /// A component failed to load (index parse, provider setup, mismatch).
    Load(anyhow::Error),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::MissingIndex(dir) => write!(
                f,
                "Index artifacts missing at {} — run ingestion first",
                dir.display()
            ),
            BuildError::MissingCredential(var) => {
                write!(f, "{} not found. Set it in your environment variables.", var)
            }
            BuildError::Load(e) => write!(f, "{:#}", e),
        }
    }
}

impl std::error::Error for BuildError {}

/// A ready-to-query retrieval + generation pipeline.
pub struct QueryPipeline {
    embedding: EmbeddingConfig,
    index: VectorIndex,
    generation: GenerationClient,
    top_k: usize,
}

impl QueryPipeline {
    /// Construct the pipeline from configuration.
    ///
    /// Checks run in order: index artifacts present, credential present,
    /// embedding provider loads, index loads and matches the configured
    /// embedding model. Nothing here touches the network.
    pub fn build(config: &Config) -> Result<Self, BuildError> {
        let index_dir = &config.paths.index_dir;
        if !VectorIndex::artifacts_present(index_dir) {
            return Err(BuildError::MissingIndex(index_dir.clone()));
        }

        let api_key = std::env::var(&config.generation.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BuildError::MissingCredential(config.generation.api_key_env.clone()))?;

        let provider = embedding::create_provider(&config.embedding).map_err(BuildError::Load)?;
        let index = VectorIndex::load(index_dir).map_err(BuildError::Load)?;

        // An index embedded with one model cannot be searched with another;
        // refuse instead of silently returning degraded results.
        if index.metadata().embedding_model != provider.model_name()
            || index.metadata().dims != provider.dims()
        {
            return Err(BuildError::Load(anyhow!(
                "Index at {} was built with embedding model '{}' ({} dims) but '{}' ({} dims) is configured — re-run ingestion",
                index_dir.display(),
                index.metadata().embedding_model,
                index.metadata().dims,
                provider.model_name(),
                provider.dims(),
            )));
        }

        let generation =
            GenerationClient::new(&config.generation, api_key).map_err(BuildError::Load)?;

        Ok(Self {
            embedding: config.embedding.clone(),
            index,
            generation,
            top_k: config.retrieval.top_k,
        })
    }

    /// Answer one question. Never fails: provider errors come back as
    /// `Error:`-prefixed text, a blank question as the fixed message.
    pub async fn run_query(&self, question: &str) -> String {
        if question.trim().is_empty() {
            return EMPTY_QUESTION_MESSAGE.to_string();
        }

        match self.answer(question).await {
            Ok(Some(text)) => text,
            Ok(None) => NO_RESPONSE_MESSAGE.to_string(),
            Err(e) => format!("Error: {:#}", e),
        }
    }

    /// Retrieval + prompt + one generation call. Internal layers keep the
    /// `Result`; only [`run_query`](Self::run_query) renders it to text.
    async fn answer(&self, question: &str) -> Result<Option<String>> {
        let query_vec = embedding::embed_query(&self.embedding, question).await?;
        let hits = self.index.search(&query_vec, self.top_k);

        let context = hits
            .iter()
            .map(|hit| hit.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = render_prompt(&context, question);
        self.generation.complete(&prompt).await
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub fn generation_model(&self) -> &str {
        self.generation.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;
    use tempfile::TempDir;

    #[test]
    fn rendered_prompt_has_no_placeholder_markers() {
        let prompt = render_prompt("Ships sail on water.", "What do ships sail on?");
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{input}"));
        assert!(prompt.contains("Ships sail on water."));
        assert!(prompt.contains("Question: What do ships sail on?"));
    }

    fn write_index(dir: &std::path::Path, model: &str, dims: usize) {
        let chunk = Chunk {
            id: "c0".to_string(),
            document: "doc.pdf".to_string(),
            page: 1,
            chunk_index: 0,
            start_offset: 0,
            text: "sample text".to_string(),
        };
        VectorIndex::build(model, dims, 800, 150, vec![chunk], vec![vec![0.0; dims]])
            .unwrap()
            .save(dir)
            .unwrap();
    }

    #[test]
    fn missing_artifacts_reported_before_anything_else() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.index_dir = tmp.path().join("no-index-here");

        match QueryPipeline::build(&config) {
            Err(BuildError::MissingIndex(dir)) => {
                assert_eq!(dir, tmp.path().join("no-index-here"));
            }
            other => panic!("expected MissingIndex, got {:?}", other.err()),
        }
    }

    #[test]
    fn missing_credential_fails_construction() {
        let tmp = TempDir::new().unwrap();
        write_index(tmp.path(), "all-minilm-l6-v2", 384);

        let mut config = Config::default();
        config.paths.index_dir = tmp.path().to_path_buf();
        config.generation.api_key_env = "RAGPIPE_TEST_UNSET_CREDENTIAL".to_string();

        match QueryPipeline::build(&config) {
            Err(BuildError::MissingCredential(var)) => {
                assert_eq!(var, "RAGPIPE_TEST_UNSET_CREDENTIAL");
            }
            other => panic!("expected MissingCredential, got {:?}", other.err()),
        }
    }

    #[cfg(feature = "local-embeddings")]
    #[test]
    fn embedding_model_mismatch_refused() {
        let tmp = TempDir::new().unwrap();
        write_index(tmp.path(), "bge-base-en-v1.5", 768);

        let mut config = Config::default();
        config.paths.index_dir = tmp.path().to_path_buf();
        config.generation.api_key_env = "RAGPIPE_TEST_CREDENTIAL".to_string();
        std::env::set_var("RAGPIPE_TEST_CREDENTIAL", "test-key");

        match QueryPipeline::build(&config) {
            Err(BuildError::Load(e)) => {
                assert!(e.to_string().contains("re-run ingestion"));
            }
            other => panic!("expected Load error, got {:?}", other.err()),
        }
    }

    #[cfg(feature = "local-embeddings")]
    #[tokio::test]
    async fn blank_question_short_circuits() {
        let tmp = TempDir::new().unwrap();
        write_index(tmp.path(), "all-minilm-l6-v2", 384);

        let mut config = Config::default();
        config.paths.index_dir = tmp.path().to_path_buf();
        config.generation.api_key_env = "RAGPIPE_TEST_CREDENTIAL".to_string();
        std::env::set_var("RAGPIPE_TEST_CREDENTIAL", "test-key");

        let pipeline = QueryPipeline::build(&config).unwrap();
        assert_eq!(pipeline.run_query("").await, EMPTY_QUESTION_MESSAGE);
        assert_eq!(pipeline.run_query("   \n\t").await, EMPTY_QUESTION_MESSAGE);
    }
}
