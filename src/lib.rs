//! # ragpipe
//!
//! Retrieval-augmented question answering over local PDF collections.
//!
//! ragpipe ingests PDFs into a flat-file vector index and answers
//! questions by retrieving the most similar chunks and forwarding them,
//! wrapped in a prompt, to an OpenAI-compatible chat-completion API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌───────────────┐
//! │  PDFs    │──▶│  Pipeline     │──▶│  Index pair    │
//! │ data/    │   │ Chunk+Embed  │   │ .vec + .json  │
//! └──────────┘   └──────────────┘   └───────┬───────┘
//!                                           │
//!                         ┌─────────────────┤
//!                         ▼                 ▼
//!                    ┌─────────┐      ┌──────────┐
//!                    │   CLI   │      │   HTTP   │
//!                    │(ragpipe)│      │ (axum)   │
//!                    └─────────┘      └────┬─────┘
//!                                          ▼
//!                                   ┌────────────┐
//!                                   │ Generation │
//!                                   │ (Groq API) │
//!                                   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GROQ_API_KEY=...
//! ragpipe ingest                # index PDFs under data/
//! ragpipe query "What is chapter 3 about?"
//! ragpipe serve                 # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`loader`] | PDF discovery and per-page text extraction |
//! | [`chunk`] | Sliding-window text chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | Persisted vector index (save/load/search) |
//! | [`ingest`] | Ingestion pipeline orchestration |
//! | [`generation`] | Chat-completion client |
//! | [`query`] | Query pipeline (retrieval + prompt + generation) |
//! | [`server`] | HTTP façade |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod generation;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod models;
pub mod query;
pub mod server;
