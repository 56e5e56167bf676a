//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `RecursiveSplitter`: overlapping, boundary-aware chunking
//! - `EmbeddingBackend`: text → vector, with local and HTTP implementations
//! - `VectorIndex`: the persisted, read-only nearest-neighbor index
//! - `CorpusIndexer`: the offline load → split → embed → persist pipeline
//! - `RAGContextBuilder`: formats retrieved chunks for the prompt

pub mod context_builder;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod indexer;
pub mod splitter;

pub use context_builder::{ContextBuilderConfig, RAGContextBuilder};
pub use document::Document;
pub use embedding::{build_embedder, EmbeddingBackend, HashingEmbedder, OpenAiCompatibleEmbedder};
pub use error::RagError;
pub use index::{IndexHeader, SearchHit, VectorIndex};
pub use indexer::{CorpusIndexer, IndexReport};
pub use splitter::{RecursiveSplitter, SplitterConfig, TextChunk};
