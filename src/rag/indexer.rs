//! Offline corpus indexing: load → split → embed → persist.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use super::document::Document;
use super::embedding::EmbeddingBackend;
use super::error::RagError;
use super::index::{IndexHeader, VectorIndex};
use super::splitter::RecursiveSplitter;

#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub chunk_count: usize,
    pub dimensions: usize,
    pub embedding_model: String,
    pub output_path: PathBuf,
}

pub struct CorpusIndexer {
    splitter: RecursiveSplitter,
    embedder: Arc<dyn EmbeddingBackend>,
}

impl CorpusIndexer {
    pub fn new(splitter: RecursiveSplitter, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self { splitter, embedder }
    }

    /// Builds the index in memory without touching the filesystem beyond the corpus read.
    pub async fn build(&self, corpus_path: &Path) -> Result<VectorIndex, RagError> {
        let document = Document::load(corpus_path)?;
        tracing::info!(
            "Loaded corpus '{}' ({} chars)",
            document.source,
            document.content.chars().count()
        );

        let chunks = self.splitter.split_document(&document);
        if chunks.is_empty() {
            return Err(RagError::EmptyCorpus(corpus_path.to_path_buf()));
        }
        tracing::info!("Split into {} chunks", chunks.len());

        let started = Instant::now();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        tracing::info!(
            "Embedded {} chunks with '{}' in {:?}",
            embeddings.len(),
            self.embedder.model_id(),
            started.elapsed()
        );

        let config = self.splitter.config();
        let header = IndexHeader::new(
            self.embedder.model_id(),
            self.embedder.dimensions(),
            config.chunk_size,
            config.chunk_overlap,
            document.source.clone(),
            &document.content,
        );
        VectorIndex::build(header, chunks, embeddings)
    }

    pub async fn run(&self, corpus_path: &Path, output_path: &Path) -> Result<IndexReport, RagError> {
        let index = self.build(corpus_path).await?;
        index.save(output_path)?;

        let report = IndexReport {
            chunk_count: index.len(),
            dimensions: index.header().dimensions,
            embedding_model: index.header().embedding_model.clone(),
            output_path: output_path.to_path_buf(),
        };
        tracing::info!(
            "Vector index with {} chunks saved to '{}'",
            report.chunk_count,
            report.output_path.display()
        );
        Ok(report)
    }
}
