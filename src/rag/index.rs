//! Persisted vector index.
//!
//! A self-describing JSON artifact: a header naming the format, the search
//! capability, the distance metric and the embedding model identity, followed
//! by `(chunk, vector)` entries. Written atomically, loaded read-only.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::RagError;
use super::splitter::TextChunk;
use crate::vector_math::rank_descending_by_cosine;

pub const INDEX_FORMAT: &str = "travel-rag-index";
pub const INDEX_FORMAT_VERSION: u32 = 1;
pub const NEAREST_NEIGHBOR_CAPABILITY: &str = "nearest_neighbor_search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Cosine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHeader {
    pub format: String,
    pub format_version: u32,
    pub capability: String,
    pub metric: DistanceMetric,
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub source: String,
    pub corpus_sha256: String,
    pub created_at: DateTime<Utc>,
}

impl IndexHeader {
    pub fn new(
        embedding_model: impl Into<String>,
        dimensions: usize,
        chunk_size: usize,
        chunk_overlap: usize,
        source: impl Into<String>,
        corpus: &str,
    ) -> Self {
        Self {
            format: INDEX_FORMAT.to_string(),
            format_version: INDEX_FORMAT_VERSION,
            capability: NEAREST_NEIGHBOR_CAPABILITY.to_string(),
            metric: DistanceMetric::Cosine,
            embedding_model: embedding_model.into(),
            dimensions,
            chunk_size,
            chunk_overlap,
            source: source.into(),
            corpus_sha256: hex::encode(Sha256::digest(corpus.as_bytes())),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: TextChunk,
    pub embedding: Vec<f32>,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: TextChunk,
    /// Similarity score (higher = better).
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    header: IndexHeader,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn build(
        header: IndexHeader,
        chunks: Vec<TextChunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, RagError> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::InvalidIndex(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();
        let index = Self { header, entries };
        index.validate()?;
        Ok(index)
    }

    pub fn header(&self) -> &IndexHeader {
        &self.header
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-`top_k` chunks by cosine similarity to `query`.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, RagError> {
        if query.len() != self.header.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.header.dimensions,
                actual: query.len(),
            });
        }

        let ranked = rank_descending_by_cosine(
            query,
            self.entries.iter().map(|entry| entry.embedding.as_slice()),
        );

        Ok(ranked
            .into_iter()
            .take(top_k)
            .map(|(idx, score)| SearchHit {
                chunk: self.entries[idx].chunk.clone(),
                score,
            })
            .collect())
    }

    /// Structural checks run on every load; a failing index is never served.
    pub fn validate(&self) -> Result<(), RagError> {
        let header = &self.header;
        if header.format != INDEX_FORMAT {
            return Err(RagError::InvalidIndex(format!(
                "unknown format '{}'",
                header.format
            )));
        }
        if header.format_version != INDEX_FORMAT_VERSION {
            return Err(RagError::InvalidIndex(format!(
                "unsupported format version {}",
                header.format_version
            )));
        }
        if header.capability != NEAREST_NEIGHBOR_CAPABILITY {
            return Err(RagError::InvalidIndex(format!(
                "artifact does not support nearest-neighbor search (capability '{}')",
                header.capability
            )));
        }
        if header.dimensions == 0 {
            return Err(RagError::InvalidIndex("zero embedding dimensions".to_string()));
        }
        if self.entries.is_empty() {
            return Err(RagError::InvalidIndex("index has no entries".to_string()));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.embedding.len() != header.dimensions {
                return Err(RagError::InvalidIndex(format!(
                    "entry {} has {} dimensions, header says {}",
                    i,
                    entry.embedding.len(),
                    header.dimensions
                )));
            }
        }
        Ok(())
    }

    /// Fails when the index was built with a different embedding model.
    pub fn ensure_model(&self, model_id: &str, dimensions: usize) -> Result<(), RagError> {
        if self.header.embedding_model != model_id || self.header.dimensions != dimensions {
            return Err(RagError::ModelMismatch {
                indexed: format!(
                    "{} ({} dims)",
                    self.header.embedding_model, self.header.dimensions
                ),
                configured: format!("{} ({} dims)", model_id, dimensions),
            });
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, RagError> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RagError::FileNotFound(path.to_path_buf()),
            _ => RagError::io(path, e),
        })?;

        let index: VectorIndex = serde_json::from_slice(&bytes)
            .map_err(|e| RagError::InvalidIndex(format!("{}: {}", path.display(), e)))?;
        index.validate()?;
        Ok(index)
    }

    /// Writes to `<path>.tmp` and renames over `path`. On failure the temp file
    /// is removed and an existing index at `path` is left as it was.
    pub fn save(&self, path: &Path) -> Result<(), RagError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RagError::io(parent, e))?;
        }

        let payload =
            serde_json::to_vec(self).map_err(|e| RagError::Serialization(e.to_string()))?;

        let tmp_path = temp_path_for(path);
        let result = write_synced(&tmp_path, &payload)
            .and_then(|_| fs::rename(&tmp_path, path).map_err(|e| RagError::io(path, e)));

        if result.is_err() && tmp_path.is_file() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_synced(path: &Path, payload: &[u8]) -> Result<(), RagError> {
    let mut file = File::create(path).map_err(|e| RagError::io(path, e))?;
    file.write_all(payload).map_err(|e| RagError::io(path, e))?;
    file.sync_all().map_err(|e| RagError::io(path, e))
}
