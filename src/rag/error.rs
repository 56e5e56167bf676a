//! Error types for corpus loading, embedding and the vector index.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("corpus file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("corpus file is empty: {}", .0.display())]
    EmptyCorpus(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize index: {0}")]
    Serialization(String),

    /// The artifact is missing, truncated, or lacks the search capability.
    #[error("invalid vector index: {0}")]
    InvalidIndex(String),

    #[error("embedding model mismatch: index was built with '{indexed}', service is configured with '{configured}'")]
    ModelMismatch { indexed: String, configured: String },

    #[error("embedding error ({provider}): {message}")]
    Embedding { provider: String, message: String },

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl RagError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RagError::Io {
            path: path.into(),
            source,
        }
    }
}
