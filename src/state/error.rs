use thiserror::Error;

use crate::core::config::ConfigError;
use crate::llm::GenerationError;
use crate::rag::RagError;

/// Startup failures. Any of these keeps the service from accepting traffic.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load vector index: {0}")]
    Index(#[source] RagError),

    #[error("Failed to initialize embedding backend: {0}")]
    Embedding(#[source] RagError),

    #[error("Failed to initialize generation backend: {0}")]
    Generation(#[from] GenerationError),
}
