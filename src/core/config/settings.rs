//! Typed view over the merged `config.yml` + `secrets.yaml` document.
//!
//! Every section defaults independently, so a missing file or a partial file
//! yields a runnable configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rag: RagSettings,
    pub embedding: EmbeddingSettings,
    pub generation: GenerationSettings,
    pub chat: ChatSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    pub corpus_path: PathBuf,
    pub index_path: PathBuf,
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// Break-point preference, strongest boundary first
    pub separators: Vec<String>,
    pub top_k: usize,
    /// Character budget of the `<context>` block sent to the model
    pub max_context_chars: usize,
    /// Prefix each retrieved chunk with its rank, source and score
    pub include_citations: bool,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("total_data.txt"),
            index_path: PathBuf::from("vectors.json"),
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: default_separators(),
            top_k: 4,
            max_context_chars: 8000,
            include_citations: false,
        }
    }
}

pub fn default_separators() -> Vec<String> {
    ["\n\n", "\n", ". ", "! ", "? ", " "]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderKind {
    Hashing,
    OpenaiCompatible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProviderKind,
    /// Model identity recorded in the index; must match between indexing and serving
    pub model: String,
    pub dimensions: usize,
    pub base_url: String,
    pub api_key: Option<String>,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Hashing,
            model: "hashing-sha256".to_string(),
            dimensions: 384,
            base_url: "http://localhost:1234".to_string(),
            api_key: None,
            batch_size: 32,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub retry_backoff_ms: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
            api_key: None,
            temperature: None,
            max_tokens: None,
            timeout_secs: 30,
            retry_backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Strip answer sections that the request type does not allow
    pub enforce_response_shape: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            enforce_response_shape: true,
        }
    }
}
