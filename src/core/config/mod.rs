pub mod paths;
pub mod service;
pub mod settings;
pub mod validation;

use thiserror::Error;

pub use paths::AppPaths;
pub use service::ConfigService;
pub use settings::{
    AppConfig, ChatSettings, EmbeddingProviderKind, EmbeddingSettings, GenerationSettings,
    RagSettings, ServerConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
    #[error("{0}")]
    Invalid(String),
}
