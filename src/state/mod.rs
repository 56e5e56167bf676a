use std::sync::Arc;

use crate::core::config::{AppConfig, ConfigService};
use crate::llm::{GenerationBackend, GenerationService, OpenAiCompatibleProvider};
use crate::rag::{build_embedder, EmbeddingBackend, VectorIndex};
use crate::travel::ChatService;

pub mod error;

pub use error::InitializationError;

/// Application state shared across all routes.
///
/// Everything here is immutable after startup: the loaded index and the
/// chat pipeline that searches it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub index: Arc<VectorIndex>,
    pub chat: ChatService,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// 1. Loading and validating configuration
    /// 2. Building the embedding backend
    /// 3. Loading the index and checking it was built with that backend
    /// 4. Building the generation backend
    pub async fn initialize(config_service: &ConfigService) -> Result<Arc<Self>, InitializationError> {
        let config = config_service.load()?;
        if let Ok(effective) = serde_json::to_value(&config) {
            tracing::debug!(
                "Effective configuration: {}",
                config_service.redact_sensitive_values(&effective)
            );
        }

        let embedder = build_embedder(&config.embedding).map_err(InitializationError::Embedding)?;
        let index = load_index(&config, embedder.as_ref())?;

        let generator: Arc<dyn GenerationBackend> =
            Arc::new(OpenAiCompatibleProvider::new(&config.generation)?);

        tracing::info!(
            "Loaded index {} ({} chunks, model '{}'); generation via {} model '{}'",
            config.rag.index_path.display(),
            index.len(),
            index.header().embedding_model,
            generator.name(),
            config.generation.model
        );

        Ok(Self::from_parts(config, index, embedder, generator))
    }

    /// Assembles state from already-built parts.
    pub fn from_parts(
        config: AppConfig,
        index: VectorIndex,
        embedder: Arc<dyn EmbeddingBackend>,
        generator: Arc<dyn GenerationBackend>,
    ) -> Arc<Self> {
        let index = Arc::new(index);
        let chat = ChatService::new(
            index.clone(),
            embedder,
            GenerationService::from_settings(generator, &config.generation),
            &config.rag,
            config.chat.enforce_response_shape,
        );

        Arc::new(AppState {
            config: Arc::new(config),
            index,
            chat,
        })
    }
}

/// Loads the configured index and rejects one built with a different model.
pub fn load_index(
    config: &AppConfig,
    embedder: &dyn EmbeddingBackend,
) -> Result<VectorIndex, InitializationError> {
    let index = VectorIndex::load(&config.rag.index_path).map_err(InitializationError::Index)?;
    index
        .ensure_model(embedder.model_id(), embedder.dimensions())
        .map_err(InitializationError::Index)?;
    Ok(index)
}
