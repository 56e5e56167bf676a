use async_trait::async_trait;

use super::error::GenerationError;

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// return the provider name (e.g. "groq", "openai_compatible")
    fn name(&self) -> &str;

    /// single-turn completion of a fully assembled prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
