use std::sync::Arc;
use std::time::Duration;

use super::error::GenerationError;
use super::provider::GenerationBackend;
use crate::core::config::GenerationSettings;

/// Bounded access to a generation backend: every attempt is capped by a
/// timeout and transient failures get exactly one retry after a backoff.
#[derive(Clone)]
pub struct GenerationService {
    backend: Arc<dyn GenerationBackend>,
    timeout: Duration,
    retry_backoff: Duration,
}

impl GenerationService {
    pub fn new(backend: Arc<dyn GenerationBackend>, timeout: Duration, retry_backoff: Duration) -> Self {
        Self {
            backend,
            timeout,
            retry_backoff,
        }
    }

    pub fn from_settings(backend: Arc<dyn GenerationBackend>, settings: &GenerationSettings) -> Self {
        Self::new(
            backend,
            Duration::from_secs(settings.timeout_secs),
            Duration::from_millis(settings.retry_backoff_ms),
        )
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        match self.attempt(prompt).await {
            Err(err) if err.is_transient() => {
                tracing::warn!(
                    "Generation via '{}' failed ({}); retrying once in {:?}",
                    self.backend.name(),
                    err,
                    self.retry_backoff
                );
                tokio::time::sleep(self.retry_backoff).await;
                self.attempt(prompt).await
            }
            other => other,
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.timeout, self.backend.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout.as_secs())),
        }
    }
}
