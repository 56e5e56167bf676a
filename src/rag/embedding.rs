//! Embedding backends.
//!
//! The index records `model_id()` and `dimensions()`; the service refuses to
//! serve an index built with a different model.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use super::error::RagError;
use crate::core::config::{EmbeddingProviderKind, EmbeddingSettings};

#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Identity recorded in the index; vectors from different ids are not comparable.
    fn model_id(&self) -> &str;

    fn dimensions(&self) -> usize;

    /// Must be pure: the same text always maps to the same vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;

    /// Default implementation embeds sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

pub fn build_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn EmbeddingBackend>, RagError> {
    match settings.provider {
        EmbeddingProviderKind::Hashing => Ok(Arc::new(HashingEmbedder::new(
            settings.model.clone(),
            settings.dimensions,
        ))),
        EmbeddingProviderKind::OpenaiCompatible => {
            Ok(Arc::new(OpenAiCompatibleEmbedder::new(settings)?))
        }
    }
}

/// Local feature-hashing embedder.
///
/// Lowercased alphanumeric tokens and adjacent-token bigrams are hashed with
/// SHA-256 into `dimensions` signed buckets, then L2-normalized. Needs no
/// network or model files, and texts sharing vocabulary land close together.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    model_id: String,
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(model_id: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model_id: model_id.into(),
            dimensions: dimensions.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        for token in &tokens {
            self.accumulate(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.accumulate(&mut vector, &format!("{} {}", pair[0], pair[1]), 0.5);
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }

    fn accumulate(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bucket_bytes = [0u8; 8];
        bucket_bytes.copy_from_slice(&digest[..8]);
        let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

#[async_trait]
impl EmbeddingBackend for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.embed_text(text))
    }
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint (LM Studio,
/// llama.cpp server, text-embeddings-inference, hosted APIs).
#[derive(Clone)]
pub struct OpenAiCompatibleEmbedder {
    base_url: String,
    model: String,
    dimensions: usize,
    api_key: Option<String>,
    batch_size: usize,
    client: Client,
}

impl OpenAiCompatibleEmbedder {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| RagError::Embedding {
                provider: "openai_compatible".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            api_key: settings.api_key.clone(),
            batch_size: settings.batch_size.max(1),
            client,
        })
    }

    fn endpoint(&self) -> String {
        if self.base_url.ends_with("/v1") {
            format!("{}/embeddings", self.base_url)
        } else {
            format!("{}/v1/embeddings", self.base_url)
        }
    }

    fn error(&self, message: impl Into<String>) -> RagError {
        RagError::Embedding {
            provider: "openai_compatible".to_string(),
            message: message.into(),
        }
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let body = json!({
            "model": self.model,
            "input": inputs,
        });

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let res = request.send().await.map_err(|e| self.error(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(self.error(format!("HTTP {}: {}", status, text)));
        }

        let payload: Value = res.json().await.map_err(|e| self.error(e.to_string()))?;
        let data = payload["data"]
            .as_array()
            .ok_or_else(|| self.error("response has no 'data' array"))?;

        self.collect_embeddings(data, inputs.len())
    }

    /// Vectors in input order. Items carry an `index` and servers may return
    /// them in any order.
    fn collect_embeddings(&self, data: &[Value], expected: usize) -> Result<Vec<Vec<f32>>, RagError> {
        let mut indexed = Vec::with_capacity(data.len());
        for (position, item) in data.iter().enumerate() {
            let index = match item.get("index") {
                None => position,
                Some(value) => value
                    .as_u64()
                    .map(|i| i as usize)
                    .ok_or_else(|| self.error("response item has a non-integer 'index'"))?,
            };
            let values = item["embedding"]
                .as_array()
                .ok_or_else(|| self.error("response item has no 'embedding' array"))?;
            let vector: Vec<f32> = values
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();
            if vector.len() != self.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: vector.len(),
                });
            }
            indexed.push((index, vector));
        }
        indexed.sort_by_key(|(index, _)| *index);

        let in_sequence = indexed.iter().enumerate().all(|(i, (index, _))| *index == i);
        if indexed.len() != expected || !in_sequence {
            return Err(self.error(format!(
                "expected embeddings for indices 0..{}, got {:?}",
                expected,
                indexed.iter().map(|(index, _)| *index).collect::<Vec<_>>()
            )));
        }
        Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiCompatibleEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| self.error("empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut results = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            results.extend(self.request(batch).await?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_math::cosine_similarity;

    #[tokio::test]
    async fn hashing_embedder_is_deterministic() {
        let embedder = HashingEmbedder::new("hashing-sha256", 64);
        let first = embedder.embed("Beaches of Goa in winter").await.unwrap();
        let second = embedder.embed("Beaches of Goa in winter").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn hashing_embedder_normalizes_and_ignores_case() {
        let embedder = HashingEmbedder::new("hashing-sha256", 128);
        let upper = embedder.embed_text("JAIPUR FORTS");
        let lower = embedder.embed_text("jaipur forts");
        assert_eq!(upper, lower);
        let norm = upper.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let embedder = HashingEmbedder::new("hashing-sha256", 384);
        let query = embedder.embed_text("beaches in goa");
        let related = embedder.embed_text("Goa is famous for its beaches and seafood");
        let unrelated = embedder.embed_text("Manali hill station snow trekking");
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new("hashing-sha256", 16);
        assert!(embedder.embed_text("").iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn default_batch_matches_single_calls() {
        let embedder = HashingEmbedder::new("hashing-sha256", 32);
        let texts = vec!["Agra".to_string(), "Taj Mahal".to_string()];
        let batch = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[1], embedder.embed("Taj Mahal").await.unwrap());
    }

    #[test]
    fn build_embedder_uses_configured_identity() {
        let settings = EmbeddingSettings {
            model: "hashing-custom".to_string(),
            dimensions: 12,
            ..Default::default()
        };
        let embedder = build_embedder(&settings).unwrap();
        assert_eq!(embedder.model_id(), "hashing-custom");
        assert_eq!(embedder.dimensions(), 12);
    }

    #[test]
    fn openai_endpoint_handles_v1_suffix() {
        let mut settings = EmbeddingSettings {
            provider: EmbeddingProviderKind::OpenaiCompatible,
            base_url: "http://localhost:1234/".to_string(),
            ..Default::default()
        };
        let embedder = OpenAiCompatibleEmbedder::new(&settings).unwrap();
        assert_eq!(embedder.endpoint(), "http://localhost:1234/v1/embeddings");

        settings.base_url = "https://api.example.com/v1".to_string();
        let embedder = OpenAiCompatibleEmbedder::new(&settings).unwrap();
        assert_eq!(embedder.endpoint(), "https://api.example.com/v1/embeddings");
    }

    fn http_embedder(dimensions: usize) -> OpenAiCompatibleEmbedder {
        OpenAiCompatibleEmbedder::new(&EmbeddingSettings {
            provider: EmbeddingProviderKind::OpenaiCompatible,
            model: "all-MiniLM-L6-v2".to_string(),
            dimensions,
            ..EmbeddingSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn out_of_order_items_are_placed_by_index() {
        let data = json!([
            {"index": 2, "embedding": [0.0, 0.0, 1.0]},
            {"index": 0, "embedding": [1.0, 0.0, 0.0]},
            {"index": 1, "embedding": [0.0, 1.0, 0.0]}
        ]);
        let vectors = http_embedder(3)
            .collect_embeddings(data.as_array().unwrap(), 3)
            .unwrap();
        assert_eq!(
            vectors,
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]
        );
    }

    #[test]
    fn duplicate_or_missing_indices_are_rejected() {
        let data = json!([
            {"index": 0, "embedding": [1.0, 0.0]},
            {"index": 0, "embedding": [0.0, 1.0]}
        ]);
        let err = http_embedder(2)
            .collect_embeddings(data.as_array().unwrap(), 2)
            .unwrap_err();
        assert!(matches!(err, RagError::Embedding { .. }));
    }
}
