use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::error::GenerationError;
use super::provider::GenerationBackend;
use super::types::{ChatMessage, ChatRequest};
use crate::core::config::GenerationSettings;

/// Chat-completions client for Groq and any other OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
    settings: GenerationSettings,
    timeout_secs: u64,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            settings: settings.clone(),
            timeout_secs: settings.timeout_secs,
            client,
        })
    }

    fn endpoint(&self) -> String {
        if self.base_url.ends_with("/v1") {
            format!("{}/chat/completions", self.base_url)
        } else {
            format!("{}/v1/chat/completions", self.base_url)
        }
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }
        body
    }

    fn map_send_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout_secs)
        } else {
            GenerationError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request =
            ChatRequest::new(vec![ChatMessage::user(prompt)]).with_settings(&self.settings);
        let body = self.request_body(&request);

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let res = builder.send().await.map_err(|e| self.map_send_error(e))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(status, text));
        }

        let text = res.text().await.map_err(|e| self.map_send_error(e))?;
        parse_completion(&text)
    }
}

/// A 2xx body that is not the expected JSON is a protocol error, not a
/// network one, so it is never retried.
fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("malformed completion body: {}", e)))?;
    extract_content(&payload)
}

fn extract_content(payload: &Value) -> Result<String, GenerationError> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            GenerationError::InvalidResponse("missing choices[0].message.content".to_string())
        })
}
