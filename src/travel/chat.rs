use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use super::advisory::{PackingCategory, SafetyAlert};
use super::guard::ResponseGuard;
use super::intent::QueryIntent;
use super::preferences::TravelPreferences;
use super::prompt::{build_prompt, PromptInput};
use crate::core::config::RagSettings;
use crate::core::errors::ApiError;
use crate::llm::GenerationService;
use crate::rag::{
    ContextBuilderConfig, EmbeddingBackend, RAGContextBuilder, SearchHit, VectorIndex,
};

#[derive(Debug, Clone, Serialize)]
pub struct ChatAnswer {
    pub response: String,
    pub intent: QueryIntent,
    pub retrieved_chunks: usize,
}

/// Request handling for `POST /chat`. Holds only shared read-only handles,
/// so concurrent requests need no coordination.
#[derive(Clone)]
pub struct ChatService {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingBackend>,
    generator: GenerationService,
    context_builder: Arc<RAGContextBuilder>,
    guard: ResponseGuard,
    top_k: usize,
}

impl ChatService {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingBackend>,
        generator: GenerationService,
        rag: &RagSettings,
        enforce_response_shape: bool,
    ) -> Self {
        Self {
            index,
            embedder,
            generator,
            context_builder: Arc::new(RAGContextBuilder::new(ContextBuilderConfig::from(rag))),
            guard: ResponseGuard::new(enforce_response_shape),
            top_k: rag.top_k.max(1),
        }
    }

    pub async fn handle(
        &self,
        message: &str,
        preferences: &Value,
        history: &str,
    ) -> Result<ChatAnswer, ApiError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("chat", %request_id);
        self.handle_inner(message, preferences, history)
            .instrument(span)
            .await
    }

    async fn handle_inner(
        &self,
        message: &str,
        preferences: &Value,
        history: &str,
    ) -> Result<ChatAnswer, ApiError> {
        let prefs = TravelPreferences::from_value(preferences);
        let safety = SafetyAlert::evaluate(&prefs);
        let packing = PackingCategory::classify(message);
        let intent = QueryIntent::classify(message);

        let hits = self.retrieve(message, intent).await?;
        let context = self.context_builder.build_context(&hits);
        tracing::info!(
            intent = intent.as_str(),
            retrieved = hits.len(),
            "Answering chat message"
        );

        let prompt = build_prompt(&PromptInput {
            message,
            history,
            preferences: &prefs,
            context: &context,
            safety,
            packing,
            intent,
        });

        let raw = self.generator.generate(&prompt).await.map_err(|err| {
            tracing::warn!("Generation via '{}' failed: {}", self.generator.backend_name(), err);
            ApiError::from(err)
        })?;

        Ok(ChatAnswer {
            response: self.guard.enforce(intent, &raw),
            intent,
            retrieved_chunks: hits.len(),
        })
    }

    async fn retrieve(&self, message: &str, intent: QueryIntent) -> Result<Vec<SearchHit>, ApiError> {
        if intent == QueryIntent::Greeting || message.trim().is_empty() {
            return Ok(Vec::new());
        }
        let query = self.embedder.embed(message).await?;
        Ok(self.index.search(&query, self.top_k)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::llm::{GenerationBackend, GenerationError};
    use crate::rag::{HashingEmbedder, IndexHeader, TextChunk};

    const CORPUS: [&str; 3] = [
        "Jaipur is the Pink City, home to Amber Fort and Hawa Mahal.",
        "Goa is known for beaches like Baga and Calangute.",
        "Manali is a hill station in the Himalayas with snow in winter.",
    ];

    struct Recording {
        reply: Result<String, GenerationError>,
        prompts: Mutex<Vec<String>>,
    }

    impl Recording {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: GenerationError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl GenerationBackend for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(GenerationError::Auth(msg)) => Err(GenerationError::Auth(msg.clone())),
                Err(_) => Err(GenerationError::InvalidResponse("scripted".into())),
            }
        }
    }

    async fn service(backend: Arc<Recording>) -> ChatService {
        let rag = RagSettings {
            top_k: 2,
            ..RagSettings::default()
        };
        service_over(backend, &CORPUS, &rag).await
    }

    async fn service_over(backend: Arc<Recording>, corpus: &[&str], rag: &RagSettings) -> ChatService {
        let embedder = Arc::new(HashingEmbedder::new("hashing-test", 128));
        let chunks: Vec<TextChunk> = corpus
            .iter()
            .enumerate()
            .map(|(i, text)| TextChunk {
                text: text.to_string(),
                source: "corpus.txt".to_string(),
                start_offset: i * 100,
                chunk_index: i,
            })
            .collect();
        let texts: Vec<String> = corpus.iter().map(|s| s.to_string()).collect();
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        let header = IndexHeader::new("hashing-test", 128, 1000, 200, "corpus.txt", &corpus.join("\n"));
        let index = VectorIndex::build(header, chunks, embeddings).unwrap();

        let generator =
            GenerationService::new(backend, Duration::from_secs(5), Duration::from_millis(1));
        ChatService::new(Arc::new(index), embedder, generator, rag, true)
    }

    #[tokio::test]
    async fn grounds_prompt_in_retrieved_chunks() {
        let backend = Recording::replying("**History**\nGoa was a Portuguese colony.");
        let chat = service(backend.clone()).await;

        let answer = chat
            .handle("Tell me about Goa beaches", &json!({"children": 1}), "")
            .await
            .unwrap();

        assert_eq!(answer.intent, QueryIntent::PlaceInfo);
        assert_eq!(answer.retrieved_chunks, 2);
        let prompt = backend.last_prompt();
        let context_start = prompt.find("<context>").unwrap();
        assert!(prompt[context_start..].contains("Baga and Calangute"));
        assert!(prompt.contains("Safety Alert: For groups with children or seniors"));
        assert!(prompt.contains("Packing: swimwear"));
    }

    #[tokio::test]
    async fn chunks_larger_than_the_budget_still_ground_the_prompt() {
        let backend = Recording::replying("**History**\nGoa has long beaches.");
        let long_chunk = "Goa beaches Baga Calangute. ".repeat(400);
        let corpus = [long_chunk.as_str(), CORPUS[0]];
        let rag = RagSettings {
            chunk_size: 10_000,
            top_k: 2,
            max_context_chars: 500,
            ..RagSettings::default()
        };
        let chat = service_over(backend.clone(), &corpus, &rag).await;

        let answer = chat.handle("Goa beaches", &json!({}), "").await.unwrap();

        assert_eq!(answer.retrieved_chunks, 2);
        let prompt = backend.last_prompt();
        let start = prompt.find("<context>\n").unwrap() + "<context>\n".len();
        let end = prompt.find("\n</context>").unwrap();
        let context = &prompt[start..end];
        assert!(context.starts_with("Goa beaches Baga Calangute."));
        assert!(context.chars().count() <= 500);
    }

    #[tokio::test]
    async fn citations_setting_reaches_the_prompt() {
        let backend = Recording::replying("ok");
        let rag = RagSettings {
            top_k: 1,
            include_citations: true,
            ..RagSettings::default()
        };
        let chat = service_over(backend.clone(), &CORPUS, &rag).await;

        chat.handle("Goa beaches", &json!({}), "").await.unwrap();

        assert!(backend.last_prompt().contains("[1] (Source: corpus.txt, relevance:"));
    }

    #[tokio::test]
    async fn greeting_skips_retrieval_and_is_guarded() {
        let backend = Recording::replying("Hello!\n**Day 1**\n- Amber Fort");
        let chat = service(backend.clone()).await;

        let answer = chat.handle("hello there", &json!({}), "").await.unwrap();

        assert_eq!(answer.intent, QueryIntent::Greeting);
        assert_eq!(answer.retrieved_chunks, 0);
        assert_eq!(answer.response, crate::travel::guard::CANNED_GREETING);
        assert!(backend.last_prompt().contains("<context>\n\n</context>"));
    }

    #[tokio::test]
    async fn empty_message_still_answers() {
        let backend = Recording::replying("How can I help?");
        let chat = service(backend.clone()).await;

        let answer = chat.handle("", &json!({}), "").await.unwrap();

        assert_eq!(answer.response, "How can I help?");
        let prompt = backend.last_prompt();
        assert!(prompt.contains("No specific safety alerts"));
        assert!(prompt.contains("General packing"));
    }

    #[tokio::test]
    async fn itinerary_answer_is_not_trimmed() {
        let reply = "**Day 1**\n- Amber Fort\n**Day 2**\n- Hawa Mahal\n**Restaurants**\n- LMB";
        let chat = service(Recording::replying(reply)).await;

        let answer = chat
            .handle("Plan a 2-day trip to Jaipur", &json!({"dietary": "Vegetarian"}), "")
            .await
            .unwrap();

        assert_eq!(answer.intent, QueryIntent::FullItinerary);
        assert_eq!(answer.response, reply);
    }

    #[tokio::test]
    async fn generation_failure_is_a_generation_error() {
        let backend = Recording::failing(GenerationError::Auth("bad key".into()));
        let chat = service(backend).await;

        let err = chat.handle("visit Delhi", &json!({}), "").await.unwrap_err();
        assert!(matches!(err, ApiError::Generation(_)));
    }
}
