pub mod error;
pub mod openai_compat;
pub mod provider;
pub mod service;
pub mod types;

pub use error::GenerationError;
pub use openai_compat::OpenAiCompatibleProvider;
pub use provider::GenerationBackend;
pub use service::GenerationService;
pub use types::{ChatMessage, ChatRequest};
