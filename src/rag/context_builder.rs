//! Turns retrieved hits into the `<context>` block of the prompt.

use serde::{Deserialize, Serialize};

use super::index::SearchHit;
use crate::core::config::RagSettings;

/// Configuration for context building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBuilderConfig {
    /// Maximum total context length in characters
    pub max_context_length: usize,
    /// Whether to include source citations
    pub include_citations: bool,
}

impl Default for ContextBuilderConfig {
    fn default() -> Self {
        Self {
            max_context_length: 8000,
            include_citations: false,
        }
    }
}

impl From<&RagSettings> for ContextBuilderConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            max_context_length: settings.max_context_chars.max(1),
            include_citations: settings.include_citations,
        }
    }
}

pub struct RAGContextBuilder {
    config: ContextBuilderConfig,
}

impl RAGContextBuilder {
    pub fn new(config: ContextBuilderConfig) -> Self {
        Self { config }
    }

    /// Concatenates hits in rank order, stopping before the length budget is
    /// exceeded. The top hit is always kept, cut to the budget if it must be.
    pub fn build_context(&self, hits: &[SearchHit]) -> String {
        if hits.is_empty() {
            return String::new();
        }

        let mut context = String::new();
        let mut current_length = 0;
        let max_length = self.config.max_context_length;

        for (i, hit) in hits.iter().enumerate() {
            let chunk_text = hit.chunk.text.trim();
            let entry = if self.config.include_citations {
                format!(
                    "[{}] (Source: {}, relevance: {:.2})\n{}\n\n",
                    i + 1,
                    hit.chunk.source,
                    hit.score,
                    chunk_text
                )
            } else {
                format!("{}\n\n", chunk_text)
            };

            let addition_length = entry.chars().count();
            if current_length + addition_length > max_length {
                if i == 0 {
                    context.extend(entry.chars().take(max_length));
                }
                break;
            }
            context.push_str(&entry);
            current_length += addition_length;
        }

        context.trim().to_string()
    }
}

impl Default for RAGContextBuilder {
    fn default() -> Self {
        Self::new(ContextBuilderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::splitter::TextChunk;

    fn hit(text: &str, score: f32) -> SearchHit {
        SearchHit {
            chunk: TextChunk {
                text: text.to_string(),
                source: "total_data.txt".to_string(),
                start_offset: 0,
                chunk_index: 0,
            },
            score,
        }
    }

    #[test]
    fn joins_hits_in_order() {
        let builder = RAGContextBuilder::default();
        let context = builder.build_context(&[hit("Goa beaches.\n", 0.9), hit("Baga beach.", 0.8)]);
        assert_eq!(context, "Goa beaches.\n\nBaga beach.");
    }

    #[test]
    fn citations_include_source_and_score() {
        let builder = RAGContextBuilder::new(ContextBuilderConfig {
            include_citations: true,
            ..Default::default()
        });
        let context = builder.build_context(&[hit("Amber Fort", 0.912)]);
        assert!(context.starts_with("[1] (Source: total_data.txt, relevance: 0.91)"));
    }

    #[test]
    fn respects_length_budget() {
        let builder = RAGContextBuilder::new(ContextBuilderConfig {
            max_context_length: 30,
            include_citations: false,
        });
        let context = builder.build_context(&[hit(&"a".repeat(20), 0.9), hit(&"b".repeat(20), 0.8)]);
        assert_eq!(context, "a".repeat(20));
    }

    #[test]
    fn oversized_top_hit_is_truncated_not_dropped() {
        let builder = RAGContextBuilder::new(ContextBuilderConfig {
            max_context_length: 50,
            include_citations: false,
        });
        let big = "Goa beaches ".repeat(100);
        let context = builder.build_context(&[hit(&big, 0.9), hit("Baga beach.", 0.8)]);
        assert!(context.starts_with("Goa beaches"));
        assert!(context.chars().count() <= 50);
        assert!(!context.contains("Baga beach."));
    }

    #[test]
    fn settings_feed_budget_and_citations() {
        let settings = RagSettings {
            max_context_chars: 120,
            include_citations: true,
            ..RagSettings::default()
        };
        let config = ContextBuilderConfig::from(&settings);
        assert_eq!(config.max_context_length, 120);
        assert!(config.include_citations);
    }

    #[test]
    fn empty_hits_give_empty_context() {
        assert!(RAGContextBuilder::default().build_context(&[]).is_empty());
    }
}
