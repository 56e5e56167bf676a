//! Recursive character splitter.
//!
//! Splits a document into overlapping chunks of at most `chunk_size`
//! characters. Each chunk begins exactly `chunk_overlap` characters before the
//! end of the previous one, so the document is recovered by taking the first
//! chunk whole and every later chunk minus its first `chunk_overlap` characters.
//!
//! Break points prefer the configured separators in order (paragraph, line,
//! sentence, word by default) and fall back to a hard cut at `chunk_size`.

use serde::{Deserialize, Serialize};

use super::document::Document;
use crate::core::config::settings::{default_separators, RagSettings};

/// Configuration for the splitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks
    pub chunk_overlap: usize,
    /// Break-point preference, strongest boundary first
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: default_separators(),
        }
    }
}

impl From<&RagSettings> for SplitterConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            separators: settings.separators.clone(),
        }
    }
}

/// A text chunk with source information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// The text content
    pub text: String,
    /// Source identifier (file path)
    pub source: String,
    /// Character offset in original document
    pub start_offset: usize,
    /// Chunk index within the source
    pub chunk_index: usize,
}

impl TextChunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

pub struct RecursiveSplitter {
    config: SplitterConfig,
}

impl RecursiveSplitter {
    /// `chunk_overlap` is clamped below `chunk_size`; configuration validation
    /// rejects such values before they get here.
    pub fn new(mut config: SplitterConfig) -> Self {
        config.chunk_size = config.chunk_size.max(1);
        config.chunk_overlap = config.chunk_overlap.min(config.chunk_size - 1);
        config.separators.retain(|s| !s.is_empty());
        Self { config }
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    pub fn split_document(&self, document: &Document) -> Vec<TextChunk> {
        self.split_text(&document.content, &document.source)
    }

    pub fn split_text(&self, text: &str, source: &str) -> Vec<TextChunk> {
        let chunk_size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        // byte offset of every char, plus the end of the string
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let total_chars = boundaries.len();
        boundaries.push(text.len());

        let mut chunks = Vec::new();
        if total_chars == 0 {
            return chunks;
        }

        let mut start = 0;
        loop {
            let hard_end = (start + chunk_size).min(total_chars);
            let end = if hard_end == total_chars {
                total_chars
            } else {
                self.find_break(text, &boundaries, start + overlap, hard_end)
                    .unwrap_or(hard_end)
            };

            chunks.push(TextChunk {
                text: text[boundaries[start]..boundaries[end]].to_string(),
                source: source.to_string(),
                start_offset: start,
                chunk_index: chunks.len(),
            });

            if end == total_chars {
                break;
            }
            start = end - overlap;
        }

        chunks
    }

    /// Latest break after a separator inside `(window_start, window_end]`, trying
    /// separators in preference order. Returns a char index.
    fn find_break(
        &self,
        text: &str,
        boundaries: &[usize],
        window_start: usize,
        window_end: usize,
    ) -> Option<usize> {
        let base = boundaries[window_start];
        let window = &text[base..boundaries[window_end]];

        self.config.separators.iter().find_map(|separator| {
            window.rfind(separator.as_str()).map(|pos| {
                let end_byte = base + pos + separator.len();
                // separators are whole strs, so end_byte is a char boundary
                boundaries.partition_point(|&b| b < end_byte)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> RecursiveSplitter {
        RecursiveSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        })
    }

    fn reassemble(chunks: &[TextChunk], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(&chunk.text);
            } else {
                out.extend(chunk.text.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn short_text_is_single_chunk() {
        let chunks = splitter(100, 20).split_text("Goa has beaches.", "t");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Goa has beaches.");
        assert_eq!(chunks[0].start_offset, 0);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(splitter(100, 20).split_text("", "t").is_empty());
    }

    #[test]
    fn prefers_paragraph_breaks() {
        let text = format!("{}\n\n{}", "a".repeat(60), "b".repeat(60));
        let chunks = splitter(100, 10).split_text(&text, "t");

        assert!(chunks[0].text.ends_with("\n\n"));
        assert_eq!(chunks[0].char_len(), 62);
        assert_eq!(reassemble(&chunks, 10), text);
    }

    #[test]
    fn falls_back_to_word_then_hard_cut() {
        let words = "word ".repeat(30);
        let chunks = splitter(32, 8).split_text(&words, "t");
        assert!(chunks[0].text.ends_with(' '));
        assert_eq!(reassemble(&chunks, 8), words);

        let solid = "x".repeat(95);
        let chunks = splitter(40, 10).split_text(&solid, "t");
        assert_eq!(chunks[0].char_len(), 40);
        assert_eq!(chunks[1].start_offset, 30);
        assert_eq!(reassemble(&chunks, 10), solid);
    }

    #[test]
    fn consecutive_chunks_share_exact_overlap() {
        let text = "Jaipur is the Pink City. Udaipur is the City of Lakes. ".repeat(40);
        let chunks = splitter(200, 50).split_text(&text, "t");

        assert!(chunks.len() > 2);
        for pair in chunks.windows(2) {
            let tail: String = pair[0]
                .text
                .chars()
                .skip(pair[0].char_len() - 50)
                .collect();
            let head: String = pair[1].text.chars().take(50).collect();
            assert_eq!(tail, head);
            assert!(pair[0].char_len() <= 200);
        }
        assert_eq!(reassemble(&chunks, 50), text);
    }

    #[test]
    fn separator_preference_is_configurable() {
        let text = format!("{}. {}\n{}", "a".repeat(20), "b".repeat(20), "c".repeat(30));
        let sentence_first = RecursiveSplitter::new(SplitterConfig {
            chunk_size: 50,
            chunk_overlap: 5,
            separators: vec![". ".into(), "\n".into()],
        });
        let chunks = sentence_first.split_text(&text, "t");
        assert!(chunks[0].text.ends_with(". "));
    }

    #[test]
    fn handles_multibyte_characters() {
        let text = "मंदिर और किले। ".repeat(30);
        let chunks = splitter(40, 10).split_text(&text, "t");
        assert!(chunks.iter().all(|c| c.char_len() <= 40));
        assert_eq!(reassemble(&chunks, 10), text);
    }

    #[test]
    fn chunk_indices_are_sequential() {
        let text = "x".repeat(500);
        let chunks = splitter(100, 20).split_text(&text, "corpus.txt");
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.source, "corpus.txt");
        }
    }
}
