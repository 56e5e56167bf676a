//! Post-generation enforcement of the response shape each intent allows.
//!
//! The prompt already tells the model what to include; this pass makes the
//! outcome deterministic when the model ignores it.

use std::sync::OnceLock;

use regex::Regex;

use super::intent::QueryIntent;

pub const CANNED_GREETING: &str = "Namaste! 🙏 I'm your India travel assistant. Ask me about any destination, or tell me where you'd like to go and I can put together a plan for you.";

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // markdown heading, a fully bold line, or a "Day N" line
        Regex::new(r"^\s*(#{1,6}\s+\S.*|\*\*[^*].*\*\*:?\s*|(?i:day)\s*\d+\b.*)$")
            .expect("header pattern is valid")
    })
}

fn excluded_topic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b(restaurants?|cuisines?|food|foods|dining|eat|eats|eating|itinerar(y|ies)|schedules?|day\s*\d+)\b",
        )
        .expect("excluded topic pattern is valid")
    })
}

/// A header line plus the body lines up to the next header.
struct Section<'a> {
    header: Option<&'a str>,
    lines: Vec<&'a str>,
}

fn sections(answer: &str) -> Vec<Section<'_>> {
    let mut out = vec![Section {
        header: None,
        lines: Vec::new(),
    }];
    for line in answer.lines() {
        if header_pattern().is_match(line) {
            out.push(Section {
                header: Some(line),
                lines: vec![line],
            });
        } else if let Some(current) = out.last_mut() {
            current.lines.push(line);
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
pub struct ResponseGuard {
    enabled: bool,
}

impl Default for ResponseGuard {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ResponseGuard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enforce(&self, intent: QueryIntent, answer: &str) -> String {
        if !self.enabled {
            return answer.to_string();
        }
        match intent {
            QueryIntent::Greeting => enforce_greeting(answer),
            QueryIntent::PlaceInfo => enforce_place_info(answer),
            QueryIntent::FullItinerary => answer.to_string(),
        }
    }
}

fn has_excluded_header(section: &Section<'_>) -> bool {
    section
        .header
        .is_some_and(|header| excluded_topic_pattern().is_match(header))
}

fn enforce_greeting(answer: &str) -> String {
    if sections(answer).iter().any(has_excluded_header) {
        tracing::debug!("Replacing planned answer to a greeting");
        CANNED_GREETING.to_string()
    } else {
        answer.to_string()
    }
}

fn enforce_place_info(answer: &str) -> String {
    let all = sections(answer);
    let dropped = all.iter().filter(|s| has_excluded_header(s)).count();
    if dropped == 0 {
        return answer.to_string();
    }

    let kept: Vec<&str> = all
        .iter()
        .filter(|s| !has_excluded_header(s))
        .flat_map(|s| s.lines.iter().copied())
        .collect();
    let trimmed = kept.join("\n").trim().to_string();
    if trimmed.is_empty() {
        // nothing but excluded sections; better the raw answer than nothing
        return answer.to_string();
    }

    tracing::debug!(dropped, "Dropped sections outside the place-info shape");
    trimmed
}
