use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// What kind of answer a message asks for. Computed before generation and
/// named explicitly in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// Only a greeting; answer with a greeting and nothing else.
    Greeting,
    /// Information about a place: history, culture, attractions.
    PlaceInfo,
    /// Itinerary or explicit multi-topic request.
    FullItinerary,
}

const GREETING_WORDS: [&str; 9] = [
    "hi", "hii", "hello", "hey", "heya", "hiya", "namaste", "hola", "greetings",
];

// "good" plus a time of day is itself a greeting
const GREETING_TIMES: [&str; 4] = ["morning", "afternoon", "evening", "day"];

// allowed alongside a greeting without changing the intent
const GREETING_FILLERS: [&str; 3] = ["there", "all", "everyone"];

fn itinerary_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b(itinerar(y|ies)|schedules?|plan|planning|day[- ]by[- ]day|\d+\s*-?\s*days?|\d+\s*-?\s*nights?|weekend trip|restaurants?|food|foods|eat|eating|cuisines?|dishes|dining|what to eat)\b",
        )
        .expect("itinerary pattern is valid")
    })
}

impl QueryIntent {
    pub fn classify(message: &str) -> Self {
        if is_greeting_only(message) {
            return QueryIntent::Greeting;
        }
        if itinerary_pattern().is_match(message) {
            return QueryIntent::FullItinerary;
        }
        QueryIntent::PlaceInfo
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryIntent::Greeting => "greeting",
            QueryIntent::PlaceInfo => "place_info",
            QueryIntent::FullItinerary => "full_itinerary",
        }
    }

    /// Response-shape directive the prompt gives for this request type.
    pub fn directive(self) -> &'static str {
        match self {
            QueryIntent::Greeting => {
                "The user only greeted you. Greet them back politely and briefly offer help. Do NOT include any travel plan, itinerary, restaurants, or cuisine."
            }
            QueryIntent::PlaceInfo => {
                "The user asked about a place. Provide only history, cultural significance, and must-see attractions. Do NOT include restaurants, cuisine, or itineraries."
            }
            QueryIntent::FullItinerary => {
                "The user asked for a full plan. Include destinations, restaurants filtered by the dietary preference, the best time to visit, and a day-by-day schedule with each day in its own section."
            }
        }
    }
}

fn is_greeting_only(message: &str) -> bool {
    let normalized: String = message
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    let mut greeted = false;
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token == "good" && tokens.get(i + 1).is_some_and(|next| GREETING_TIMES.contains(next)) {
            greeted = true;
            i += 2;
            continue;
        }
        if GREETING_WORDS.contains(&token) {
            greeted = true;
        } else if !GREETING_FILLERS.contains(&token) {
            return false;
        }
        i += 1;
    }
    greeted
}
