//! Prompt assembly for the travel assistant.

use super::advisory::{PackingCategory, SafetyAlert};
use super::intent::QueryIntent;
use super::preferences::TravelPreferences;

const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert Indian tourism assistant. Your responsibilities include:

1. **Top Tourist Destinations**: Recommend the best tourist destinations within any state or city in India, with:
   - History: The historical significance of each location.
   - Cultural Significance: The cultural importance and unique features.
   - Must-See Attractions: Key attractions that visitors should not miss.

2. **Restaurant Recommendations**: Suggest restaurants near the recommended destinations, categorized by:
   - Dietary Preferences: {dietary_preference}
   - Must-Try Cuisine: Dishes that are renowned or unique to that location.

3. **Best Time to Visit**: Advise on the optimal time of year to visit each location, considering:
   - Weather: Ideal weather conditions for travel.
   - Local Festivals: Significant festivals or events.
   - Tourist Footfall: Peak and off-peak seasons.

4. **Complete Travel Schedules**: For users touring an entire state, provide an itinerary covering:
   - Significant Attractions: Major sites and experiences.
   - Cultural Experiences: Ways to engage with local culture.
   - Local Specialties: Unique local foods and activities.

5. **Safety Alerts**: {safety_alerts}

6. **Packing Recommendations**: {packing_recommendations}

**Instructions for responding:**
- Follow the request type below exactly; it decides which sections belong in the answer.
- Format your response clearly:
    - Use **bold** for section headers
    - Put each day's activities (if itinerary) in its own section headed "**Day N**"
    - Use bullet points for clarity
    - Keep paragraphs short (2-3 sentences max)
    - Add emojis to enhance friendliness when appropriate"#;

/// Everything the prompt is assembled from, computed once per request.
#[derive(Debug, Clone)]
pub struct PromptInput<'a> {
    pub message: &'a str,
    pub history: &'a str,
    pub preferences: &'a TravelPreferences,
    pub context: &'a str,
    pub safety: SafetyAlert,
    pub packing: PackingCategory,
    pub intent: QueryIntent,
}

pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let instructions = SYSTEM_INSTRUCTIONS
        .replace("{dietary_preference}", &input.preferences.dietary)
        .replace("{safety_alerts}", input.safety.text())
        .replace("{packing_recommendations}", input.packing.recommendation());

    let history = if input.history.trim().is_empty() {
        "(no previous messages)"
    } else {
        input.history.trim()
    };
    let prefs = input.preferences;

    format!(
        "{instructions}\n\n\
         Request type: {intent}\n\
         {directive}\n\n\
         Current conversation history:\n{history}\n\n\
         User preferences:\n\
         - Group size: {num_members}\n\
         - Children: {children}\n\
         - Adults: {adults}\n\
         - Seniors: {seniors}\n\
         - Dietary: {dietary}\n\n\
         <context>\n{context}\n</context>\n\n\
         Question: {message}\n\n\
         Answer:",
        intent = input.intent.as_str(),
        directive = input.intent.directive(),
        num_members = prefs.num_members,
        children = prefs.children,
        adults = prefs.adults,
        seniors = prefs.seniors,
        dietary = prefs.dietary,
        context = input.context,
        message = input.message,
    )
}
