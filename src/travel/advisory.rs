//! Rule-derived advisory strings inserted into every prompt.

use serde::Serialize;

use super::preferences::TravelPreferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyAlert {
    Caution,
    NoAlerts,
}

impl SafetyAlert {
    pub fn evaluate(prefs: &TravelPreferences) -> Self {
        if prefs.has_vulnerable_members() {
            SafetyAlert::Caution
        } else {
            SafetyAlert::NoAlerts
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            SafetyAlert::Caution => {
                "Safety Alert: For groups with children or seniors, exercise caution at mountainous or ocean destinations"
            }
            SafetyAlert::NoAlerts => "No specific safety alerts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingCategory {
    Beach,
    ColdWeather,
    General,
}

const COLD_WEATHER_KEYWORDS: [&str; 3] = ["mountain", "hill", "cold"];

impl PackingCategory {
    /// Case-insensitive substring match; beach wins over cold weather.
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("beach") {
            PackingCategory::Beach
        } else if COLD_WEATHER_KEYWORDS.iter().any(|word| lowered.contains(word)) {
            PackingCategory::ColdWeather
        } else {
            PackingCategory::General
        }
    }

    pub fn recommendation(self) -> &'static str {
        match self {
            PackingCategory::Beach => "Packing: swimwear, sunscreen, sunglasses, flip-flops",
            PackingCategory::ColdWeather => {
                "Packing: warm jackets, thermal wear, snow boots, gloves, scarves"
            }
            PackingCategory::General => {
                "General packing: comfortable clothes, medications, travel documents"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(children: u32, seniors: u32) -> TravelPreferences {
        TravelPreferences {
            children,
            seniors,
            ..Default::default()
        }
    }

    #[test]
    fn children_trigger_caution() {
        let alert = SafetyAlert::evaluate(&prefs(2, 0));
        assert_eq!(alert, SafetyAlert::Caution);
        assert!(alert.text().contains("mountainous or ocean"));
    }

    #[test]
    fn seniors_trigger_caution() {
        assert_eq!(SafetyAlert::evaluate(&prefs(0, 1)), SafetyAlert::Caution);
    }

    #[test]
    fn adults_only_have_no_alerts() {
        let alert = SafetyAlert::evaluate(&prefs(0, 0));
        assert_eq!(alert.text(), "No specific safety alerts");
    }

    #[test]
    fn packing_rules_match_keywords() {
        assert_eq!(PackingCategory::classify("best beaches near Goa"), PackingCategory::Beach);
        assert_eq!(PackingCategory::classify("hill station trip"), PackingCategory::ColdWeather);
        assert_eq!(PackingCategory::classify("COLD desert nights"), PackingCategory::ColdWeather);
        assert_eq!(PackingCategory::classify("visit Delhi"), PackingCategory::General);
        assert_eq!(PackingCategory::classify(""), PackingCategory::General);
    }

    #[test]
    fn beach_rule_wins_over_cold_weather() {
        assert_eq!(
            PackingCategory::classify("beach and mountain combo"),
            PackingCategory::Beach
        );
    }

    #[test]
    fn recommendations_are_distinct() {
        assert!(PackingCategory::Beach.recommendation().contains("swimwear"));
        assert!(PackingCategory::ColdWeather.recommendation().contains("thermal wear"));
        assert!(PackingCategory::General.recommendation().starts_with("General packing"));
    }
}
