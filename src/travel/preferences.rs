use serde::Serialize;
use serde_json::Value;

pub const DIETARY_NOT_SPECIFIED: &str = "Not specified";

/// Group composition and dietary preference sent with each chat request.
///
/// Parsing never fails: absent counts take their defaults, malformed ones
/// (non-numeric strings, negatives, booleans, objects) become zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravelPreferences {
    pub num_members: u32,
    pub children: u32,
    pub adults: u32,
    pub seniors: u32,
    pub dietary: String,
}

impl Default for TravelPreferences {
    fn default() -> Self {
        Self {
            num_members: 1,
            children: 0,
            adults: 1,
            seniors: 0,
            dietary: DIETARY_NOT_SPECIFIED.to_string(),
        }
    }
}

impl TravelPreferences {
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(map) = value.as_object() else {
            return defaults;
        };

        let dietary = map
            .get("dietary")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or(defaults.dietary);

        Self {
            num_members: parse_count(map.get("num_members"), defaults.num_members),
            children: parse_count(map.get("children"), defaults.children),
            adults: parse_count(map.get("adults"), defaults.adults),
            seniors: parse_count(map.get("seniors"), defaults.seniors),
            dietary,
        }
    }

    pub fn has_vulnerable_members(&self) -> bool {
        self.children > 0 || self.seniors > 0
    }
}

fn parse_count(value: Option<&Value>, default: u32) -> u32 {
    match value {
        None | Some(Value::Null) => default,
        Some(Value::Number(n)) => n
            .as_u64()
            .map(clamp_u64)
            .or_else(|| n.as_f64().map(clamp_f64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<u64>()
                .map(clamp_u64)
                .or_else(|_| trimmed.parse::<f64>().map(clamp_f64))
                .unwrap_or(0)
        }
        Some(_) => 0,
    }
}

fn clamp_u64(n: u64) -> u32 {
    n.min(u32::MAX as u64) as u32
}

fn clamp_f64(n: f64) -> u32 {
    if n.is_finite() && n > 0.0 {
        n.min(u32::MAX as f64) as u32
    } else {
        0
    }
}
