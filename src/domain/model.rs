use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic position supplied by the caller's location collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components finite and inside the valid lat/lng ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Untyped record parsed out of the service text. Nothing in it is trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl CandidateRecord {
    pub fn new(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { data }
    }

    /// First non-blank string value among `keys`, trimmed.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.data.get(*key))
            .filter_map(|value| value.as_str())
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// First finite number among `keys`. Numeric strings are accepted.
    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|key| self.data.get(*key))
            .find_map(|value| match value {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .filter(|n| n.is_finite())
    }

    /// Declared position, if both components parse and are in range.
    pub fn position(&self) -> Option<Coordinates> {
        let latitude = self.number(&["latitude", "lat"])?;
        let longitude = self.number(&["longitude", "lng", "lon"])?;
        Some(Coordinates::new(latitude, longitude)).filter(Coordinates::is_valid)
    }
}

/// The four price tiers the prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceLevel {
    #[serde(rename = "$")]
    Inexpensive,
    #[default]
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Expensive,
    #[serde(rename = "$$$$")]
    VeryExpensive,
}

impl PriceLevel {
    pub const ALL: [PriceLevel; 4] = [
        PriceLevel::Inexpensive,
        PriceLevel::Moderate,
        PriceLevel::Expensive,
        PriceLevel::VeryExpensive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceLevel::Inexpensive => "$",
            PriceLevel::Moderate => "$$",
            PriceLevel::Expensive => "$$$",
            PriceLevel::VeryExpensive => "$$$$",
        }
    }

    /// Accepts `$`..`$$$$` or a tier number 1..=4.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(level) = Self::ALL.iter().find(|level| level.as_str() == raw) {
            return Some(*level);
        }
        match raw.parse::<u8>().ok()? {
            1 => Some(PriceLevel::Inexpensive),
            2 => Some(PriceLevel::Moderate),
            3 => Some(PriceLevel::Expensive),
            4 => Some(PriceLevel::VeryExpensive),
            _ => None,
        }
    }
}

impl fmt::Display for PriceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical discovery result handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub rating: f64,
    pub address: String,
    pub price_level: PriceLevel,
    pub maps_uri: String,
    pub coordinates: Option<Coordinates>,
    pub source: String,
}

/// Opaque text returned by a search provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub text: String,
}

impl RawResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Generation knobs forwarded to the provider on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    /// Ask the provider to ground answers in live web search when it supports it.
    pub grounding: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.95,
            max_output_tokens: 2048,
            grounding: true,
        }
    }
}
