use crate::domain::model::{CandidateRecord, PriceLevel, Venue};
use url::Url;

pub const DEFAULT_CUISINE: &str = "Unknown";
pub const DEFAULT_RATING: f64 = 0.0;
const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Maps untrusted candidates to [`Venue`]s for one pipeline run.
#[derive(Debug, Clone)]
pub struct Normalizer {
    provenance: String,
    batch: i64,
}

impl Normalizer {
    /// `batch` seeds identifiers; it must differ between runs that share a consumer.
    pub fn new(provenance: impl Into<String>, batch: i64) -> Self {
        Self {
            provenance: provenance.into(),
            batch,
        }
    }

    pub fn for_now(provenance: impl Into<String>) -> Self {
        Self::new(provenance, chrono::Utc::now().timestamp_millis())
    }

    pub fn normalize(&self, candidates: Vec<CandidateRecord>) -> Vec<Venue> {
        candidates
            .into_iter()
            .enumerate()
            .filter_map(|(index, candidate)| self.normalize_one(index, &candidate))
            .collect()
    }

    fn normalize_one(&self, index: usize, candidate: &CandidateRecord) -> Option<Venue> {
        let Some(name) = candidate.text(&["name", "title"]) else {
            tracing::debug!("Dropping candidate #{} without a name", index);
            return None;
        };
        let address = candidate.text(&["address", "vicinity"]).unwrap_or_default();

        let price_level = candidate
            .text(&["priceLevel", "price_level", "price"])
            .and_then(|raw| PriceLevel::parse(&raw))
            .or_else(|| {
                candidate
                    .number(&["priceLevel", "price_level", "price"])
                    .and_then(|n| PriceLevel::parse(&n.to_string()))
            })
            .unwrap_or_default();

        let maps_uri = candidate
            .text(&["googleMapsUri", "mapsUri", "mapUri", "map_uri"])
            .filter(|uri| is_http_url(uri))
            .unwrap_or_else(|| maps_search_uri(&name, &address));

        Some(Venue {
            id: format!("gen-{}-{}", self.batch, index),
            cuisine: candidate
                .text(&["cuisine", "category"])
                .unwrap_or_else(|| DEFAULT_CUISINE.to_string()),
            rating: candidate
                .number(&["rating"])
                .map(|r| r.clamp(0.0, 5.0))
                .unwrap_or(DEFAULT_RATING),
            price_level,
            maps_uri,
            coordinates: candidate.position(),
            source: self.provenance.clone(),
            name,
            address,
        })
    }
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Search-style maps link built from the venue name and address.
pub fn maps_search_uri(name: &str, address: &str) -> String {
    let query = format!("{} {}", name, address);
    let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!("{}{}", MAPS_SEARCH_URL, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidates(value: serde_json::Value) -> Vec<CandidateRecord> {
        serde_json::from_value::<Vec<serde_json::Map<String, serde_json::Value>>>(value)
            .unwrap()
            .into_iter()
            .map(CandidateRecord::new)
            .collect()
    }

    #[test]
    fn test_full_record() {
        let venues = Normalizer::new("gemini", 42).normalize(candidates(json!([{
            "name": "Taco Spot",
            "cuisine": "Mexican",
            "rating": 4.5,
            "address": "1 Main St",
            "priceLevel": "$$$",
            "googleMapsUri": "https://maps.google.com/?cid=123",
            "latitude": 19.43,
            "longitude": -99.13
        }])));

        assert_eq!(venues.len(), 1);
        let venue = &venues[0];
        assert_eq!(venue.id, "gen-42-0");
        assert_eq!(venue.cuisine, "Mexican");
        assert_eq!(venue.rating, 4.5);
        assert_eq!(venue.price_level, PriceLevel::Expensive);
        assert_eq!(venue.maps_uri, "https://maps.google.com/?cid=123");
        assert_eq!(venue.source, "gemini");
        assert!(venue.coordinates.is_some());
    }

    #[test]
    fn test_defaults_and_constructed_uri() {
        let venues = Normalizer::new("gemini", 1).normalize(candidates(json!([
            {"name": "Taco Spot", "address": "1 Main St", "googleMapsUri": "not a url"}
        ])));
        let venue = &venues[0];
        assert_eq!(venue.cuisine, DEFAULT_CUISINE);
        assert_eq!(venue.rating, DEFAULT_RATING);
        assert_eq!(venue.price_level, PriceLevel::Moderate);
        assert!(venue.maps_uri.starts_with(MAPS_SEARCH_URL));
        assert!(venue.maps_uri.contains("Taco+Spot"));
        assert!(venue.maps_uri.contains("1+Main+St"));
    }

    #[test]
    fn test_nameless_candidates_dropped_ids_unique() {
        let venues = Normalizer::new("gemini", 7).normalize(candidates(json!([
            {"name": "A"},
            {"name": "   ", "cuisine": "Thai"},
            {"cuisine": "Thai"},
            {"name": "B", "priceLevel": 4, "rating": 9}
        ])));
        assert_eq!(venues.len(), 2);
        assert_ne!(venues[0].id, venues[1].id);
        assert!(venues.iter().all(|v| !v.id.is_empty() && !v.maps_uri.is_empty()));
        assert_eq!(venues[1].price_level, PriceLevel::VeryExpensive);
        assert_eq!(venues[1].rating, 5.0);
    }

    #[test]
    fn test_unknown_price_falls_back_to_middle_tier() {
        let venues = Normalizer::new("gemini", 0).normalize(candidates(json!([
            {"name": "A", "priceLevel": "cheap"}
        ])));
        assert_eq!(venues[0].price_level, PriceLevel::Moderate);
    }
}
