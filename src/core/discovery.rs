use crate::core::extractor::parse_candidates;
use crate::core::geofence::Geofence;
use crate::core::normalizer::Normalizer;
use crate::core::prompt::{compose_prompt, PromptRequest};
use crate::domain::model::{Coordinates, GenerationSettings, Venue};
use crate::domain::ports::{LocationProvider, SearchProvider};
use crate::utils::error::{DiscoveryError, FailureKind, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_finite, validate_range, Validate,
};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub max_results: usize,
    pub geofence: Geofence,
    /// Language tag for text fields in the answer, e.g. `zh-TW`.
    pub language: Option<String>,
    pub generation: GenerationSettings,
    pub location_timeout: Duration,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            geofence: Geofence::default(),
            language: None,
            generation: GenerationSettings::default(),
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
        }
    }
}

impl Validate for DiscoveryOptions {
    fn validate(&self) -> Result<()> {
        validate_range("max_results", self.max_results, 1, 20)?;
        validate_positive_finite("radius_km", self.geofence.radius_km)?;
        validate_range("temperature", self.generation.temperature, 0.0, 2.0)?;
        validate_range("top_p", self.generation.top_p, 0.0, 1.0)?;
        validate_range("max_output_tokens", self.generation.max_output_tokens, 1, 65_536)?;
        if let Some(language) = &self.language {
            validate_non_empty_string("language", language)?;
        }
        Ok(())
    }
}

/// Result of a fail-soft discovery.
///
/// `failure` lets a UI tell "the search failed" apart from "nothing matched".
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    pub venues: Vec<Venue>,
    pub failure: Option<FailureKind>,
}

impl DiscoveryReport {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    fn failed(kind: FailureKind) -> Self {
        Self {
            venues: Vec::new(),
            failure: Some(kind),
        }
    }
}

pub struct DiscoveryService<P: SearchProvider> {
    provider: P,
    options: DiscoveryOptions,
}

impl<P: SearchProvider> DiscoveryService<P> {
    pub fn new(provider: P) -> Self {
        Self::with_options(provider, DiscoveryOptions::default())
    }

    pub fn with_options(provider: P, options: DiscoveryOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Runs the pipeline once and reports the first failing stage.
    pub async fn run(&self, query: &str, coordinates: Option<Coordinates>) -> Result<Vec<Venue>> {
        self.options.validate()?;

        let coordinates = coordinates.filter(|coords| {
            let valid = coords.is_valid();
            if !valid {
                tracing::warn!("Ignoring invalid coordinates ({})", coords);
            }
            valid
        });

        let prompt = compose_prompt(&PromptRequest {
            query,
            coordinates,
            radius_km: self.options.geofence.radius_km,
            max_results: self.options.max_results,
            language: self.options.language.as_deref(),
        })?;
        tracing::debug!("Composed prompt ({} chars)", prompt.len());

        let response = self
            .provider
            .generate(&prompt, &self.options.generation)
            .await?;
        if response.is_blank() {
            return Err(DiscoveryError::EmptyResponse);
        }
        tracing::debug!("Raw response: {}", response.text);

        let candidates = parse_candidates(&response.text)?;
        tracing::debug!("Parsed {} candidate records", candidates.len());

        let candidates = self.options.geofence.apply(candidates, coordinates);

        let mut venues = Normalizer::for_now(self.provider.provenance()).normalize(candidates);
        venues.truncate(self.options.max_results);

        tracing::info!("Discovered {} venues for \"{}\"", venues.len(), query.trim());
        Ok(venues)
    }

    /// Never fails: any error becomes an empty list plus a failure tag.
    pub async fn discover_with_report(
        &self,
        query: &str,
        coordinates: Option<Coordinates>,
    ) -> DiscoveryReport {
        match self.run(query, coordinates).await {
            Ok(venues) => DiscoveryReport {
                venues,
                failure: None,
            },
            Err(e) => {
                tracing::error!("Discovery failed: {} (kind: {:?})", e, e.kind());
                tracing::debug!("Suggestion: {}", e.recovery_suggestion());
                if let Some(detail) = e.diagnostic() {
                    tracing::debug!("Upstream detail: {}", detail);
                }
                DiscoveryReport::failed(e.kind())
            }
        }
    }

    pub async fn discover(&self, query: &str, coordinates: Option<Coordinates>) -> Vec<Venue> {
        self.discover_with_report(query, coordinates).await.venues
    }

    /// Asks `locator` for a position first, then searches with or without it.
    pub async fn discover_with_location<L: LocationProvider + ?Sized>(
        &self,
        query: &str,
        locator: &L,
    ) -> DiscoveryReport {
        if query.trim().is_empty() {
            tracing::warn!("Empty query, skipping location lookup and search");
            return DiscoveryReport::failed(FailureKind::InvalidInput);
        }
        let coordinates = self.locate(locator).await;
        self.discover_with_report(query, coordinates).await
    }

    async fn locate<L: LocationProvider + ?Sized>(&self, locator: &L) -> Option<Coordinates> {
        match tokio::time::timeout(self.options.location_timeout, locator.locate()).await {
            Ok(Ok(Some(coords))) => {
                tracing::debug!("Using location {}", coords);
                Some(coords)
            }
            Ok(Ok(None)) => {
                tracing::info!("Location access denied, searching without it");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("Location lookup failed: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Location lookup timed out after {:?}",
                    self.options.location_timeout
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FixedLocation;
    use crate::domain::model::RawResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct MockProvider {
        reply: Arc<Mutex<Option<Result<RawResponse>>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl MockProvider {
        fn replying(text: &str) -> Self {
            Self::with(Ok(RawResponse::new(text)))
        }

        fn with(reply: Result<RawResponse>) -> Self {
            Self {
                reply: Arc::new(Mutex::new(Some(reply))),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SearchProvider for MockProvider {
        async fn generate(&self, prompt: &str, _: &GenerationSettings) -> Result<RawResponse> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(DiscoveryError::EmptyResponse))
        }

        fn provenance(&self) -> &str {
            "mock"
        }
    }

    struct SlowLocation {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LocationProvider for SlowLocation {
        async fn locate(&self) -> Result<Option<Coordinates>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Some(Coordinates::new(0.0, 0.0)))
        }
    }

    #[tokio::test]
    async fn test_fenced_response_end_to_end() {
        let provider = MockProvider::replying(
            "Here you go:\n```json\n[{\"name\":\"Taco Spot\",\"cuisine\":\"Mexican\",\"rating\":4.5,\"address\":\"1 Main St\",\"priceLevel\":\"$$\"}]\n```",
        );
        let service = DiscoveryService::new(provider.clone());

        let report = service.discover_with_report("tacos", None).await;
        assert!(!report.is_failure());
        assert_eq!(report.venues.len(), 1);
        assert_eq!(report.venues[0].name, "Taco Spot");
        assert_eq!(report.venues[0].source, "mock");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_response_reports_empty() {
        let service = DiscoveryService::new(MockProvider::replying("  \n"));
        let report = service.discover_with_report("tacos", None).await;
        assert!(report.venues.is_empty());
        assert_eq!(report.failure, Some(FailureKind::EmptyResponse));
    }

    #[tokio::test]
    async fn test_provider_failure_is_absorbed() {
        let service = DiscoveryService::new(MockProvider::with(Err(
            DiscoveryError::TransportFailure {
                status: 503,
                body: Some("overloaded".to_string()),
            },
        )));
        let report = service.discover_with_report("tacos", None).await;
        assert!(report.venues.is_empty());
        assert_eq!(report.failure, Some(FailureKind::TransportFailure));
    }

    #[tokio::test]
    async fn test_empty_query_never_calls_provider() {
        let provider = MockProvider::replying("[]");
        let service = DiscoveryService::new(provider.clone());
        let report = service.discover_with_report("  ", None).await;
        assert_eq!(report.failure, Some(FailureKind::InvalidInput));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_results_capped_and_geofenced() {
        let body = serde_json::json!([
            {"name": "A", "latitude": 0.0, "longitude": 0.01},
            {"name": "B", "latitude": 0.0, "longitude": 0.02},
            {"name": "Far", "latitude": 0.0, "longitude": 2.0},
            {"name": "C", "latitude": 0.0, "longitude": 0.03}
        ])
        .to_string();
        let options = DiscoveryOptions {
            max_results: 2,
            ..DiscoveryOptions::default()
        };
        let service = DiscoveryService::with_options(MockProvider::replying(&body), options);

        let venues = service
            .discover("coffee", Some(Coordinates::new(0.0, 0.0)))
            .await;
        let names: Vec<&str> = venues.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_are_ignored() {
        let provider = MockProvider::replying(r#"[{"name":"A"}]"#);
        let service = DiscoveryService::new(provider.clone());
        let venues = service
            .discover("coffee", Some(Coordinates::new(f64::NAN, 0.0)))
            .await;
        assert_eq!(venues.len(), 1);
        assert!(provider.prompts.lock().unwrap()[0].contains("Infer the area"));
    }

    #[tokio::test]
    async fn test_location_timeout_proceeds_without_coordinates() {
        let provider = MockProvider::replying(r#"[{"name":"A"}]"#);
        let options = DiscoveryOptions {
            location_timeout: Duration::from_millis(50),
            ..DiscoveryOptions::default()
        };
        let service = DiscoveryService::with_options(provider.clone(), options);
        let locator = SlowLocation {
            calls: AtomicUsize::new(0),
        };

        let report = service.discover_with_location("coffee", &locator).await;
        assert_eq!(report.venues.len(), 1);
        assert_eq!(locator.calls.load(Ordering::SeqCst), 1);
        assert!(provider.prompts.lock().unwrap()[0].contains("Infer the area"));
    }

    #[tokio::test]
    async fn test_denied_location_proceeds_without_coordinates() {
        let provider = MockProvider::replying(r#"[{"name":"A"}]"#);
        let service = DiscoveryService::new(provider.clone());

        let report = service
            .discover_with_location("coffee", &FixedLocation::denied())
            .await;
        assert!(!report.is_failure());
        assert_eq!(report.venues.len(), 1);
        assert_eq!(provider.calls(), 1);
        assert!(provider.prompts.lock().unwrap()[0].contains("Infer the area"));
    }

    struct BrokenLocation;

    #[async_trait]
    impl LocationProvider for BrokenLocation {
        async fn locate(&self) -> Result<Option<Coordinates>> {
            Err(DiscoveryError::LocationUnavailable {
                message: "position unavailable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_failed_location_proceeds_without_coordinates() {
        let provider = MockProvider::replying(r#"[{"name":"A"}]"#);
        let service = DiscoveryService::new(provider.clone());

        let report = service.discover_with_location("coffee", &BrokenLocation).await;
        assert!(!report.is_failure());
        assert_eq!(report.venues.len(), 1);
        assert_eq!(provider.calls(), 1);
        assert!(provider.prompts.lock().unwrap()[0].contains("Infer the area"));
    }

    #[tokio::test]
    async fn test_invalid_options_rejected_before_provider_call() {
        for options in [
            DiscoveryOptions {
                max_results: 0,
                ..DiscoveryOptions::default()
            },
            DiscoveryOptions {
                geofence: Geofence::new(f64::NAN, Default::default()),
                ..DiscoveryOptions::default()
            },
        ] {
            let provider = MockProvider::replying(r#"[{"name":"A"}]"#);
            let service = DiscoveryService::with_options(provider.clone(), options);
            let report = service.discover_with_report("coffee", None).await;
            assert_eq!(report.failure, Some(FailureKind::InvalidInput));
            assert_eq!(provider.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_empty_query_skips_location_lookup() {
        let service = DiscoveryService::new(MockProvider::replying("[]"));
        let locator = SlowLocation {
            calls: AtomicUsize::new(0),
        };
        let report = service.discover_with_location("", &locator).await;
        assert_eq!(report.failure, Some(FailureKind::InvalidInput));
        assert_eq!(locator.calls.load(Ordering::SeqCst), 0);
    }
}
