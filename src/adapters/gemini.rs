use crate::domain::model::{GenerationSettings, RawResponse};
use crate::domain::ports::{CredentialSource, SearchProvider};
use crate::utils::error::{DiscoveryError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseCandidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiProvider<C: CredentialSource> {
    config: GeminiConfig,
    credentials: C,
    client: Client,
}

impl<C: CredentialSource> GeminiProvider<C> {
    pub fn new(config: GeminiConfig, credentials: C) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            credentials,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl<C: CredentialSource> SearchProvider for GeminiProvider<C> {
    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<RawResponse> {
        let api_key = self
            .credentials
            .resolve()
            .ok_or(DiscoveryError::MissingCredential)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                top_p: settings.top_p,
                max_output_tokens: settings.max_output_tokens,
            },
            tools: if settings.grounding {
                vec![serde_json::json!({ "google_search": {} })]
            } else {
                Vec::new()
            },
        };

        let url = self.endpoint();
        tracing::debug!("Calling Gemini model {} at {}", self.config.model, url);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Gemini response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.trim().is_empty());
            return Err(DiscoveryError::TransportFailure {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Unreadable Gemini envelope: {}", e);
                return Err(DiscoveryError::EmptyResponse);
            }
        };

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            return Err(DiscoveryError::EmptyResponse);
        };
        if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
            tracing::warn!(
                "Gemini stopped at the {} token cap, output may be truncated",
                settings.max_output_tokens
            );
        }

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(DiscoveryError::EmptyResponse);
        }
        Ok(RawResponse::new(text))
    }

    fn provenance(&self) -> &str {
        "google"
    }
}
