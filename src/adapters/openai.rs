use crate::domain::model::{GenerationSettings, RawResponse};
use crate::domain::ports::{CredentialSource, SearchProvider};
use crate::utils::error::{DiscoveryError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Any server speaking the `/v1/chat/completions` dialect.
pub struct OpenAiCompatibleProvider<C: CredentialSource> {
    config: OpenAiConfig,
    credentials: C,
    client: Client,
}

impl<C: CredentialSource> OpenAiCompatibleProvider<C> {
    pub fn new(config: OpenAiConfig, credentials: C) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            credentials,
            client,
        })
    }
}

#[async_trait]
impl<C: CredentialSource> SearchProvider for OpenAiCompatibleProvider<C> {
    async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<RawResponse> {
        let api_key = self
            .credentials
            .resolve()
            .ok_or(DiscoveryError::MissingCredential)?;

        if settings.grounding {
            tracing::debug!("Search grounding is not available on chat completions, ignoring");
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens: settings.max_output_tokens,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        tracing::debug!("Calling chat model {} at {}", self.config.model, url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.trim().is_empty());
            return Err(DiscoveryError::TransportFailure {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Unreadable chat completion envelope: {}", e);
                return Err(DiscoveryError::EmptyResponse);
            }
        };

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(DiscoveryError::EmptyResponse)?;
        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!("Chat completion hit max_tokens, output may be truncated");
        }

        match choice.message.and_then(|m| m.content) {
            Some(text) if !text.trim().is_empty() => Ok(RawResponse::new(text)),
            _ => Err(DiscoveryError::EmptyResponse),
        }
    }

    fn provenance(&self) -> &str {
        "openai"
    }
}
