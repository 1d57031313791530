use crate::adapters::{
    EnvCredentialSource, GeminiConfig, GeminiProvider, OpenAiCompatibleProvider, OpenAiConfig,
    StaticCredential,
};
use crate::core::discovery::{DiscoveryOptions, DEFAULT_MAX_RESULTS};
use crate::core::geofence::{Geofence, MissingPositionPolicy, DEFAULT_RADIUS_KM};
use crate::domain::model::GenerationSettings;
use crate::domain::ports::{CredentialSource, SearchProvider};
use crate::utils::error::{DiscoveryError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    #[serde(alias = "openai-compatible")]
    #[cfg_attr(feature = "cli", value(name = "openai"))]
    OpenAi,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub provider: ProviderSection,
    pub generation: GenerationSection,
    pub discovery: DiscoverySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub kind: ProviderKind,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Literal key, usually `${SOME_VAR}`. Left unresolved it falls back to `api_key_env`.
    pub api_key: Option<String>,
    pub api_key_env: Option<Vec<String>>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSection {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub grounding: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub max_results: Option<usize>,
    pub radius_km: Option<f64>,
    pub language: Option<String>,
    pub missing_position: Option<MissingPositionPolicy>,
    pub location_timeout_ms: Option<u64>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DiscoveryError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DiscoveryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DiscoveryError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        let defaults = GenerationSettings::default();
        let section = &self.generation;
        GenerationSettings {
            temperature: section.temperature.unwrap_or(defaults.temperature),
            top_p: section.top_p.unwrap_or(defaults.top_p),
            max_output_tokens: section.max_output_tokens.unwrap_or(defaults.max_output_tokens),
            grounding: section
                .grounding
                .unwrap_or(self.provider.kind == ProviderKind::Gemini),
        }
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        let defaults = DiscoveryOptions::default();
        let section = &self.discovery;
        DiscoveryOptions {
            max_results: section.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            geofence: Geofence::new(
                section.radius_km.unwrap_or(DEFAULT_RADIUS_KM),
                section.missing_position.unwrap_or_default(),
            ),
            language: section.language.clone(),
            generation: self.generation_settings(),
            location_timeout: section
                .location_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.location_timeout),
        }
    }

    fn credentials(&self) -> Box<dyn CredentialSource> {
        let literal = self
            .provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !(key.starts_with("${") && key.ends_with('}')));
        if let Some(key) = literal {
            return Box::new(StaticCredential::new(key));
        }

        match (&self.provider.api_key_env, self.provider.kind) {
            (Some(vars), _) => Box::new(EnvCredentialSource::new(vars.iter().cloned())),
            (None, ProviderKind::Gemini) => Box::new(EnvCredentialSource::gemini()),
            (None, ProviderKind::OpenAi) => Box::new(EnvCredentialSource::openai()),
        }
    }

    /// Builds the configured provider. Credentials are looked up per call, not here.
    pub fn build_provider(&self) -> Result<Box<dyn SearchProvider>> {
        let section = &self.provider;
        let credentials = self.credentials();

        let provider: Box<dyn SearchProvider> = match section.kind {
            ProviderKind::Gemini => {
                let defaults = GeminiConfig::default();
                Box::new(GeminiProvider::new(
                    GeminiConfig {
                        base_url: section.base_url.clone().unwrap_or(defaults.base_url),
                        model: section.model.clone().unwrap_or(defaults.model),
                        timeout: section
                            .timeout_seconds
                            .map(Duration::from_secs)
                            .unwrap_or(defaults.timeout),
                    },
                    credentials,
                )?)
            }
            ProviderKind::OpenAi => {
                let defaults = OpenAiConfig::default();
                Box::new(OpenAiCompatibleProvider::new(
                    OpenAiConfig {
                        base_url: section.base_url.clone().unwrap_or(defaults.base_url),
                        model: section.model.clone().unwrap_or(defaults.model),
                        timeout: section
                            .timeout_seconds
                            .map(Duration::from_secs)
                            .unwrap_or(defaults.timeout),
                    },
                    credentials,
                )?)
            }
        };
        Ok(provider)
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(base_url) = &self.provider.base_url {
            validate_url("provider.base_url", base_url)?;
        }
        if let Some(model) = &self.provider.model {
            validate_non_empty_string("provider.model", model)?;
        }
        if let Some(timeout) = self.provider.timeout_seconds {
            validate_range("provider.timeout_seconds", timeout, 1, 600)?;
        }

        self.discovery_options().validate()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
