use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("No API credential could be resolved")]
    MissingCredential,

    #[error("Search service returned HTTP {status}")]
    TransportFailure { status: u16, body: Option<String> },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search service returned an empty response")]
    EmptyResponse,

    #[error("No JSON array found in response")]
    NoArrayFound,

    #[error("Response was truncated before any complete record")]
    UnsalvageableTruncation,

    #[error("Malformed JSON in response: {message}")]
    MalformedJson { message: String, raw: String },

    #[error("Location unavailable: {message}")]
    LocationUnavailable { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// Copyable failure tag a caller can keep next to an empty result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    MissingCredential,
    TransportFailure,
    EmptyResponse,
    NoArrayFound,
    UnsalvageableTruncation,
    MalformedJson,
    Internal,
}

impl DiscoveryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DiscoveryError::InvalidInput { .. } => FailureKind::InvalidInput,
            DiscoveryError::MissingCredential => FailureKind::MissingCredential,
            DiscoveryError::TransportFailure { .. } | DiscoveryError::Http(_) => {
                FailureKind::TransportFailure
            }
            DiscoveryError::EmptyResponse => FailureKind::EmptyResponse,
            DiscoveryError::NoArrayFound => FailureKind::NoArrayFound,
            DiscoveryError::UnsalvageableTruncation => FailureKind::UnsalvageableTruncation,
            DiscoveryError::MalformedJson { .. } => FailureKind::MalformedJson,
            DiscoveryError::InvalidConfigValueError { .. } | DiscoveryError::ConfigError { .. } => {
                FailureKind::InvalidInput
            }
            DiscoveryError::LocationUnavailable { .. }
            | DiscoveryError::IoError(_)
            | DiscoveryError::SerializationError(_) => FailureKind::Internal,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            DiscoveryError::InvalidInput { .. } => "Enter a non-empty search term",
            DiscoveryError::MissingCredential => {
                "Set GEMINI_API_KEY (or the variable named in the config file)"
            }
            DiscoveryError::TransportFailure { status, .. } if *status == 401 || *status == 403 => {
                "Check that the API key is valid for this provider"
            }
            DiscoveryError::TransportFailure { status, .. } if *status == 429 => {
                "Rate limited by the provider, try again later"
            }
            DiscoveryError::TransportFailure { .. } | DiscoveryError::Http(_) => {
                "Check network connectivity and the provider base URL"
            }
            DiscoveryError::EmptyResponse
            | DiscoveryError::NoArrayFound
            | DiscoveryError::UnsalvageableTruncation
            | DiscoveryError::MalformedJson { .. } => {
                "The model answered in an unexpected format, retry the search"
            }
            DiscoveryError::LocationUnavailable { .. } => "Search without location or pass --lat/--lng",
            DiscoveryError::IoError(_) => "Check file paths and permissions",
            DiscoveryError::SerializationError(_) => "Report this as a bug",
            DiscoveryError::ConfigError { .. } | DiscoveryError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and rerun"
            }
        }
    }

    /// Raw upstream text worth logging, if this failure carries any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            DiscoveryError::TransportFailure { body, .. } => body.as_deref(),
            DiscoveryError::MalformedJson { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            DiscoveryError::TransportFailure {
                status: 500,
                body: None
            }
            .kind(),
            FailureKind::TransportFailure
        );
        assert_eq!(DiscoveryError::EmptyResponse.kind(), FailureKind::EmptyResponse);
        assert_eq!(
            DiscoveryError::InvalidInput {
                message: "empty".to_string()
            }
            .kind(),
            FailureKind::InvalidInput
        );
    }

    #[test]
    fn test_diagnostic_exposes_raw_text() {
        let err = DiscoveryError::MalformedJson {
            message: "trailing comma".to_string(),
            raw: "[{},]".to_string(),
        };
        assert_eq!(err.diagnostic(), Some("[{},]"));
        assert!(DiscoveryError::NoArrayFound.diagnostic().is_none());
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::UnsalvageableTruncation).unwrap();
        assert_eq!(json, "\"unsalvageable_truncation\"");
    }
}
