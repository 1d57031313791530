pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{
    EnvCredentialSource, FixedLocation, GeminiConfig, GeminiProvider, OpenAiCompatibleProvider,
    OpenAiConfig, StaticCredential,
};
pub use crate::config::toml_config::{ProviderKind, TomlConfig};
pub use crate::core::discovery::{DiscoveryOptions, DiscoveryReport, DiscoveryService};
pub use crate::core::geofence::{Geofence, MissingPositionPolicy};
pub use crate::domain::model::{Coordinates, GenerationSettings, PriceLevel, Venue};
pub use crate::utils::error::{DiscoveryError, FailureKind, Result};
