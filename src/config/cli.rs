use super::toml_config::{ProviderKind, TomlConfig};
use crate::core::geofence::MissingPositionPolicy;
use crate::utils::error::{DiscoveryError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_finite, validate_range, Validate,
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "venue-discovery")]
#[command(about = "Find restaurants matching a free-text query")]
pub struct CliConfig {
    /// What to look for, e.g. "ramen" or "brunch in Da'an"
    pub query: String,

    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    #[arg(long, help = "Geofence radius in km (default 10)")]
    pub radius_km: Option<f64>,

    #[arg(long, help = "Language tag for the results, e.g. zh-TW")]
    pub language: Option<String>,

    #[arg(long, help = "TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long, help = "Keep results without coordinates when a location is set")]
    pub keep_unlocated: bool,

    #[arg(long, help = "Print results as JSON")]
    pub json: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Config file (if any) with command-line overrides applied on top.
    pub fn load_settings(&self) -> Result<TomlConfig> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(kind) = self.provider {
            settings.provider.kind = kind;
        }
        if let Some(model) = &self.model {
            settings.provider.model = Some(model.clone());
        }
        if let Some(radius_km) = self.radius_km {
            settings.discovery.radius_km = Some(radius_km);
        }
        if let Some(language) = &self.language {
            settings.discovery.language = Some(language.clone());
        }
        if self.keep_unlocated {
            settings.discovery.missing_position = Some(MissingPositionPolicy::Keep);
        }

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("query", &self.query).map_err(|_| {
            DiscoveryError::InvalidInput {
                message: "query is empty".to_string(),
            }
        })?;
        if let Some(lat) = self.lat {
            validate_range("lat", lat, -90.0, 90.0)?;
        }
        if let Some(lng) = self.lng {
            validate_range("lng", lng, -180.0, 180.0)?;
        }
        if let Some(radius_km) = self.radius_km {
            validate_positive_finite("radius_km", radius_km)?;
        }
        Ok(())
    }
}
