use clap::Parser;
use venue_discovery::utils::logger::{self, LogFormat};
use venue_discovery::utils::validation::Validate;
use venue_discovery::{CliConfig, DiscoveryService, FixedLocation};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    let format = if config.log_json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(config.verbose, format);

    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        eprintln!("Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let settings = match config.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let provider = settings.build_provider()?;
    let service = DiscoveryService::with_options(provider, settings.discovery_options());
    let locator = FixedLocation::from_parts(config.lat, config.lng);

    let report = service.discover_with_location(&config.query, &locator).await;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(kind) = report.failure {
        eprintln!("Search failed ({:?}), no results", kind);
    } else if report.venues.is_empty() {
        println!("No matching restaurants found.");
    } else {
        for venue in &report.venues {
            println!(
                "{}  [{}]  {:.1}  {}  {}",
                venue.name, venue.cuisine, venue.rating, venue.price_level, venue.address
            );
            println!("    {}", venue.maps_uri);
        }
    }

    if report.is_failure() {
        std::process::exit(2);
    }
    Ok(())
}
