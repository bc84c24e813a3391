use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the dispatch core.
///
/// Geofence radii are deliberately absent: they are operational policy
/// constants (see [`crate::geofence::RadiusPolicy`]), not deployment
/// configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrewDispatchConfig {
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Location validation settings
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Enable structured tracing output
    pub tracing_enabled: bool,
    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Warn when a fix reports accuracy worse than this many meters.
    /// Advisory only; containment outcomes never depend on it.
    pub accuracy_warning_meters: f64,
}

impl Default for CrewDispatchConfig {
    fn default() -> Self {
        Self {
            observability: ObservabilityConfig {
                tracing_enabled: true,
                log_level: "info".to_string(),
            },
            validation: ValidationConfig {
                accuracy_warning_meters: 50.0,
            },
        }
    }
}

impl CrewDispatchConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (crew-dispatch.toml)
    /// 3. Environment variables (prefixed with CREW_DISPATCH_)
    pub fn load() -> Result<Self> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&CrewDispatchConfig::default())?);

        if Path::new("crew-dispatch.toml").exists() {
            builder = builder.add_source(File::with_name("crew-dispatch"));
        }

        builder = builder.add_source(
            Environment::with_prefix("CREW_DISPATCH")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<CrewDispatchConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = CrewDispatchConfig::load_env_file();
        CrewDispatchConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static CrewDispatchConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
