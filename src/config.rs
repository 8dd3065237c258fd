//! Configuration management for `presence-guard`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PresenceGuardError;
use crate::screening::ScreeningPolicy;
use crate::validator::ValidatorConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `PRESENCE_GUARD_VALIDATOR__MAX_SPREAD_METERS`
pub const ENV_PREFIX: &str = "PRESENCE_GUARD";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresenceGuardConfig {
    /// Validator thresholds
    #[serde(default)]
    pub validator: ValidatorConfig,
    /// Sample collection settings
    #[serde(default)]
    pub collection: CollectionConfig,
    /// Advisory screening thresholds
    #[serde(default)]
    pub screening: ScreeningPolicy,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Sample collection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// How long the collector waits for enough samples
    #[serde(default = "default_collection_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_collection_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_collection_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CollectionConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}

impl PresenceGuardConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// Load configuration, reading overrides from `env` instead of the process
    /// environment when it is given
    pub fn load_with_env(
        config_path: Option<PathBuf>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PresenceGuardConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("presence-guard").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.collection.timeout_seconds == 0 {
            self.collection.timeout_seconds = default_collection_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_validator()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validator thresholds must satisfy the validator's own preconditions
    pub fn validate_validator(&self) -> Result<()> {
        self.validator
            .validate()
            .with_context(|| "Invalid validator section")?;

        if self.validator.required_samples > 50 {
            return Err(PresenceGuardError::config(
                "Required samples cannot exceed 50"
            ).into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.collection.timeout_seconds > 600 {
            return Err(PresenceGuardError::config(
                "Collection timeout cannot exceed 600 seconds"
            ).into());
        }

        let screening = &self.screening;
        let thresholds = [
            ("accuracy_cap_meters", screening.accuracy_cap_meters),
            ("max_jump_meters", screening.max_jump_meters),
            ("max_speed_mps", screening.max_speed_mps),
            ("max_anchor_spread_meters", screening.max_anchor_spread_meters),
            ("max_relocation_speed_mps", screening.max_relocation_speed_mps),
            ("critical_relocation_speed_mps", screening.critical_relocation_speed_mps),
            ("spoof_tolerance_degrees", screening.spoof_tolerance_degrees),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(PresenceGuardError::config(
                    format!("Screening {name} must be a non-negative number")
                ).into());
            }
        }

        if screening.critical_relocation_speed_mps < screening.max_relocation_speed_mps {
            return Err(PresenceGuardError::config(
                "Critical relocation speed cannot be below the relocation speed limit"
            ).into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PresenceGuardError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PresenceGuardError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        Ok(())
    }

    /// Write this configuration as TOML, creating the parent directory if needed
    pub fn write_to(&self, path: &Path) -> crate::Result<()> {
        let body = toml::to_string_pretty(self)
            .map_err(|e| PresenceGuardError::config(format!("Failed to encode configuration: {e}")))?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, body)?;
        Ok(())
    }
}
