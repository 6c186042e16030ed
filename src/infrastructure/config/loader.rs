use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Default configuration file, resolved relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dask-operator.yaml";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "DASK_OPERATOR_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_concurrent_reconciles: {0}. Must be between 1 and 64")]
    InvalidConcurrency(u16),

    #[error("Invalid resync_interval_secs: {0}. Must be at least 1")]
    InvalidResyncInterval(u64),

    #[error("Invalid error_requeue_secs: {0}. Must be at least 1")]
    InvalidErrorRequeue(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("scale_down.pending_phases cannot be empty")]
    EmptyPendingPhases,

    #[error("watch_namespace cannot be an empty string")]
    EmptyWatchNamespace,

    #[error("Phase {0} is listed as both pending and terminal")]
    OverlappingPhases(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. YAML file (`path`, or `dask-operator.yaml` in the working directory; optional)
    /// 3. Environment variables (`DASK_OPERATOR_*`, `__` separates nested keys)
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!(
                "Failed to load configuration (file: {})",
                file.display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, ignoring the environment
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Validate watch scope
        if config.watch_namespace.as_deref() == Some("") {
            return Err(ConfigError::EmptyWatchNamespace);
        }

        // Validate controller config
        let controller = &config.controller;
        if controller.max_concurrent_reconciles == 0 || controller.max_concurrent_reconciles > 64 {
            return Err(ConfigError::InvalidConcurrency(
                controller.max_concurrent_reconciles,
            ));
        }

        if controller.resync_interval_secs == 0 {
            return Err(ConfigError::InvalidResyncInterval(
                controller.resync_interval_secs,
            ));
        }

        if controller.error_requeue_secs == 0 {
            return Err(ConfigError::InvalidErrorRequeue(controller.error_requeue_secs));
        }

        // Validate scale-down phases
        let scale_down = &config.scale_down;
        if scale_down
            .pending_phases
            .iter()
            .all(|phase| phase.trim().is_empty())
        {
            return Err(ConfigError::EmptyPendingPhases);
        }

        if let Some(phase) = scale_down.pending_phases.iter().find(|pending| {
            scale_down
                .terminal_phases
                .iter()
                .any(|terminal| terminal.eq_ignore_ascii_case(pending))
        }) {
            return Err(ConfigError::OverlappingPhases(phase.clone()));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
