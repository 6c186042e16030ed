//! Implementation of the `dask-operator config` command.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Render a configuration as YAML, or JSON when `json_mode` is set.
pub fn render(config: &Config, json_mode: bool) -> Result<String> {
    if json_mode {
        serde_json::to_string_pretty(config).context("Failed to serialize configuration")
    } else {
        serde_yaml::to_string(config).context("Failed to serialize configuration")
    }
}

pub fn execute(_args: ConfigArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    println!("{}", render(&config, json_mode)?);
    Ok(())
}
