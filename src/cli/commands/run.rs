//! Implementation of the `dask-operator run` command.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::application;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only watch this namespace (overrides configuration)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Maximum concurrent reconciliations (overrides configuration)
    #[arg(long)]
    pub concurrency: Option<u16>,
}

pub async fn execute(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = ConfigLoader::load(config_path)?;
    if let Some(namespace) = args.namespace {
        config.watch_namespace = Some(namespace);
    }
    if let Some(concurrency) = args.concurrency {
        config.controller.max_concurrent_reconciles = concurrency;
    }
    ConfigLoader::validate(&config)?;

    LoggerImpl::init(&config.logging)?;
    application::run(config).await
}
