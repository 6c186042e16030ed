//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::{config::ConfigArgs, crd::CrdArgs, run::RunArgs};

#[derive(Parser, Debug)]
#[command(name = "dask-operator")]
#[command(about = "Kubernetes operator for DaskCluster resources", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./dask-operator.yaml when present)
    #[arg(short, long, global = true, env = "DASK_OPERATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the controller against the current Kubernetes context
    Run(RunArgs),

    /// Print the DaskCluster CustomResourceDefinition
    Crd(CrdArgs),

    /// Print the effective configuration after merging file and environment
    Config(ConfigArgs),
}
