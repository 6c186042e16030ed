//! Implementation of the `dask-operator crd` command.

use anyhow::{Context, Result};
use clap::Args;
use kube::CustomResourceExt;

use crate::domain::models::DaskCluster;

#[derive(Args, Debug)]
pub struct CrdArgs {}

/// Render the CRD as YAML, or JSON when `json_mode` is set.
pub fn render(json_mode: bool) -> Result<String> {
    let crd = DaskCluster::crd();
    if json_mode {
        serde_json::to_string_pretty(&crd).context("Failed to serialize CRD as JSON")
    } else {
        serde_yaml::to_string(&crd).context("Failed to serialize CRD as YAML")
    }
}

pub fn execute(_args: CrdArgs, json_mode: bool) -> Result<()> {
    println!("{}", render(json_mode)?);
    Ok(())
}
