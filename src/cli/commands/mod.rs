//! CLI command implementations.

pub mod config;
pub mod crd;
pub mod run;
