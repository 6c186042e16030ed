//! Domain layer for the DaskCluster operator
//!
//! This module contains the cluster resource model, pod construction and the
//! platform port the convergence loop is written against.

pub mod error;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use error::{PlatformError, ReconcileError, ReconcileResult};
