//! dask-operator - DaskCluster reconciliation for Kubernetes
//!
//! Keeps each `DaskCluster` resource converged to one scheduler pod plus the
//! declared number of worker pods, correcting drift caused by external actors.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Cluster resource, pod construction, platform port
//! - **Service Layer** (`services`): The convergence loop
//! - **Adapters** (`adapters`): Kubernetes and in-memory platform implementations
//! - **Application Layer** (`application`): Controller runtime wiring
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dask_operator::adapters::InMemoryPlatform;
//! use dask_operator::domain::models::ClusterKey;
//! use dask_operator::services::{ConvergenceLoop, PendingPredicate};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let platform = Arc::new(InMemoryPlatform::new());
//!     let convergence = ConvergenceLoop::new(platform, PendingPredicate::default());
//!     let outcome = convergence.reconcile(&ClusterKey::new("default", "etl")).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::{InMemoryPlatform, KubePlatform};
pub use domain::models::{ClusterKey, Config, DaskCluster, DaskClusterSpec};
pub use domain::ports::PlatformClient;
pub use domain::{PlatformError, ReconcileError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ConvergenceLoop, PendingPredicate, ReconcileOutcome};
