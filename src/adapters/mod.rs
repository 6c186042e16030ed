//! Adapters implementing the platform port.
//!
//! - `kube_platform`: the Kubernetes API via kube-rs
//! - `memory_platform`: an in-memory object store for tests and simulations

pub mod kube_platform;
pub mod memory_platform;

pub use kube_platform::KubePlatform;
pub use memory_platform::{CallCounts, InMemoryPlatform, Operation};
