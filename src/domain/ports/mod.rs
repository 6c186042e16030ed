//! Port trait definitions (Hexagonal Architecture)
//!
//! - PlatformClient: object store operations against the orchestration platform
//!
//! The convergence loop is written against these traits so it can run against
//! the Kubernetes API in production and an in-memory platform in tests.

pub mod platform;

#[cfg(test)]
pub use platform::MockPlatformClient;
pub use platform::PlatformClient;
