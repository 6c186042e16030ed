//! Domain errors for the DaskCluster operator.

use thiserror::Error;

/// Errors returned by the orchestration platform port.
///
/// `NotFound` and `AlreadyExists` are split out because the convergence loop
/// absorbs them in specific places; everything else is retryable as a whole.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("{kind} {namespace}/{name} already exists")]
    AlreadyExists {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("Platform API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Platform transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlatformError {
    pub fn not_found(kind: &str, namespace: &str, name: &str) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn already_exists(kind: &str, namespace: &str, name: &str) -> Self {
        Self::AlreadyExists {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Errors that abort a reconciliation cycle.
///
/// No variant is fatal: the controller requeues the whole cycle on any of them.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Platform call failed: {0}")]
    Platform(#[from] PlatformError),

    #[error("{kind} {namespace}/{name} has no uid; cannot be used as an owner")]
    MissingUid {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("Object is missing {0}")]
    MissingObjectKey(&'static str),

    #[error("DaskCluster {namespace}/{name} name exceeds {max} characters; pod labels cannot carry it")]
    ClusterNameTooLong {
        namespace: String,
        name: String,
        max: usize,
    },
}

impl ReconcileError {
    /// Every reconcile failure is retried by requeueing the full cycle.
    pub const fn is_retryable(&self) -> bool {
        true
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Platform(e) if e.is_not_found())
    }
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
