use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;

#[cfg(test)]
use mockall::automock;

use crate::domain::error::PlatformError;
use crate::domain::models::{ClusterKey, DaskCluster};

/// Port for the orchestration platform's object store.
///
/// Implementations hold no mutable state of their own; every call goes to the
/// platform. Ownership is expressed through owner references on the objects
/// passed to `create_pod` and garbage-collected by the platform, never here.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Fetch a cluster object, `None` if it does not exist
    async fn get_cluster(&self, key: &ClusterKey) -> Result<Option<DaskCluster>, PlatformError>;

    /// Fetch a pod by name, `None` if it does not exist
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>, PlatformError>;

    /// List pods in a namespace matching an equality label selector (`k=v,k2=v2`)
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>, PlatformError>;

    /// Create a pod and return the stored object (with uid assigned)
    ///
    /// Returns `PlatformError::AlreadyExists` when the name is taken.
    async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, PlatformError>;

    /// Delete a pod by name
    ///
    /// Returns `PlatformError::NotFound` when the pod is already gone.
    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), PlatformError>;
}
