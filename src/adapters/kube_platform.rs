//! Kubernetes-backed implementation of the platform port.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::Client;
use tracing::trace;

use crate::domain::error::PlatformError;
use crate::domain::models::{ClusterKey, DaskCluster};
use crate::domain::ports::PlatformClient;

/// Real platform client wrapping a `kube::Client`.
///
/// Cloning the underlying client is cheap; a fresh `Api` handle is built per
/// call so one instance serves every namespace.
#[derive(Clone)]
pub struct KubePlatform {
    client: Client,
}

impl KubePlatform {
    /// Create a new KubePlatform wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using in-cluster configuration or the local kubeconfig.
    pub async fn try_default() -> Result<Self, PlatformError> {
        let client = Client::try_default()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Translate a kube error into the port's taxonomy by HTTP status.
fn map_kube_error(kind: &str, namespace: &str, name: &str, err: kube::Error) -> PlatformError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => PlatformError::not_found(kind, namespace, name),
        kube::Error::Api(ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
            PlatformError::already_exists(kind, namespace, name)
        }
        kube::Error::Api(ae) => PlatformError::Api {
            code: ae.code,
            message: ae.message,
        },
        kube::Error::SerdeError(e) => PlatformError::Serialization(e),
        other => PlatformError::Transport(other.to_string()),
    }
}

#[async_trait]
impl PlatformClient for KubePlatform {
    async fn get_cluster(&self, key: &ClusterKey) -> Result<Option<DaskCluster>, PlatformError> {
        let api: Api<DaskCluster> = Api::namespaced(self.client.clone(), &key.namespace);
        api.get_opt(&key.name)
            .await
            .map_err(|e| map_kube_error("DaskCluster", &key.namespace, &key.name, e))
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>, PlatformError> {
        self.pods(namespace)
            .get_opt(name)
            .await
            .map_err(|e| map_kube_error("Pod", namespace, name, e))
    }

    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>, PlatformError> {
        let params = ListParams::default().labels(selector);
        let list = self
            .pods(namespace)
            .list(&params)
            .await
            .map_err(|e| map_kube_error("Pod", namespace, selector, e))?;
        trace!(namespace, selector, count = list.items.len(), "listed pods");
        Ok(list.items)
    }

    async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, PlatformError> {
        let name = pod.metadata.name.clone().unwrap_or_default();
        self.pods(namespace)
            .create(&PostParams::default(), pod)
            .await
            .map_err(|e| map_kube_error("Pod", namespace, &name, e))
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), PlatformError> {
        // Background propagation lets the garbage collector remove dependents.
        self.pods(namespace)
            .delete(name, &DeleteParams::background())
            .await
            .map(|_| ())
            .map_err(|e| map_kube_error("Pod", namespace, name, e))
    }
}
