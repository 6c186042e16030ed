//! The `DaskCluster` custom resource and its identity.

use std::fmt;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::error::ReconcileError;

/// Desired state of a Dask cluster: one scheduler pod plus an elastic pool of workers.
///
/// The operator only reads this object; it never writes it back.
/// The cluster name is copied into pod label values, so it must be at most
/// 57 characters long.
#[derive(CustomResource, Serialize, Deserialize, Debug, PartialEq, Clone, JsonSchema)]
#[kube(
    group = "gateway.dask.org",
    version = "v1alpha1",
    kind = "DaskCluster",
    plural = "daskclusters",
    shortname = "dc",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct DaskClusterSpec {
    /// When false the scheduler (and through it every worker) is torn down.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Scheduler pod definition.
    pub scheduler: SchedulerSpec,

    /// Worker pool definition.
    pub worker: WorkerSpec,
}

/// Scheduler pod template.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSpec {
    pub template: PodTemplateSpec,
}

/// Worker pod template and desired replica count.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSpec {
    #[serde(default)]
    pub replicas: u32,

    pub template: PodTemplateSpec,
}

const fn default_active() -> bool {
    true
}

/// Namespace + name of a `DaskCluster`; the unit of reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterKey {
    pub namespace: String,
    pub name: String,
}

impl ClusterKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Identity of an observed cluster object.
    pub fn from_cluster(cluster: &DaskCluster) -> Result<Self, ReconcileError> {
        let namespace = cluster
            .namespace()
            .ok_or(ReconcileError::MissingObjectKey(".metadata.namespace"))?;
        Ok(Self::new(namespace, cluster.name_any()))
    }
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
