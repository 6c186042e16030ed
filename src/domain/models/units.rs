//! Construction of the scheduler and worker pods owned by a `DaskCluster`.
//!
//! Both builders are pure: they derive a pod from the cluster object (and,
//! for workers, the observed scheduler pod) without talking to the platform.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Pod, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};
use uuid::Uuid;

use super::cluster::DaskCluster;
use crate::domain::error::ReconcileError;

/// Label carrying the owning cluster's name on every pod the operator creates.
pub const CLUSTER_LABEL: &str = "gateway.dask.org/cluster";

/// Label distinguishing scheduler from worker pods.
pub const ROLE_LABEL: &str = "gateway.dask.org/role";

/// Worker membership label key; its value is `<cluster>worker`.
pub const MEMBERSHIP_LABEL: &str = "app";

/// Longest value Kubernetes accepts for a label.
pub const MAX_LABEL_VALUE_LEN: usize = 63;

/// Longest cluster name whose membership label value (`<cluster>worker`) still fits.
pub const MAX_CLUSTER_NAME_LEN: usize = MAX_LABEL_VALUE_LEN - "worker".len();

const SUFFIX_LEN: usize = 6;

/// Role of a pod within a Dask cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRole {
    Scheduler,
    Worker,
}

impl UnitRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduler => "scheduler",
            Self::Worker => "worker",
        }
    }
}

/// Deterministic scheduler pod name for a cluster.
pub fn scheduler_name(cluster_name: &str) -> String {
    format!("{cluster_name}-scheduler")
}

/// Value of the worker membership label for a cluster.
pub fn membership_value(cluster_name: &str) -> String {
    format!("{cluster_name}worker")
}

/// Label selector matching every worker that counts toward the replica total.
pub fn worker_selector(cluster_name: &str) -> String {
    format!("{MEMBERSHIP_LABEL}={}", membership_value(cluster_name))
}

/// Fresh worker pod name. The suffix only avoids collisions; it is not identity.
pub fn worker_name(cluster_name: &str) -> String {
    format!("{cluster_name}-worker-{}", unique_suffix())
}

fn unique_suffix() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[..SUFFIX_LEN].to_string()
}

/// Name and namespace of `cluster`, rejecting names too long to use as label values.
fn cluster_identity(cluster: &DaskCluster) -> Result<(String, String), ReconcileError> {
    let name = cluster.name_any();
    let namespace = cluster
        .namespace()
        .ok_or(ReconcileError::MissingObjectKey(".metadata.namespace"))?;
    if name.len() > MAX_CLUSTER_NAME_LEN {
        return Err(ReconcileError::ClusterNameTooLong {
            namespace,
            name,
            max: MAX_CLUSTER_NAME_LEN,
        });
    }
    Ok((name, namespace))
}

/// Build the scheduler pod for `cluster`, controlled by the cluster object.
pub fn new_scheduler_pod(cluster: &DaskCluster) -> Result<Pod, ReconcileError> {
    let (cluster_name, namespace) = cluster_identity(cluster)?;
    let owner = cluster
        .controller_owner_ref(&())
        .ok_or_else(|| ReconcileError::MissingUid {
            kind: "DaskCluster".to_string(),
            namespace: namespace.clone(),
            name: cluster_name.clone(),
        })?;

    let mut labels = BTreeMap::new();
    labels.insert(CLUSTER_LABEL.to_string(), cluster_name.clone());
    labels.insert(ROLE_LABEL.to_string(), UnitRole::Scheduler.as_str().to_string());

    Ok(pod_from_template(
        &cluster.spec.scheduler.template,
        scheduler_name(&cluster_name),
        namespace,
        labels,
        owner,
    ))
}

/// Build one worker pod for `cluster`, controlled by the observed `scheduler` pod.
pub fn new_worker_pod(cluster: &DaskCluster, scheduler: &Pod) -> Result<Pod, ReconcileError> {
    let (cluster_name, namespace) = cluster_identity(cluster)?;
    let owner = owner_reference(scheduler, &namespace)?;

    let mut labels = BTreeMap::new();
    labels.insert(MEMBERSHIP_LABEL.to_string(), membership_value(&cluster_name));
    labels.insert(CLUSTER_LABEL.to_string(), cluster_name.clone());
    labels.insert(ROLE_LABEL.to_string(), UnitRole::Worker.as_str().to_string());

    Ok(pod_from_template(
        &cluster.spec.worker.template,
        worker_name(&cluster_name),
        namespace,
        labels,
        owner,
    ))
}

/// Controller reference to an observed pod, blocking its deletion until dependents are gone.
fn owner_reference(pod: &Pod, namespace: &str) -> Result<OwnerReference, ReconcileError> {
    let mut owner = pod
        .controller_owner_ref(&())
        .ok_or_else(|| ReconcileError::MissingUid {
            kind: "Pod".to_string(),
            namespace: namespace.to_string(),
            name: pod.name_any(),
        })?;
    owner.block_owner_deletion = Some(true);
    Ok(owner)
}

fn pod_from_template(
    template: &PodTemplateSpec,
    name: String,
    namespace: String,
    labels: BTreeMap<String, String>,
    owner: OwnerReference,
) -> Pod {
    let template_meta = template.metadata.clone().unwrap_or_default();

    // Operator labels win over template labels so selectors stay stable.
    let mut merged = template_meta.labels.unwrap_or_default();
    merged.extend(labels);

    Pod {
        metadata: ObjectMeta {
            name: Some(name),
            namespace: Some(namespace),
            labels: Some(merged),
            annotations: template_meta.annotations,
            owner_references: Some(vec![owner]),
            ..Default::default()
        },
        spec: template.spec.clone(),
        status: None,
    }
}
