//! In-memory platform for testing and simulation.
//!
//! Behaves like a minimal object store: assigns uids on create, reports new
//! pods as `Pending`, and garbage-collects dependents through owner references
//! when an owner is deleted. Calls are counted and failures can be injected
//! per operation so tests can assert exactly what a cycle did.

use std::collections::{BTreeMap, HashMap, VecDeque};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Pod, PodStatus};
use kube::ResourceExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::error::PlatformError;
use crate::domain::models::{ClusterKey, DaskCluster};
use crate::domain::ports::PlatformClient;

type ObjectKey = (String, String);

/// Platform operations that can be counted or made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetCluster,
    GetPod,
    ListPods,
    CreatePod,
    DeletePod,
}

/// Number of port calls served, by operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_cluster: usize,
    pub get_pod: usize,
    pub list_pods: usize,
    pub create_pod: usize,
    pub delete_pod: usize,
}

impl CallCounts {
    /// Create and delete calls combined.
    pub const fn writes(&self) -> usize {
        self.create_pod + self.delete_pod
    }

    /// Every call combined.
    pub const fn total(&self) -> usize {
        self.get_cluster + self.get_pod + self.list_pods + self.writes()
    }

    fn record(&mut self, op: Operation) {
        match op {
            Operation::GetCluster => self.get_cluster += 1,
            Operation::GetPod => self.get_pod += 1,
            Operation::ListPods => self.list_pods += 1,
            Operation::CreatePod => self.create_pod += 1,
            Operation::DeletePod => self.delete_pod += 1,
        }
    }
}

#[derive(Default)]
struct State {
    clusters: BTreeMap<ObjectKey, DaskCluster>,
    pods: BTreeMap<ObjectKey, Pod>,
    calls: CallCounts,
    failures: HashMap<Operation, VecDeque<Option<PlatformError>>>,
}

impl State {
    fn begin(&mut self, op: Operation) -> Result<(), PlatformError> {
        self.calls.record(op);
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(Some(err)) => Err(err),
            _ => Ok(()),
        }
    }

    /// Remove every pod owned (transitively) by `uid`.
    fn collect_garbage(&mut self, uid: &str) {
        let mut owners = vec![uid.to_string()];
        while let Some(owner) = owners.pop() {
            let dependents: Vec<ObjectKey> = self
                .pods
                .iter()
                .filter(|(_, pod)| {
                    pod.owner_references()
                        .iter()
                        .any(|reference| reference.uid == owner)
                })
                .map(|(key, _)| key.clone())
                .collect();

            for key in dependents {
                if let Some(pod) = self.pods.remove(&key) {
                    owners.extend(pod.metadata.uid);
                }
            }
        }
    }

    fn remove_pod(&mut self, namespace: &str, name: &str) -> Option<Pod> {
        let pod = self.pods.remove(&(namespace.to_string(), name.to_string()))?;
        if let Some(uid) = pod.metadata.uid.as_deref() {
            self.collect_garbage(uid);
        }
        Some(pod)
    }
}

/// Whether `labels` satisfy an equality selector such as `app=x,tier=y`.
///
/// A bare key (`app`) only requires the label to be present.
pub fn selector_matches(selector: &str, labels: &BTreeMap<String, String>) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .all(|term| {
            if let Some((key, value)) = term.split_once("!=") {
                return labels.get(key.trim()).map(String::as_str) != Some(value.trim());
            }
            match term.split_once("==").or_else(|| term.split_once('=')) {
                Some((key, value)) => labels.get(key.trim()).map(String::as_str) == Some(value.trim()),
                None => labels.contains_key(term),
            }
        })
}

/// In-memory object store implementing [`PlatformClient`].
#[derive(Default)]
pub struct InMemoryPlatform {
    state: RwLock<State>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) a cluster object, assigning a uid if it has none.
    pub async fn apply_cluster(&self, mut cluster: DaskCluster) -> DaskCluster {
        if cluster.metadata.uid.is_none() {
            cluster.metadata.uid = Some(Uuid::new_v4().to_string());
        }
        let key = (
            cluster.namespace().unwrap_or_default(),
            cluster.name_any(),
        );

        let mut state = self.state.write().await;
        if let Some(existing) = state.clusters.get(&key) {
            cluster.metadata.uid.clone_from(&existing.metadata.uid);
        }
        state.clusters.insert(key, cluster.clone());
        cluster
    }

    /// Delete a cluster object; its scheduler and workers are garbage-collected.
    pub async fn remove_cluster(&self, key: &ClusterKey) -> Option<DaskCluster> {
        let mut state = self.state.write().await;
        let cluster = state
            .clusters
            .remove(&(key.namespace.clone(), key.name.clone()))?;
        if let Some(uid) = cluster.metadata.uid.as_deref() {
            state.collect_garbage(uid);
        }
        Some(cluster)
    }

    /// Change the replica count of a stored cluster.
    pub async fn set_replicas(&self, key: &ClusterKey, replicas: u32) -> bool {
        let mut state = self.state.write().await;
        match state.clusters.get_mut(&(key.namespace.clone(), key.name.clone())) {
            Some(cluster) => {
                cluster.spec.worker.replicas = replicas;
                true
            }
            None => false,
        }
    }

    /// Flip a stored cluster's `active` flag.
    pub async fn set_active(&self, key: &ClusterKey, active: bool) -> bool {
        let mut state = self.state.write().await;
        match state.clusters.get_mut(&(key.namespace.clone(), key.name.clone())) {
            Some(cluster) => {
                cluster.spec.active = active;
                true
            }
            None => false,
        }
    }

    /// Insert a pod directly, bypassing call accounting.
    pub async fn insert_pod(&self, mut pod: Pod) -> Pod {
        if pod.metadata.uid.is_none() {
            pod.metadata.uid = Some(Uuid::new_v4().to_string());
        }
        let key = (pod.namespace().unwrap_or_default(), pod.name_any());
        self.state.write().await.pods.insert(key, pod.clone());
        pod
    }

    /// Delete a pod as an external actor would (eviction, node loss, ...).
    pub async fn kill_pod(&self, namespace: &str, name: &str) -> bool {
        self.state.write().await.remove_pod(namespace, name).is_some()
    }

    /// Set the reported phase of a pod.
    pub async fn set_phase(&self, namespace: &str, name: &str, phase: &str) -> bool {
        let mut state = self.state.write().await;
        match state.pods.get_mut(&(namespace.to_string(), name.to_string())) {
            Some(pod) => {
                pod.status.get_or_insert_with(PodStatus::default).phase = Some(phase.to_string());
                true
            }
            None => false,
        }
    }

    /// Set the phase of every pod matching `selector`; returns how many changed.
    pub async fn set_phase_matching(&self, namespace: &str, selector: &str, phase: &str) -> usize {
        let mut state = self.state.write().await;
        let mut changed = 0;
        for ((ns, _), pod) in &mut state.pods {
            if ns == namespace && selector_matches(selector, pod.labels()) {
                pod.status.get_or_insert_with(PodStatus::default).phase = Some(phase.to_string());
                changed += 1;
            }
        }
        changed
    }

    /// Snapshot of a pod, bypassing call accounting.
    pub async fn pod(&self, namespace: &str, name: &str) -> Option<Pod> {
        self.state
            .read()
            .await
            .pods
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Snapshot of pods matching `selector`, bypassing call accounting.
    pub async fn pods(&self, namespace: &str, selector: &str) -> Vec<Pod> {
        self.state
            .read()
            .await
            .pods
            .iter()
            .filter(|((ns, _), pod)| ns == namespace && selector_matches(selector, pod.labels()))
            .map(|(_, pod)| pod.clone())
            .collect()
    }

    /// Total number of stored pods across namespaces.
    pub async fn pod_count(&self) -> usize {
        self.state.read().await.pods.len()
    }

    /// Make the next call of `op` fail with `err`. Queued failures fire in order.
    pub async fn fail_next(&self, op: Operation, err: PlatformError) {
        self.fail_nth(op, 1, err).await;
    }

    /// Let `n - 1` further calls of `op` succeed, then fail the `n`th with `err`.
    pub async fn fail_nth(&self, op: Operation, n: usize, err: PlatformError) {
        let mut state = self.state.write().await;
        let queue = state.failures.entry(op).or_default();
        queue.extend((1..n).map(|_| None));
        queue.push_back(Some(err));
    }

    pub async fn calls(&self) -> CallCounts {
        self.state.read().await.calls
    }

    pub async fn reset_calls(&self) {
        self.state.write().await.calls = CallCounts::default();
    }
}

#[async_trait]
impl PlatformClient for InMemoryPlatform {
    async fn get_cluster(&self, key: &ClusterKey) -> Result<Option<DaskCluster>, PlatformError> {
        let mut state = self.state.write().await;
        state.begin(Operation::GetCluster)?;
        Ok(state
            .clusters
            .get(&(key.namespace.clone(), key.name.clone()))
            .cloned())
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>, PlatformError> {
        let mut state = self.state.write().await;
        state.begin(Operation::GetPod)?;
        Ok(state
            .pods
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>, PlatformError> {
        let mut state = self.state.write().await;
        state.begin(Operation::ListPods)?;
        Ok(state
            .pods
            .iter()
            .filter(|((ns, _), pod)| ns == namespace && selector_matches(selector, pod.labels()))
            .map(|(_, pod)| pod.clone())
            .collect())
    }

    async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, PlatformError> {
        let mut state = self.state.write().await;
        state.begin(Operation::CreatePod)?;

        let name = pod.name_any();
        let key = (namespace.to_string(), name.clone());
        if state.pods.contains_key(&key) {
            return Err(PlatformError::already_exists("Pod", namespace, &name));
        }

        let mut stored = pod.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        stored.metadata.uid = Some(Uuid::new_v4().to_string());
        stored.status = Some(PodStatus {
            phase: Some("Pending".to_string()),
            ..Default::default()
        });
        state.pods.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        state.begin(Operation::DeletePod)?;
        state
            .remove_pod(namespace, name)
            .map(|_| ())
            .ok_or_else(|| PlatformError::not_found("Pod", namespace, name))
    }
}
