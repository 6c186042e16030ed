//! Common test utilities for integration tests
//!
//! Provides cluster fixtures and helpers for driving the convergence loop
//! against the in-memory platform.

use std::collections::BTreeMap;
use std::sync::Arc;

use dask_operator::adapters::InMemoryPlatform;
use dask_operator::domain::models::{
    new_worker_pod, scheduler_name, worker_selector, ClusterKey, DaskCluster, DaskClusterSpec,
    SchedulerSpec, WorkerSpec,
};
use dask_operator::services::{ConvergenceLoop, PendingPredicate, ReconcileOutcome};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

pub const NAMESPACE: &str = "analytics";
pub const CLUSTER: &str = "etl";

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn key() -> ClusterKey {
    ClusterKey::new(NAMESPACE, CLUSTER)
}

fn template(role: &str) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(BTreeMap::from([("component".to_string(), role.to_string())])),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            containers: vec![Container {
                name: role.to_string(),
                image: Some("daskgateway/dask-gateway:2024.1.0".to_string()),
                args: Some(vec![format!("dask-{role}")]),
                ..Default::default()
            }],
            ..Default::default()
        }),
    }
}

/// A cluster object in the test namespace.
pub fn cluster(replicas: u32, active: bool) -> DaskCluster {
    let mut cluster = DaskCluster::new(CLUSTER, DaskClusterSpec {
        active,
        scheduler: SchedulerSpec {
            template: template("scheduler"),
        },
        worker: WorkerSpec {
            replicas,
            template: template("worker"),
        },
    });
    cluster.metadata.namespace = Some(NAMESPACE.to_string());
    cluster
}

pub fn convergence(platform: &Arc<InMemoryPlatform>) -> ConvergenceLoop<InMemoryPlatform> {
    ConvergenceLoop::new(Arc::clone(platform), PendingPredicate::default())
}

/// Platform holding an active cluster whose scheduler already exists.
pub async fn bootstrapped(replicas: u32) -> Arc<InMemoryPlatform> {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.apply_cluster(cluster(replicas, true)).await;
    let outcome = convergence(&platform)
        .reconcile(&key())
        .await
        .expect("bootstrap cycle");
    assert_eq!(outcome, ReconcileOutcome::SchedulerCreated);
    platform.set_phase(NAMESPACE, &scheduler_name(CLUSTER), "Running").await;
    platform.reset_calls().await;
    platform
}

/// Seed worker pods owned by the scheduler, as earlier cycles would have created them.
pub async fn seed_workers(platform: &InMemoryPlatform, pending: usize, running: usize) -> Vec<Pod> {
    let cluster = cluster(0, true);
    let scheduler = platform
        .pod(NAMESPACE, &scheduler_name(CLUSTER))
        .await
        .expect("scheduler exists");

    let mut seeded = Vec::new();
    for i in 0..pending + running {
        let mut pod = new_worker_pod(&cluster, &scheduler).expect("worker pod");
        pod.metadata.namespace = Some(NAMESPACE.to_string());
        let pod = platform.insert_pod(pod).await;
        let name = pod.metadata.name.clone().expect("name");
        let phase = if i < pending { "Pending" } else { "Running" };
        platform.set_phase(NAMESPACE, &name, phase).await;
        seeded.push(platform.pod(NAMESPACE, &name).await.expect("seeded pod"));
    }
    seeded
}

pub async fn workers(platform: &InMemoryPlatform) -> Vec<Pod> {
    platform.pods(NAMESPACE, &worker_selector(CLUSTER)).await
}

pub async fn worker_count(platform: &InMemoryPlatform) -> usize {
    workers(platform).await.len()
}

/// Run cycles until one issues no writes; returns the number of cycles run.
#[allow(dead_code)]
pub async fn reconcile_until_quiet(platform: &Arc<InMemoryPlatform>, max_cycles: usize) -> usize {
    let convergence = convergence(platform);
    for cycle in 1..=max_cycles {
        let outcome = convergence.reconcile(&key()).await.expect("cycle succeeds");
        if outcome.is_noop() {
            return cycle;
        }
    }
    panic!("cluster did not settle within {max_cycles} cycles");
}
