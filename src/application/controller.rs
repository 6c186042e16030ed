//! Watch registration and controller runtime wiring.
//!
//! The controller delivers a cluster key whenever a `DaskCluster` changes or
//! any pod labelled with its name changes. Delivery is at-least-once; the
//! convergence loop tolerates duplicates, so no extra bookkeeping happens here.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::runtime::controller::{self, Action, Controller};
use kube::runtime::reflector::ObjectRef;
use kube::runtime::watcher;
use kube::ResourceExt;
use tracing::{debug, info, warn};

use crate::adapters::KubePlatform;
use crate::domain::error::ReconcileError;
use crate::domain::models::{ClusterKey, Config, ControllerConfig, DaskCluster, CLUSTER_LABEL};
use crate::domain::ports::PlatformClient;
use crate::services::{ConvergenceLoop, PendingPredicate, ReconcileOutcome};

/// Shared state handed to every reconciliation.
pub struct Context {
    convergence: ConvergenceLoop<dyn PlatformClient>,
    settings: ControllerConfig,
}

impl Context {
    pub fn new(platform: Arc<dyn PlatformClient>, config: &Config) -> Self {
        Self {
            convergence: ConvergenceLoop::new(
                platform,
                PendingPredicate::from_config(&config.scale_down),
            ),
            settings: config.controller.clone(),
        }
    }
}

/// Map a labelled pod event to the cluster that should be reconciled.
pub fn cluster_for_pod(pod: Pod) -> Option<ObjectRef<DaskCluster>> {
    let namespace = pod.namespace()?;
    let cluster = pod.labels().get(CLUSTER_LABEL)?;
    Some(ObjectRef::new(cluster).within(&namespace))
}

/// Requeue policy after a successful cycle.
pub fn action_for(outcome: &ReconcileOutcome, settings: &ControllerConfig) -> Action {
    match outcome {
        ReconcileOutcome::ClusterAbsent => Action::await_change(),
        _ => Action::requeue(Duration::from_secs(settings.resync_interval_secs)),
    }
}

async fn reconcile(cluster: Arc<DaskCluster>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    let key = ClusterKey::from_cluster(&cluster)?;
    let outcome = ctx.convergence.reconcile(&key).await?;
    debug!(cluster = %key, ?outcome, "reconcile finished");
    Ok(action_for(&outcome, &ctx.settings))
}

/// Error policy for the controller: the whole cycle is retried after a delay.
pub fn error_policy(cluster: Arc<DaskCluster>, error: &ReconcileError, ctx: Arc<Context>) -> Action {
    warn!(
        cluster = %cluster.name_any(),
        namespace = %cluster.namespace().unwrap_or_default(),
        error = %error,
        "reconciliation failed, requeueing"
    );
    Action::requeue(Duration::from_secs(ctx.settings.error_requeue_secs))
}

/// Run the controller until a shutdown signal arrives.
pub async fn run(config: Config) -> Result<()> {
    let kube_platform = KubePlatform::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let client = kube_platform.client().clone();

    let (clusters, pods): (Api<DaskCluster>, Api<Pod>) = match config.watch_namespace.as_deref() {
        Some(ns) => (
            Api::namespaced(client.clone(), ns),
            Api::namespaced(client.clone(), ns),
        ),
        None => (Api::all(client.clone()), Api::all(client.clone())),
    };

    // Fail fast when the CRD is not installed.
    clusters
        .list(&ListParams::default().limit(1))
        .await
        .context("DaskCluster CRD is not queryable; is it installed?")?;

    let platform: Arc<dyn PlatformClient> = Arc::new(kube_platform);
    let ctx = Arc::new(Context::new(platform, &config));

    info!(
        namespace = config.watch_namespace.as_deref().unwrap_or("*"),
        concurrency = config.controller.max_concurrent_reconciles,
        "starting DaskCluster controller"
    );

    Controller::new(clusters, watcher::Config::default())
        .watches(
            pods,
            watcher::Config::default().labels(CLUSTER_LABEL),
            cluster_for_pod,
        )
        .with_config(
            controller::Config::default().concurrency(config.controller.max_concurrent_reconciles),
        )
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((object, _)) => debug!(cluster = %object.name, "reconciled"),
                Err(e) => warn!(error = %e, "controller error"),
            }
        })
        .await;

    info!("controller stopped");
    Ok(())
}
