//! Convergence loop for DaskCluster resources.
//!
//! One call to [`ConvergenceLoop::reconcile`] is one reconciliation cycle: it
//! re-reads everything from the platform, issues the create/delete calls that
//! move the cluster one step closer to its declared state, and returns. No
//! state survives between cycles, so overlapping cycles for the same key are
//! safe: at worst they over- or under-shoot briefly and the next cycle corrects it.
//!
//! Cycle order:
//! 1. Load the cluster; gone means nothing to do.
//! 2. Look up the scheduler pod by its derived name.
//! 3. Inactive cluster: delete the scheduler (workers go with it by cascade) and stop.
//! 4. Missing scheduler: create it and stop. Workers need the scheduler's uid as
//!    their owner, so they wait for the next cycle.
//! 5. Count live workers by membership label and create or remove the difference.
//!    Workers in a terminal phase are left alone and not counted.

use std::cmp::Ordering;
use std::sync::Arc;

use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::{debug, info, instrument, warn};

use crate::domain::error::ReconcileResult;
use crate::domain::models::{
    new_scheduler_pod, new_worker_pod, scheduler_name, worker_selector, ClusterKey, DaskCluster,
};
use crate::domain::ports::PlatformClient;
use crate::services::pending::PendingPredicate;

/// What a single reconciliation cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The cluster object no longer exists.
    ClusterAbsent,
    /// The cluster is inactive; `scheduler_deleted` is false when there was nothing to delete.
    Deactivated { scheduler_deleted: bool },
    /// The scheduler pod was created (or a concurrent cycle created it first).
    SchedulerCreated,
    /// Workers were added.
    ScaledUp { created: usize },
    /// Pending workers were removed; `deferred` surplus had no pending pod to take.
    ScaledDown { deleted: usize, deferred: usize },
    /// Live worker count already matches the desired replicas.
    Converged { replicas: usize },
}

impl ReconcileOutcome {
    /// Whether the cycle issued no create or delete calls.
    pub const fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::ClusterAbsent
                | Self::Converged { .. }
                | Self::Deactivated {
                    scheduler_deleted: false
                }
                | Self::ScaledDown { deleted: 0, .. }
        )
    }
}

/// Drives one DaskCluster toward its declared scheduler and worker pods.
pub struct ConvergenceLoop<P>
where
    P: PlatformClient + ?Sized,
{
    platform: Arc<P>,
    pending: PendingPredicate,
}

impl<P> ConvergenceLoop<P>
where
    P: PlatformClient + ?Sized,
{
    pub fn new(platform: Arc<P>, pending: PendingPredicate) -> Self {
        Self { platform, pending }
    }

    /// Run one reconciliation cycle for `key`.
    #[instrument(skip_all, fields(namespace = %key.namespace, cluster = %key.name))]
    pub async fn reconcile(&self, key: &ClusterKey) -> ReconcileResult<ReconcileOutcome> {
        debug!("reconciling cluster");

        let Some(cluster) = self.platform.get_cluster(key).await? else {
            debug!("cluster not found, nothing to do");
            return Ok(ReconcileOutcome::ClusterAbsent);
        };

        let scheduler_name = scheduler_name(&key.name);
        let scheduler = self.platform.get_pod(&key.namespace, &scheduler_name).await?;

        if !cluster.spec.active {
            return self.deactivate(key, scheduler.as_ref()).await;
        }

        let Some(scheduler) = scheduler else {
            return self.create_scheduler(key, &cluster).await;
        };
        debug!(pod = %scheduler_name, "scheduler already exists");

        self.reconcile_workers(key, &cluster, &scheduler).await
    }

    async fn deactivate(
        &self,
        key: &ClusterKey,
        scheduler: Option<&Pod>,
    ) -> ReconcileResult<ReconcileOutcome> {
        let Some(scheduler) = scheduler else {
            debug!("cluster inactive and scheduler absent");
            return Ok(ReconcileOutcome::Deactivated {
                scheduler_deleted: false,
            });
        };

        let name = scheduler.name_any();
        info!(pod = %name, "cluster inactive, deleting scheduler and its workers");

        match self.platform.delete_pod(&key.namespace, &name).await {
            Ok(()) => Ok(ReconcileOutcome::Deactivated {
                scheduler_deleted: true,
            }),
            Err(e) if e.is_not_found() => {
                debug!(pod = %name, "scheduler already deleted");
                Ok(ReconcileOutcome::Deactivated {
                    scheduler_deleted: false,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_scheduler(
        &self,
        key: &ClusterKey,
        cluster: &DaskCluster,
    ) -> ReconcileResult<ReconcileOutcome> {
        let pod = new_scheduler_pod(cluster)?;
        let name = pod.name_any();
        info!(pod = %name, "creating scheduler");

        match self.platform.create_pod(&key.namespace, &pod).await {
            Ok(_) => {}
            Err(e) if e.is_already_exists() => {
                debug!(pod = %name, "scheduler created by a concurrent cycle");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(ReconcileOutcome::SchedulerCreated)
    }

    async fn reconcile_workers(
        &self,
        key: &ClusterKey,
        cluster: &DaskCluster,
        scheduler: &Pod,
    ) -> ReconcileResult<ReconcileOutcome> {
        let selector = worker_selector(&key.name);
        let (finished, workers): (Vec<Pod>, Vec<Pod>) = self
            .platform
            .list_pods(&key.namespace, &selector)
            .await?
            .into_iter()
            .partition(|pod| self.pending.is_terminal(pod));

        let desired = cluster.spec.worker.replicas as usize;
        let observed = workers.len();
        debug!(desired, observed, finished = finished.len(), "fetched workers");

        match observed.cmp(&desired) {
            Ordering::Equal => Ok(ReconcileOutcome::Converged { replicas: desired }),
            Ordering::Less => {
                self.scale_up(key, cluster, scheduler, desired - observed)
                    .await
            }
            Ordering::Greater => self.scale_down(key, &workers, observed - desired).await,
        }
    }

    async fn scale_up(
        &self,
        key: &ClusterKey,
        cluster: &DaskCluster,
        scheduler: &Pod,
        missing: usize,
    ) -> ReconcileResult<ReconcileOutcome> {
        info!(missing, "creating workers");

        for created in 0..missing {
            let pod = new_worker_pod(cluster, scheduler)?;
            let name = pod.name_any();

            if let Err(e) = self.platform.create_pod(&key.namespace, &pod).await {
                // Already-created workers stay; the next cycle recounts them.
                warn!(pod = %name, created, error = %e, "worker creation failed");
                return Err(e.into());
            }
            debug!(pod = %name, "created worker");
        }

        Ok(ReconcileOutcome::ScaledUp { created: missing })
    }

    async fn scale_down(
        &self,
        key: &ClusterKey,
        workers: &[Pod],
        surplus: usize,
    ) -> ReconcileResult<ReconcileOutcome> {
        let candidates: Vec<String> = workers
            .iter()
            .filter(|pod| self.pending.is_pending(pod))
            .take(surplus)
            .map(ResourceExt::name_any)
            .collect();
        let deferred = surplus - candidates.len();

        info!(
            surplus,
            candidates = candidates.len(),
            "removing pending workers"
        );

        let mut deleted = 0;
        for name in &candidates {
            match self.platform.delete_pod(&key.namespace, name).await {
                Ok(()) => debug!(pod = %name, "deleted worker"),
                Err(e) if e.is_not_found() => debug!(pod = %name, "worker already gone"),
                Err(e) => return Err(e.into()),
            }
            deleted += 1;
        }

        if deferred > 0 {
            info!(
                deferred,
                "not enough pending workers, leaving running workers in place"
            );
        }

        Ok(ReconcileOutcome::ScaledDown { deleted, deferred })
    }
}
