//! Property tests for the convergence loop against the in-memory platform.

mod common;

use std::sync::Arc;

use common::{bootstrapped, cluster, convergence, key, seed_workers, worker_count, workers};
use dask_operator::adapters::InMemoryPlatform;
use dask_operator::services::ReconcileOutcome;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

fn running_count(pods: &[k8s_openapi::api::core::v1::Pod]) -> usize {
    pods.iter()
        .filter(|pod| pod.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Running"))
        .count()
}

async fn settle(platform: &Arc<InMemoryPlatform>, max_cycles: usize) -> Vec<ReconcileOutcome> {
    let convergence = convergence(platform);
    let mut outcomes = Vec::new();
    for _ in 0..max_cycles {
        let outcome = convergence.reconcile(&key()).await.expect("cycle succeeds");
        let quiet = outcome.is_noop();
        outcomes.push(outcome);
        if quiet {
            break;
        }
    }
    outcomes
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the worker count settles on the desired replicas whenever the
    /// surplus can be covered by pending workers, and running workers are never removed.
    #[test]
    fn prop_workers_settle_without_evicting_running(
        replicas in 0u32..8,
        pending in 0usize..8,
        running in 0usize..8,
    ) {
        runtime().block_on(async {
            let platform = bootstrapped(replicas).await;
            seed_workers(&platform, pending, running).await;
            let observed = pending + running;
            let desired = replicas as usize;

            let outcomes = settle(&platform, 4).await;
            let writing_cycles = outcomes.iter().filter(|o| !o.is_noop()).count();
            prop_assert!(writing_cycles <= desired.abs_diff(observed));
            prop_assert!(outcomes.last().is_some_and(ReconcileOutcome::is_noop));

            let remaining = workers(&platform).await;
            prop_assert_eq!(running_count(&remaining), running);
            if desired >= observed || pending >= observed - desired {
                prop_assert_eq!(remaining.len(), desired);
            } else {
                prop_assert_eq!(remaining.len(), running);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Property: a settled cluster issues no writes on further cycles.
    #[test]
    fn prop_settled_cluster_is_idempotent(
        replicas in 0u32..8,
        pending in 0usize..6,
        running in 0usize..6,
    ) {
        runtime().block_on(async {
            let platform = bootstrapped(replicas).await;
            seed_workers(&platform, pending, running).await;
            settle(&platform, 4).await;

            platform.reset_calls().await;
            let outcome = convergence(&platform).reconcile(&key()).await.expect("cycle succeeds");

            prop_assert!(outcome.is_noop());
            prop_assert_eq!(platform.calls().await.writes(), 0);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Property: deactivation removes every pod of the cluster in one cycle,
    /// whatever the worker population looked like.
    #[test]
    fn prop_deactivation_removes_everything(
        replicas in 0u32..8,
        pending in 0usize..6,
        running in 0usize..6,
    ) {
        runtime().block_on(async {
            let platform = bootstrapped(replicas).await;
            seed_workers(&platform, pending, running).await;
            platform.set_active(&key(), false).await;

            let outcome = convergence(&platform).reconcile(&key()).await.expect("cycle succeeds");

            prop_assert_eq!(outcome, ReconcileOutcome::Deactivated { scheduler_deleted: true });
            prop_assert_eq!(worker_count(&platform).await, 0);
            prop_assert_eq!(platform.pod_count().await, 0);
            prop_assert_eq!(platform.calls().await.create_pod, 0);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Property: a single scale-down cycle never deletes more than the surplus.
    #[test]
    fn prop_scale_down_bounded_by_surplus(
        replicas in 0u32..6,
        pending in 0usize..10,
    ) {
        runtime().block_on(async {
            let platform = bootstrapped(replicas).await;
            seed_workers(&platform, pending, 0).await;
            let desired = replicas as usize;

            let outcome = convergence(&platform).reconcile(&key()).await.expect("cycle succeeds");

            let calls = platform.calls().await;
            prop_assert!(calls.delete_pod <= pending.saturating_sub(desired));
            if pending > desired {
                prop_assert_eq!(outcome, ReconcileOutcome::ScaledDown {
                    deleted: pending - desired,
                    deferred: 0,
                });
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Property: with no scheduler, a cycle creates only the scheduler and
    /// never lists or creates workers, whatever the replica count.
    #[test]
    fn prop_bootstrap_creates_only_the_scheduler(replicas in 0u32..64) {
        runtime().block_on(async {
            let platform = Arc::new(InMemoryPlatform::new());
            platform.apply_cluster(cluster(replicas, true)).await;

            let outcome = convergence(&platform).reconcile(&key()).await.expect("cycle succeeds");

            prop_assert_eq!(outcome, ReconcileOutcome::SchedulerCreated);
            let calls = platform.calls().await;
            prop_assert_eq!(calls.create_pod, 1);
            prop_assert_eq!(calls.list_pods, 0);
            prop_assert_eq!(calls.delete_pod, 0);
            prop_assert_eq!(worker_count(&platform).await, 0);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
