//! Classifies worker pods by phase for the convergence loop.
//!
//! Kubernetes reports phases capitalised (`Pending`, `Running`, ...). Matching
//! is case-insensitive so a lowercase `pending` in configuration still hits.
//! Pending workers are the only scale-down candidates; terminal workers
//! (evicted, completed) are not live and do not count toward replicas.

use k8s_openapi::api::core::v1::Pod;

use crate::domain::models::config::default_terminal_phases;
use crate::domain::models::ScaleDownConfig;

/// Predicate over observed pod state selecting scale-down candidates.
#[derive(Debug, Clone)]
pub struct PendingPredicate {
    phases: Vec<String>,
    unknown_phase_is_pending: bool,
    terminal_phases: Vec<String>,
}

impl PendingPredicate {
    /// Terminal phases default to `Succeeded` and `Failed`.
    pub fn new<I, S>(phases: I, unknown_phase_is_pending: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phases: phases.into_iter().map(Into::into).collect(),
            unknown_phase_is_pending,
            terminal_phases: default_terminal_phases(),
        }
    }

    #[must_use]
    pub fn with_terminal_phases<I, S>(mut self, phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminal_phases = phases.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_config(config: &ScaleDownConfig) -> Self {
        Self::new(config.pending_phases.iter().cloned(), config.unknown_phase_is_pending)
            .with_terminal_phases(config.terminal_phases.iter().cloned())
    }

    /// Whether `pod` has been accepted but is not yet running workload.
    ///
    /// Pods already being deleted are never candidates.
    pub fn is_pending(&self, pod: &Pod) -> bool {
        if pod.metadata.deletion_timestamp.is_some() {
            return false;
        }

        match phase(pod) {
            Some(phase) => matches_any(&self.phases, phase),
            None => self.unknown_phase_is_pending,
        }
    }

    /// Whether `pod` has stopped and will never run workload again.
    pub fn is_terminal(&self, pod: &Pod) -> bool {
        phase(pod).is_some_and(|phase| matches_any(&self.terminal_phases, phase))
    }
}

fn phase(pod: &Pod) -> Option<&str> {
    pod.status.as_ref().and_then(|s| s.phase.as_deref())
}

fn matches_any(phases: &[String], phase: &str) -> bool {
    phases.iter().any(|p| p.eq_ignore_ascii_case(phase))
}

impl Default for PendingPredicate {
    fn default() -> Self {
        Self::from_config(&ScaleDownConfig::default())
    }
}
