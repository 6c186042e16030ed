//! Domain models for the DaskCluster operator.

pub mod cluster;
pub mod config;
pub mod units;

pub use cluster::{ClusterKey, DaskCluster, DaskClusterSpec, SchedulerSpec, WorkerSpec};
pub use config::{Config, ControllerConfig, LoggingConfig, ScaleDownConfig};
pub use units::{
    membership_value, new_scheduler_pod, new_worker_pod, scheduler_name, worker_selector,
    UnitRole, CLUSTER_LABEL, MAX_CLUSTER_NAME_LEN, MAX_LABEL_VALUE_LEN, MEMBERSHIP_LABEL,
    ROLE_LABEL,
};
