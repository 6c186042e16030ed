//! Application layer: wires the convergence loop to the controller runtime.

pub mod controller;

pub use controller::{action_for, cluster_for_pod, error_policy, run, Context};
