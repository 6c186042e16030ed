//! Service layer: reconciliation logic over the platform port.

pub mod convergence_loop;
pub mod pending;

pub use convergence_loop::{ConvergenceLoop, ReconcileOutcome};
pub use pending::PendingPredicate;
