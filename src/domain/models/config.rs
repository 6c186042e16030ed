use serde::{Deserialize, Serialize};

/// Main configuration structure for the operator
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Restrict watches to a single namespace (all namespaces when unset)
    #[serde(default)]
    pub watch_namespace: Option<String>,

    /// Controller runtime configuration
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Worker scale-down policy
    #[serde(default)]
    pub scale_down: ScaleDownConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Controller runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ControllerConfig {
    /// Maximum reconciliations running at once (1-64)
    #[serde(default = "default_max_concurrent_reconciles")]
    pub max_concurrent_reconciles: u16,

    /// Requeue delay after a successful cycle, in seconds
    #[serde(default = "default_resync_interval_secs")]
    pub resync_interval_secs: u64,

    /// Requeue delay after a failed cycle, in seconds
    #[serde(default = "default_error_requeue_secs")]
    pub error_requeue_secs: u64,
}

const fn default_max_concurrent_reconciles() -> u16 {
    4
}

const fn default_resync_interval_secs() -> u64 {
    300
}

const fn default_error_requeue_secs() -> u64 {
    5
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_reconciles: default_max_concurrent_reconciles(),
            resync_interval_secs: default_resync_interval_secs(),
            error_requeue_secs: default_error_requeue_secs(),
        }
    }
}

/// Which worker pods may be removed when the pool is over its replica count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ScaleDownConfig {
    /// Pod phases (case-insensitive) that count as not yet doing work
    #[serde(default = "default_pending_phases")]
    pub pending_phases: Vec<String>,

    /// Treat pods whose phase has not been reported yet as pending
    #[serde(default = "default_unknown_phase_is_pending")]
    pub unknown_phase_is_pending: bool,

    /// Pod phases (case-insensitive) of workers that have stopped for good.
    /// They are left in place but no longer count toward the replica total.
    #[serde(default = "default_terminal_phases")]
    pub terminal_phases: Vec<String>,
}

fn default_pending_phases() -> Vec<String> {
    vec!["Pending".to_string()]
}

pub(crate) fn default_terminal_phases() -> Vec<String> {
    vec!["Succeeded".to_string(), "Failed".to_string()]
}

const fn default_unknown_phase_is_pending() -> bool {
    true
}

impl Default for ScaleDownConfig {
    fn default() -> Self {
        Self {
            pending_phases: default_pending_phases(),
            unknown_phase_is_pending: default_unknown_phase_is_pending(),
            terminal_phases: default_terminal_phases(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
