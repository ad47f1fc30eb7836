//! Liveness detection configuration

use std::time::Duration;

/// Tunables for the sweep/probe cycle.
#[derive(Debug, Clone)]
pub struct LivenessConfig {
    /// Time between sweep runs.
    pub sweep_interval: Duration,
    /// Inactivity threshold after which an occupant is probed.
    pub stale_after: Duration,
    /// Upper bound on probes issued by a single sweep run; bounds the
    /// outbound burst under a large tracked population.
    pub max_probes_per_sweep: usize,
    /// Bounded wait for a probe response before the transport reports a
    /// timeout.
    pub probe_timeout: Duration,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            // MUC_LIVENESS_SWEEP_INTERVAL_SECS: seconds between sweep runs
            sweep_interval: env_secs("MUC_LIVENESS_SWEEP_INTERVAL_SECS", 60),
            // MUC_LIVENESS_STALE_AFTER_SECS: inactivity before probing
            stale_after: env_secs("MUC_LIVENESS_STALE_AFTER_SECS", 60 * 60),
            // MUC_LIVENESS_MAX_PROBES_PER_SWEEP: per-run probe cap
            max_probes_per_sweep: env_usize("MUC_LIVENESS_MAX_PROBES_PER_SWEEP", 1000),
            // MUC_LIVENESS_PROBE_TIMEOUT_SECS: bounded wait per probe
            probe_timeout: env_secs("MUC_LIVENESS_PROBE_TIMEOUT_SECS", 60),
        }
    }
}

fn env_secs(var: &str, default_secs: u64) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}

fn env_usize(var: &str, default: usize) -> usize {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
