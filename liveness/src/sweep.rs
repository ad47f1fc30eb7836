//! Periodic stale-entry sweep
//!
//! Scans the activity store for occupants past the staleness threshold and
//! issues one liveness probe per selected entry, bounded per run. The sweep
//! never mutates the store: entries only move in reaction to the probe's
//! eventual response or timeout, handled by the tracker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::config::LivenessConfig;
use crate::jid::{Jid, JidError};
use crate::probe::{ProbeRequest, ProbeTransport};
use crate::store::{now_ms, ActivityStore, StaleEntry};

/// Issues liveness probes for stale activity entries.
pub struct Sweeper {
    store: Arc<ActivityStore>,
    transport: Arc<dyn ProbeTransport>,
    config: LivenessConfig,
    probe_seq: AtomicU64,
}

impl Sweeper {
    pub fn new(
        store: Arc<ActivityStore>,
        transport: Arc<dyn ProbeTransport>,
        config: LivenessConfig,
    ) -> Self {
        Self {
            store,
            transport,
            config,
            probe_seq: AtomicU64::new(0),
        }
    }

    /// One sweep run. Returns the number of probes issued.
    pub async fn sweep(&self) -> usize {
        let threshold = now_ms() - self.config.stale_after.as_millis() as i64;
        let stale = self
            .store
            .snapshot_stale(threshold, self.config.max_probes_per_sweep);
        if stale.is_empty() {
            return 0;
        }
        debug!(candidates = stale.len(), "sweeping stale occupants");

        let mut issued = 0;
        for entry in stale {
            let probe = match self.build_probe(&entry) {
                Ok(probe) => probe,
                Err(e) => {
                    warn!(key = %entry.key, error = %e, "cannot build probe sender address");
                    continue;
                }
            };
            debug!(probe_id = %probe.id, target = %probe.to, "issuing liveness probe");
            match self.transport.send_probe(probe).await {
                Ok(()) => issued += 1,
                Err(e) => {
                    warn!(key = %entry.key, error = %e, "failed to send liveness probe");
                }
            }
        }
        issued
    }

    fn build_probe(&self, entry: &StaleEntry) -> Result<ProbeRequest, JidError> {
        let id = format!("png-{}", self.probe_seq.fetch_add(1, Ordering::Relaxed) + 1);
        let from = Jid::from_parts(entry.room_hint.as_deref(), entry.key.domain(), None)?;
        Ok(ProbeRequest::new(
            id,
            from,
            entry.key.source().clone(),
            self.config.probe_timeout,
        ))
    }

    /// Run sweeps on the configured interval until the task is aborted.
    /// Runs never overlap: the next tick is not serviced until the current
    /// run has finished issuing its probes.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval yields immediately on the first tick
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}
