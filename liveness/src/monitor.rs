//! One-call wiring of the liveness subsystem
//!
//! Hosts that do not need to assemble the parts themselves can build a
//! [`LivenessMonitor`] from a config and the two collaborator boundaries,
//! feed it traffic, and start the periodic sweep.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::LivenessConfig;
use crate::probe::ProbeTransport;
use crate::rooms::RoomRegistry;
use crate::store::ActivityStore;
use crate::sweep::Sweeper;
use crate::tracker::ActivityTracker;

/// Assembled store + tracker + sweeper.
pub struct LivenessMonitor {
    store: Arc<ActivityStore>,
    tracker: Arc<ActivityTracker>,
    sweeper: Arc<Sweeper>,
}

impl LivenessMonitor {
    pub fn new(
        config: LivenessConfig,
        transport: Arc<dyn ProbeTransport>,
        rooms: Arc<dyn RoomRegistry>,
    ) -> Self {
        let store = Arc::new(ActivityStore::new());
        let tracker = Arc::new(ActivityTracker::new(Arc::clone(&store), rooms));
        let sweeper = Arc::new(Sweeper::new(Arc::clone(&store), transport, config));
        Self {
            store,
            tracker,
            sweeper,
        }
    }

    pub fn store(&self) -> &Arc<ActivityStore> {
        &self.store
    }

    /// Feed this with every processed presence-bearing stanza and with the
    /// transport's probe response/timeout callbacks.
    pub fn tracker(&self) -> &Arc<ActivityTracker> {
        &self.tracker
    }

    pub fn sweeper(&self) -> &Arc<Sweeper> {
        &self.sweeper
    }

    /// Start the periodic sweep task. Abort the handle to stop it.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        Arc::clone(&self.sweeper).spawn()
    }
}
