//! Activity tracking and ghost confirmation
//!
//! The decision engine of the subsystem. Consumes inbound presence traffic,
//! probe responses, and probe timeouts; decides between "still alive",
//! "explicitly departed", and "ghost"; mutates the activity store and drives
//! eviction through the room registry.
//!
//! Every entry point is infallible at the boundary: parse failures and
//! collaborator errors are logged and recovered locally, never propagated
//! back into the caller's dispatch machinery.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::identity::OccupantKey;
use crate::jid::Jid;
use crate::probe::ProbeRequest;
use crate::rooms::RoomRegistry;
use crate::stanza::Element;
use crate::store::{now_ms, ActivityStore};
use crate::terminal::TerminalCondition;

/// Tracks occupant activity and evicts confirmed ghosts.
pub struct ActivityTracker {
    store: Arc<ActivityStore>,
    rooms: Arc<dyn RoomRegistry>,
}

impl ActivityTracker {
    pub fn new(store: Arc<ActivityStore>, rooms: Arc<dyn RoomRegistry>) -> Self {
        Self { store, rooms }
    }

    pub fn store(&self) -> &Arc<ActivityStore> {
        &self.store
    }

    /// Process one inbound presence-bearing stanza.
    ///
    /// Stanzas whose sender has no resource are ignored entirely; they
    /// cannot be correlated to a specific occupant session.
    pub async fn on_traffic(&self, stanza: &Element) {
        let Some(from_raw) = stanza.attr("from") else {
            return;
        };
        let from: Jid = match from_raw.parse() {
            Ok(jid) => jid,
            Err(e) => {
                warn!(from = from_raw, error = %e, "ignoring stanza with malformed sender address");
                return;
            }
        };
        if from.resource().is_none() {
            return;
        }
        let Some(to_raw) = stanza.attr("to") else {
            return;
        };
        let to: Jid = match to_raw.parse() {
            Ok(jid) => jid,
            Err(e) => {
                warn!(to = to_raw, error = %e, "ignoring stanza with malformed recipient address");
                return;
            }
        };

        let key = OccupantKey::new(from, to.domain());
        let stanza_type = stanza.attr("type");

        if let Some(condition) = TerminalCondition::from_stanza(stanza) {
            debug!(key = %key, condition = %condition, "terminal error in presence traffic");
            self.confirm_ghost(&key).await;
        } else if stanza.is_presence() && stanza_type == Some("unavailable") {
            debug!(key = %key, "explicit departure, dropping activity entry");
            self.store.remove(&key);
        } else if !self.store.contains(&key)
            && stanza.is_presence()
            && stanza_type != Some("error")
        {
            debug!(key = %key, "creating activity entry");
            self.store.upsert(&key, now_ms(), to.localpart());
            return;
        }
        if self.store.contains(&key) {
            self.store.upsert(&key, now_ms(), to.localpart());
        }
    }

    /// Process the answer to an earlier liveness probe.
    ///
    /// Answers for identities no longer tracked are ignored: the entry may
    /// have been evicted for an unrelated reason while the probe was in
    /// flight, and a late or duplicate answer must stay a no-op.
    pub async fn on_probe_response(&self, response: &Element) {
        let (Some(from_raw), Some(to_raw)) = (response.attr("from"), response.attr("to")) else {
            return;
        };
        let from: Jid = match from_raw.parse() {
            Ok(jid) => jid,
            Err(e) => {
                warn!(from = from_raw, error = %e, "ignoring probe answer with malformed sender address");
                return;
            }
        };
        let to: Jid = match to_raw.parse() {
            Ok(jid) => jid,
            Err(e) => {
                warn!(to = to_raw, error = %e, "ignoring probe answer with malformed recipient address");
                return;
            }
        };

        let key = OccupantKey::new(from, to.domain());
        if !self.store.contains(&key) {
            debug!(key = %key, "probe answer for untracked occupant, ignoring");
            return;
        }

        if let Some(condition) = TerminalCondition::from_stanza(response) {
            debug!(
                key = %key,
                condition = %condition,
                probe_id = response.attr("id").unwrap_or(""),
                "probe answered with terminal error"
            );
            self.confirm_ghost(&key).await;
        } else {
            debug!(key = %key, "probe answered, refreshing activity");
            self.store.upsert(&key, now_ms(), None);
        }
    }

    /// Process an expired probe. A timeout is the primary detection signal
    /// for unreachable peers and always confirms the target as a ghost.
    pub async fn on_probe_timeout(&self, probe: &ProbeRequest) {
        debug!(probe_id = %probe.id, target = %probe.to, "probe timed out");
        let key = OccupantKey::new(probe.to.clone(), probe.from.domain());
        self.confirm_ghost(&key).await;
    }

    /// Drop the identity from the store and force it out of every room in
    /// its domain where it is still an occupant. Per-room failures do not
    /// stop the domain-scoped sweep.
    async fn confirm_ghost(&self, key: &OccupantKey) {
        debug!(key = %key, "forced removal of activity entry");
        self.store.remove(key);

        for room in self.rooms.active_rooms().await {
            if room.room_jid().domain() == key.domain() && room.is_occupant(key.source()) {
                if let Err(e) = room.force_leave(key.source()).await {
                    warn!(
                        room = %room.room_jid(),
                        occupant = %key.source(),
                        error = %e,
                        "forced leave failed"
                    );
                }
            }
        }
    }
}
