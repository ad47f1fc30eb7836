//! Room registry and eviction boundary
//!
//! The core never owns room state. When an occupant is confirmed a ghost, it
//! asks the host for the active rooms, checks occupancy, and requests a
//! forced leave. Everything behind these traits lives outside this crate.

use std::sync::Arc;

use async_trait::async_trait;

use crate::jid::Jid;

/// A single active room, as seen by the liveness core.
#[async_trait]
pub trait Room: Send + Sync {
    /// The room's own address; its domain scopes eviction sweeps.
    fn room_jid(&self) -> &Jid;

    /// Whether the given address is currently an occupant of this room.
    fn is_occupant(&self, occupant: &Jid) -> bool;

    /// Force the occupant out, generating whatever departure notifications
    /// the room model requires.
    async fn force_leave(&self, occupant: &Jid) -> anyhow::Result<()>;
}

/// Source of the currently active rooms.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    async fn active_rooms(&self) -> Vec<Arc<dyn Room>>;
}
