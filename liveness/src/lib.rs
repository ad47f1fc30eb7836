//! Ghost occupant detection for federated multi-user chat rooms
//!
//! Remote occupants can disappear silently — connection drop, network
//! partition, remote server crash — without ever sending a proper "leave".
//! This crate tracks per-occupant activity, periodically probes occupants
//! that have gone quiet, and force-removes the ones confirmed unreachable
//! from every room they still occupy.
//!
//! The crate owns the decision logic only. Rooms, stanza routing, and the
//! transport stay on the host's side of the [`RoomRegistry`] and
//! [`ProbeTransport`] boundaries:
//!
//! - feed every processed presence-bearing stanza to
//!   [`ActivityTracker::on_traffic`];
//! - deliver probe answers and expiries to
//!   [`ActivityTracker::on_probe_response`] /
//!   [`ActivityTracker::on_probe_timeout`];
//! - start the periodic sweep with [`LivenessMonitor::spawn_sweeper`] (or
//!   drive [`Sweeper::sweep`] yourself).
//!
//! All state is in-memory and rebuilt from live traffic after a restart.

pub mod config;
pub mod identity;
pub mod jid;
pub mod monitor;
pub mod probe;
pub mod rooms;
pub mod stanza;
pub mod store;
pub mod sweep;
pub mod terminal;
pub mod tracker;

pub use config::LivenessConfig;
pub use identity::OccupantKey;
pub use jid::{Jid, JidError};
pub use monitor::LivenessMonitor;
pub use probe::{ProbeRequest, ProbeTransport};
pub use rooms::{Room, RoomRegistry};
pub use stanza::{Element, PING_NS, STANZA_ERROR_NS};
pub use store::{now_ms, ActivityEntry, ActivityStore, StaleEntry};
pub use sweep::Sweeper;
pub use terminal::TerminalCondition;
pub use tracker::ActivityTracker;
