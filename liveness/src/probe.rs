//! Liveness probes and the transport boundary
//!
//! A probe is a lightweight request whose only purpose is to elicit any
//! response from the target. The core builds the probe and allocates its
//! correlation id; the transport owns delivery, correlation, and the bounded
//! wait, and must eventually feed the outcome back to the tracker.

use std::time::Duration;

use async_trait::async_trait;

use crate::jid::Jid;
use crate::stanza::{Element, PING_NS};

/// An outbound liveness probe handed to the transport.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// Correlation id, unique within the issuing sweeper.
    pub id: String,
    /// Sender address: `room@domain` when a room hint is known, else the
    /// bare service domain.
    pub from: Jid,
    /// The occupant being probed.
    pub to: Jid,
    /// Bounded wait for a response before the transport reports a timeout.
    pub timeout: Duration,
    /// The probe stanza itself.
    pub stanza: Element,
}

impl ProbeRequest {
    pub fn new(id: String, from: Jid, to: Jid, timeout: Duration) -> Self {
        let stanza = Element::new("iq")
            .with_attr("type", "get")
            .with_attr("id", id.clone())
            .with_attr("from", from.to_string())
            .with_attr("to", to.to_string())
            .with_child(Element::new("ping").with_attr("xmlns", PING_NS));
        Self {
            id,
            from,
            to,
            timeout,
            stanza,
        }
    }
}

/// Request/response-with-timeout capability required from the host.
///
/// `send_probe` is fire-and-forget: it must not block on the remote party.
/// The transport correlates the eventual answer and calls the tracker's
/// probe-response or probe-timeout entry point.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn send_probe(&self, probe: ProbeRequest) -> anyhow::Result<()>;
}
