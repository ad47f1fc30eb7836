//! End-to-end ghost detection flows
//!
//! Wires the real store, tracker, and sweeper together with in-test
//! transport and room-registry fakes, and drives the full probe lifecycle:
//! silence → sweep → probe → response or timeout → refresh or eviction.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use liveness::{
    now_ms, Element, Jid, LivenessConfig, LivenessMonitor, OccupantKey, ProbeRequest,
    ProbeTransport, Room, RoomRegistry, STANZA_ERROR_NS,
};

struct RecordingTransport {
    sent: Mutex<Vec<ProbeRequest>>,
}

impl RecordingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<ProbeRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProbeTransport for RecordingTransport {
    async fn send_probe(&self, probe: ProbeRequest) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(probe);
        Ok(())
    }
}

struct FakeRoom {
    jid: Jid,
    occupants: HashSet<String>,
    kicked: Mutex<Vec<String>>,
}

impl FakeRoom {
    fn kicked(&self) -> Vec<String> {
        self.kicked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Room for FakeRoom {
    fn room_jid(&self) -> &Jid {
        &self.jid
    }

    fn is_occupant(&self, occupant: &Jid) -> bool {
        self.occupants.contains(&occupant.to_string())
    }

    async fn force_leave(&self, occupant: &Jid) -> anyhow::Result<()> {
        self.kicked.lock().unwrap().push(occupant.to_string());
        Ok(())
    }
}

struct FakeRegistry {
    rooms: Vec<Arc<FakeRoom>>,
}

#[async_trait]
impl RoomRegistry for FakeRegistry {
    async fn active_rooms(&self) -> Vec<Arc<dyn Room>> {
        self.rooms
            .iter()
            .map(|r| Arc::clone(r) as Arc<dyn Room>)
            .collect()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn room(jid: &str, occupants: &[&str]) -> Arc<FakeRoom> {
    Arc::new(FakeRoom {
        jid: jid.parse().unwrap(),
        occupants: occupants.iter().map(|s| s.to_string()).collect(),
        kicked: Mutex::new(Vec::new()),
    })
}

fn config() -> LivenessConfig {
    LivenessConfig {
        sweep_interval: Duration::from_secs(60),
        stale_after: Duration::from_secs(3600),
        max_probes_per_sweep: 1000,
        probe_timeout: Duration::from_secs(60),
    }
}

fn monitor_with(
    transport: Arc<RecordingTransport>,
    rooms: Vec<Arc<FakeRoom>>,
) -> LivenessMonitor {
    LivenessMonitor::new(config(), transport, Arc::new(FakeRegistry { rooms }))
}

fn alice_key() -> OccupantKey {
    OccupantKey::new("alice@a.example/phone".parse().unwrap(), "muc.example")
}

fn probe_result(probe: &ProbeRequest) -> Element {
    Element::new("iq")
        .with_attr("type", "result")
        .with_attr("id", probe.id.clone())
        .with_attr("from", probe.to.to_string())
        .with_attr("to", probe.from.to_string())
}

fn probe_error(probe: &ProbeRequest, condition: &str) -> Element {
    Element::new("iq")
        .with_attr("type", "error")
        .with_attr("id", probe.id.clone())
        .with_attr("from", probe.to.to_string())
        .with_attr("to", probe.from.to_string())
        .with_child(
            Element::new("error")
                .with_attr("type", "cancel")
                .with_child(Element::new(condition).with_attr("xmlns", STANZA_ERROR_NS)),
        )
}

/// An occupant silent past the threshold is probed; the timeout confirms it
/// as a ghost and evicts it from every room of its domain where it is still
/// present — and only from those.
#[tokio::test]
async fn test_silent_occupant_is_probed_and_evicted_on_timeout() {
    init_tracing();
    let lobby = room(
        "lobby@muc.example",
        &["alice@a.example/phone", "bob@b.example/pc"],
    );
    let kitchen = room("kitchen@muc.example", &["alice@a.example/phone"]);
    let foreign = room("hall@chat.example", &["alice@a.example/phone"]);
    let transport = RecordingTransport::new();
    let monitor = monitor_with(
        Arc::clone(&transport),
        vec![Arc::clone(&lobby), Arc::clone(&kitchen), Arc::clone(&foreign)],
    );

    // Tracked an hour and change ago, silent since.
    monitor
        .store()
        .upsert(&alice_key(), now_ms() - 3_700_000, Some("lobby"));

    assert_eq!(monitor.sweeper().sweep().await, 1);
    let probe = transport.sent().remove(0);
    assert_eq!(probe.to.to_string(), "alice@a.example/phone");
    assert_eq!(probe.from.to_string(), "lobby@muc.example");

    monitor.tracker().on_probe_timeout(&probe).await;

    assert!(!monitor.store().contains(&alice_key()));
    assert_eq!(lobby.kicked(), vec!["alice@a.example/phone".to_string()]);
    assert_eq!(kitchen.kicked(), vec!["alice@a.example/phone".to_string()]);
    assert!(foreign.kicked().is_empty());
}

/// A probe answered in time refreshes the entry; the next sweep stays quiet.
#[tokio::test]
async fn test_answered_probe_refreshes_and_quiets_next_sweep() {
    let lobby = room("lobby@muc.example", &["alice@a.example/phone"]);
    let transport = RecordingTransport::new();
    let monitor = monitor_with(Arc::clone(&transport), vec![Arc::clone(&lobby)]);

    let old = now_ms() - 3_700_000;
    monitor.store().upsert(&alice_key(), old, Some("lobby"));

    assert_eq!(monitor.sweeper().sweep().await, 1);
    let probe = transport.sent().remove(0);
    monitor.tracker().on_probe_response(&probe_result(&probe)).await;

    assert!(monitor.store().contains(&alice_key()));
    assert!(monitor.store().last_seen(&alice_key()).unwrap() > old);
    assert!(lobby.kicked().is_empty());

    assert_eq!(monitor.sweeper().sweep().await, 0);
    assert_eq!(transport.sent().len(), 1);
}

/// A probe answered with a terminal error condition behaves exactly like a
/// timeout: removal plus domain-scoped eviction.
#[tokio::test]
async fn test_terminal_error_answer_is_equivalent_to_timeout() {
    let lobby = room("lobby@muc.example", &["alice@a.example/phone"]);
    let transport = RecordingTransport::new();
    let monitor = monitor_with(Arc::clone(&transport), vec![Arc::clone(&lobby)]);

    monitor
        .store()
        .upsert(&alice_key(), now_ms() - 3_700_000, Some("lobby"));

    monitor.sweeper().sweep().await;
    let probe = transport.sent().remove(0);
    monitor
        .tracker()
        .on_probe_response(&probe_error(&probe, "remote-server-timeout"))
        .await;

    assert!(!monitor.store().contains(&alice_key()));
    assert_eq!(lobby.kicked(), vec!["alice@a.example/phone".to_string()]);
}

/// A response arriving after the identity was already dropped produces no
/// store mutation and no eviction.
#[tokio::test]
async fn test_late_answer_for_dropped_identity_is_noop() {
    let lobby = room("lobby@muc.example", &["alice@a.example/phone"]);
    let transport = RecordingTransport::new();
    let monitor = monitor_with(Arc::clone(&transport), vec![Arc::clone(&lobby)]);

    monitor
        .store()
        .upsert(&alice_key(), now_ms() - 3_700_000, Some("lobby"));
    monitor.sweeper().sweep().await;
    let probe = transport.sent().remove(0);

    // Explicit departure races ahead of the probe answer.
    monitor
        .tracker()
        .on_traffic(
            &Element::new("presence")
                .with_attr("from", "alice@a.example/phone")
                .with_attr("to", "lobby@muc.example/alice")
                .with_attr("type", "unavailable"),
        )
        .await;
    assert!(!monitor.store().contains(&alice_key()));

    monitor
        .tracker()
        .on_probe_response(&probe_error(&probe, "gone"))
        .await;
    monitor.tracker().on_probe_response(&probe_result(&probe)).await;

    assert!(!monitor.store().contains(&alice_key()));
    assert!(lobby.kicked().is_empty());
}

/// Presence traffic keeps an occupant alive end to end: joined occupants are
/// tracked, active occupants are never probed, departed occupants are
/// forgotten.
#[tokio::test]
async fn test_presence_lifecycle_without_probes() {
    let transport = RecordingTransport::new();
    let monitor = monitor_with(Arc::clone(&transport), vec![]);

    monitor
        .tracker()
        .on_traffic(
            &Element::new("presence")
                .with_attr("from", "alice@a.example/phone")
                .with_attr("to", "lobby@muc.example/alice"),
        )
        .await;
    assert!(monitor.store().contains(&alice_key()));

    assert_eq!(monitor.sweeper().sweep().await, 0);

    monitor
        .tracker()
        .on_traffic(
            &Element::new("presence")
                .with_attr("from", "alice@a.example/phone")
                .with_attr("to", "lobby@muc.example/alice")
                .with_attr("type", "unavailable"),
        )
        .await;
    assert!(monitor.store().is_empty());

    assert_eq!(monitor.sweeper().sweep().await, 0);
    assert!(transport.sent().is_empty());
}
