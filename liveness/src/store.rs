//! Concurrent last-activity store
//!
//! Maps tracked occupant identities to their last observed activity. This is
//! the single source of truth for "is this occupant considered alive". All
//! mutation is per-key atomic; unrelated identities never block each other.

use chrono::Utc;
use dashmap::DashMap;

use crate::identity::OccupantKey;

/// Current wall-clock time in milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Stored activity state for one tracked occupant.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    /// Last observed activity, wall-clock millis.
    pub last_seen_ms: i64,
    /// Localpart of the most recent room this occupant was seen in; used
    /// only to address outbound probes, never part of identity.
    pub room_hint: Option<String>,
}

/// A stale entry selected by [`ActivityStore::snapshot_stale`].
#[derive(Debug, Clone)]
pub struct StaleEntry {
    pub key: OccupantKey,
    pub last_seen_ms: i64,
    pub room_hint: Option<String>,
}

/// Concurrent map of tracked occupants to their last activity.
#[derive(Default)]
pub struct ActivityStore {
    entries: DashMap<OccupantKey, ActivityEntry>,
}

impl ActivityStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert or refresh an entry. The timestamp is monotone: a refresh
    /// carrying an older timestamp never regresses the stored one. A `Some`
    /// room hint replaces the stored hint; `None` preserves it.
    pub fn upsert(&self, key: &OccupantKey, timestamp_ms: i64, room_hint: Option<&str>) {
        let mut entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| ActivityEntry {
                last_seen_ms: timestamp_ms,
                room_hint: None,
            });
        if timestamp_ms > entry.last_seen_ms {
            entry.last_seen_ms = timestamp_ms;
        }
        if let Some(room) = room_hint {
            entry.room_hint = Some(room.to_string());
        }
    }

    /// Remove an entry; returns whether it was present.
    pub fn remove(&self, key: &OccupantKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &OccupantKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn last_seen(&self, key: &OccupantKey) -> Option<i64> {
        self.entries.get(key).map(|e| e.last_seen_ms)
    }

    pub fn room_hint(&self, key: &OccupantKey) -> Option<String> {
        self.entries.get(key).and_then(|e| e.room_hint.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with activity strictly before `threshold_ms`, capped at
    /// `limit` to bound a single sweep's probe burst. Iteration order of the
    /// underlying map; may race with concurrent writes (an entry returned as
    /// stale can be refreshed moments later — the duplicate probe that
    /// results is handled idempotently by the tracker).
    pub fn snapshot_stale(&self, threshold_ms: i64, limit: usize) -> Vec<StaleEntry> {
        let mut stale = Vec::new();
        for item in self.entries.iter() {
            if stale.len() >= limit {
                break;
            }
            if item.value().last_seen_ms < threshold_ms {
                stale.push(StaleEntry {
                    key: item.key().clone(),
                    last_seen_ms: item.value().last_seen_ms,
                    room_hint: item.value().room_hint.clone(),
                });
            }
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn key(n: u32) -> OccupantKey {
        OccupantKey::new(
            format!("user{}@a.example/res", n).parse().unwrap(),
            "muc.example",
        )
    }

    #[test]
    fn test_upsert_creates_and_refreshes() {
        let store = ActivityStore::new();
        let k = key(1);

        assert!(!store.contains(&k));
        store.upsert(&k, 1_000, Some("room"));
        assert!(store.contains(&k));
        assert_eq!(store.last_seen(&k), Some(1_000));

        store.upsert(&k, 2_000, None);
        assert_eq!(store.last_seen(&k), Some(2_000));
    }

    #[test]
    fn test_refresh_never_regresses_timestamp() {
        let store = ActivityStore::new();
        let k = key(1);
        store.upsert(&k, 5_000, None);
        store.upsert(&k, 3_000, None);
        assert_eq!(store.last_seen(&k), Some(5_000));
    }

    #[test]
    fn test_hint_update_does_not_fragment_map() {
        let store = ActivityStore::new();
        store.upsert(&key(1), 1_000, Some("lobby"));
        store.upsert(&key(1), 2_000, Some("kitchen"));
        store.upsert(&key(1), 3_000, None);

        assert_eq!(store.len(), 1);
        assert_eq!(store.room_hint(&key(1)), Some("kitchen".to_string()));
    }

    #[test]
    fn test_remove() {
        let store = ActivityStore::new();
        let k = key(1);
        store.upsert(&k, 1_000, None);
        assert!(store.remove(&k));
        assert!(!store.contains(&k));
        assert!(!store.remove(&k));
    }

    #[test]
    fn test_snapshot_stale_respects_threshold() {
        let store = ActivityStore::new();
        store.upsert(&key(1), 1_000, None);
        store.upsert(&key(2), 5_000, None);
        store.upsert(&key(3), 9_000, None);

        let stale = store.snapshot_stale(6_000, 100);
        let mut seen: Vec<i64> = stale.iter().map(|e| e.last_seen_ms).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1_000, 5_000]);
    }

    #[test]
    fn test_snapshot_stale_respects_limit() {
        let store = ActivityStore::new();
        for n in 0..50 {
            store.upsert(&key(n), 1_000, None);
        }
        assert_eq!(store.snapshot_stale(2_000, 10).len(), 10);
        assert_eq!(store.snapshot_stale(2_000, 100).len(), 50);
    }

    #[test]
    fn test_snapshot_stale_excludes_boundary() {
        let store = ActivityStore::new();
        store.upsert(&key(1), 6_000, None);
        assert!(store.snapshot_stale(6_000, 10).is_empty());
    }

    #[test]
    fn test_concurrent_upserts_single_key() {
        let store = Arc::new(ActivityStore::new());
        let mut handles = Vec::new();
        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for i in 0..200 {
                    store.upsert(&key(1), (t * 1_000 + i) as i64, Some("room"));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.last_seen(&key(1)), Some(7_199));
    }
}
