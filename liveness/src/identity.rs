//! Composite occupant identity used as the activity store key
//!
//! An occupant is tracked per (source address, service domain) pair. Identity
//! is defined by the canonical textual form of that pair, so two keys built
//! independently from equal addresses collide correctly in the map.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::jid::Jid;

/// Immutable identity of a tracked occupant.
#[derive(Debug, Clone)]
pub struct OccupantKey {
    source: Jid,
    domain: String,
    cache_key: String,
}

impl OccupantKey {
    pub fn new(source: Jid, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        let cache_key = format!("{}:{}", source, domain);
        Self {
            source,
            domain,
            cache_key,
        }
    }

    /// The remote party being tracked (usually a full address with resource).
    pub fn source(&self) -> &Jid {
        &self.source
    }

    /// The local service domain the occupant interacts with.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Canonical textual form; the sole basis of equality and hashing.
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }
}

impl PartialEq for OccupantKey {
    fn eq(&self, other: &Self) -> bool {
        self.cache_key == other.cache_key
    }
}

impl Eq for OccupantKey {}

impl Hash for OccupantKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cache_key.hash(state);
    }
}

impl fmt::Display for OccupantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key)
    }
}
