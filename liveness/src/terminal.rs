//! Terminal stanza-error conditions
//!
//! The closed set of protocol error conditions treated as proof that the
//! remote party is unreachable. Anything outside this set is noise, not a
//! departure signal.

use serde::{Deserialize, Serialize};

use crate::stanza::{Element, STANZA_ERROR_NS};

/// A stanza-error condition equivalent to an explicit departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalCondition {
    Gone,
    ItemNotFound,
    RecipientUnavailable,
    Redirect,
    RemoteServerNotFound,
    RemoteServerTimeout,
}

impl TerminalCondition {
    /// The full vocabulary, for membership tests by other components.
    pub const ALL: [TerminalCondition; 6] = [
        Self::Gone,
        Self::ItemNotFound,
        Self::RecipientUnavailable,
        Self::Redirect,
        Self::RemoteServerNotFound,
        Self::RemoteServerTimeout,
    ];

    /// Wire name of the condition element.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gone => "gone",
            Self::ItemNotFound => "item-not-found",
            Self::RecipientUnavailable => "recipient-unavailable",
            Self::Redirect => "redirect",
            Self::RemoteServerNotFound => "remote-server-not-found",
            Self::RemoteServerTimeout => "remote-server-timeout",
        }
    }

    /// Look up a condition by its wire name. `None` for anything outside
    /// the closed set.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    /// Classify a stanza. Returns a condition only when the stanza is of
    /// type `"error"`, carries an `error` child, and that child holds a
    /// condition element in the standard stanza-error namespace whose name
    /// is in the closed set. Children are scanned in order; first match
    /// wins. Every other shape is "no signal", which is the common case.
    pub fn from_stanza(stanza: &Element) -> Option<Self> {
        if stanza.attr("type") != Some("error") {
            return None;
        }
        let error = stanza.child("error")?;
        error
            .children()
            .iter()
            .filter(|reason| reason.xmlns() == Some(STANZA_ERROR_NS))
            .find_map(|reason| Self::from_name(reason.name()))
    }
}

impl std::fmt::Display for TerminalCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
