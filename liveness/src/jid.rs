//! Structured addresses for the federated presence protocol
//!
//! A [`Jid`] is `localpart@domain/resource` with both side parts optional.
//! The bare part (localpart + domain) names an account or a room; the
//! resource names a single device or occupant session behind it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error types for address parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JidError {
    #[error("empty address")]
    Empty,

    #[error("address has an empty domain: {0:?}")]
    EmptyDomain(String),

    #[error("address has an empty localpart: {0:?}")]
    EmptyLocalpart(String),

    #[error("address has an empty resource: {0:?}")]
    EmptyResource(String),
}

/// A parsed federated address.
///
/// Equality and hashing cover all three parts, so a full address and its
/// bare form are distinct keys. Use [`Jid::bare`] to normalize.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid {
    localpart: Option<String>,
    domain: String,
    resource: Option<String>,
}

impl Jid {
    /// Assemble an address from its parts, validating non-emptiness.
    pub fn from_parts(
        localpart: Option<&str>,
        domain: &str,
        resource: Option<&str>,
    ) -> Result<Self, JidError> {
        if domain.is_empty() {
            return Err(JidError::EmptyDomain(format!(
                "{}@{}",
                localpart.unwrap_or(""),
                domain
            )));
        }
        if let Some(l) = localpart {
            if l.is_empty() {
                return Err(JidError::EmptyLocalpart(domain.to_string()));
            }
        }
        if let Some(r) = resource {
            if r.is_empty() {
                return Err(JidError::EmptyResource(domain.to_string()));
            }
        }
        Ok(Self {
            localpart: localpart.map(String::from),
            domain: domain.to_string(),
            resource: resource.map(String::from),
        })
    }

    pub fn localpart(&self) -> Option<&str> {
        self.localpart.as_deref()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// The address with the resource stripped.
    pub fn bare(&self) -> Jid {
        Jid {
            localpart: self.localpart.clone(),
            domain: self.domain.clone(),
            resource: None,
        }
    }

    pub fn is_bare(&self) -> bool {
        self.resource.is_none()
    }
}

impl FromStr for Jid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(JidError::Empty);
        }

        let (bare, resource) = match s.split_once('/') {
            Some((bare, resource)) => {
                if resource.is_empty() {
                    return Err(JidError::EmptyResource(s.to_string()));
                }
                (bare, Some(resource))
            }
            None => (s, None),
        };

        let (localpart, domain) = match bare.split_once('@') {
            Some((local, domain)) => {
                if local.is_empty() {
                    return Err(JidError::EmptyLocalpart(s.to_string()));
                }
                (Some(local), domain)
            }
            None => (None, bare),
        };

        if domain.is_empty() {
            return Err(JidError::EmptyDomain(s.to_string()));
        }

        Ok(Jid {
            localpart: localpart.map(String::from),
            domain: domain.to_string(),
            resource: resource.map(String::from),
        })
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(local) = &self.localpart {
            write!(f, "{}@", local)?;
        }
        write!(f, "{}", self.domain)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{}", resource)?;
        }
        Ok(())
    }
}
