//! Minimal in-memory stanza element model
//!
//! Just enough structure for error classification and probe construction:
//! an element name, flat attributes, and child elements. Wire serialization
//! belongs to the transport, not to this crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace of standard stanza error conditions.
pub const STANZA_ERROR_NS: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";

/// Namespace of the liveness probe payload.
pub const PING_NS: &str = "urn:xmpp:ping";

/// An in-memory stanza element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First value of the named attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Builder form of [`add_child`](Self::add_child).
    pub fn with_child(mut self, child: Element) -> Self {
        self.add_child(child);
        self
    }

    /// First child with the given element name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// The `xmlns` attribute, if declared on this element.
    pub fn xmlns(&self) -> Option<&str> {
        self.attr("xmlns")
    }

    pub fn is_presence(&self) -> bool {
        self.name == "presence"
    }
}

fn escape(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::new();
        s.push('<');
        s.push_str(&self.name);
        for (n, v) in &self.attrs {
            s.push(' ');
            s.push_str(n);
            s.push_str("=\"");
            escape(v, &mut s);
            s.push('"');
        }
        if self.children.is_empty() {
            s.push_str("/>");
            return f.write_str(&s);
        }
        s.push('>');
        f.write_str(&s)?;
        for c in &self.children {
            write!(f, "{}", c)?;
        }
        write!(f, "</{}>", self.name)
    }
}
