//! Argument and result types shared by every host.
//!
//! # Design
//! Records stay opaque: each host has its own row shape, so the client hands
//! back the decoded JSON value, the XML element, or the raw body and leaves
//! field access to the caller. `Record` derives `Serialize` so callers can
//! re-emit results uniformly.

use serde::Serialize;

use crate::error::ApiError;

/// Outcome of a request against a recognized host.
pub type ApiResult = Result<Vec<Record>, ApiError>;

/// Query arguments in insertion order.
///
/// Inserting an existing key replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArguments {
    entries: Vec<(String, String)>,
}

impl QueryArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Builder form of `insert`.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for QueryArguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = QueryArguments::new();
        for (k, v) in iter {
            args.insert(k.as_ref(), v.as_ref());
        }
        args
    }
}

/// One row of data returned by a host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// An entry from the primary host's `d` payload.
    Json(serde_json::Value),
    /// A child element of the secondary host's document root.
    Xml(XmlElement),
    /// The quarry host's response body, untouched.
    Raw(String),
}

impl Record {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Record::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            Record::Xml(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Record::Raw(body) => Some(body),
            _ => None,
        }
    }
}

/// An owned XML element: name, attributes in document order, trimmed text
/// and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child element called `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }
}
