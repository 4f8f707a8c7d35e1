//! Endpoint type and URL normalization
//!
//! An endpoint is the base URL of the remote service. It never carries
//! trailing `/` characters, and the empty endpoint means "unresolved".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonicalize an endpoint string
///
/// Surrounding whitespace is dropped and every trailing `/` is stripped.
/// Blank input yields an empty string.
pub fn normalize(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Normalized base URL of the remote service
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Endpoint(String);

impl Endpoint {
    /// Create an endpoint from raw user or configuration input
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    /// The unresolved endpoint
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `Some` only when the normalized input is non-blank
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        let endpoint = Self::new(raw);
        (!endpoint.is_empty()).then_some(endpoint)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build an absolute URL for a path relative to this endpoint
    ///
    /// `path` is expected to start with `/`.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl From<String> for Endpoint {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Endpoint {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.0
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
