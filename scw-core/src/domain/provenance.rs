//! Endpoint provenance

use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes how the current endpoint was obtained
///
/// Exactly one value is associated with the current endpoint. It is
/// overwritten whenever the endpoint changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Value baked in at build or deploy time
    BuiltInConfig,
    /// Value read back from the preference store
    PersistedPreference,
    /// Derived from the host name of the current browsing context
    HostNameHeuristic,
    /// Reported by the same-origin `/whoami` endpoint
    SameOriginProbe,
    /// Typed in and committed by the user
    ManualEntry,
    /// Nothing resolved
    #[default]
    None,
}

impl Provenance {
    /// Stable tag, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::BuiltInConfig => "built-in-config",
            Provenance::PersistedPreference => "persisted-preference",
            Provenance::HostNameHeuristic => "host-name-heuristic",
            Provenance::SameOriginProbe => "same-origin-probe",
            Provenance::ManualEntry => "manual-entry",
            Provenance::None => "none",
        }
    }

    /// Short human-readable description
    pub fn describe(&self) -> &'static str {
        match self {
            Provenance::BuiltInConfig => "built-in configuration",
            Provenance::PersistedPreference => "saved value",
            Provenance::HostNameHeuristic => "host heuristic",
            Provenance::SameOriginProbe => "same-origin /whoami",
            Provenance::ManualEntry => "manual input",
            Provenance::None => "none",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_serializes_as_tag() {
        let json = serde_json::to_string(&Provenance::HostNameHeuristic).unwrap();
        assert_eq!(json, "\"host-name-heuristic\"");
        assert_eq!(
            Provenance::HostNameHeuristic.to_string(),
            "host-name-heuristic"
        );
    }

    #[test]
    fn test_provenance_default_is_none() {
        assert_eq!(Provenance::default(), Provenance::None);
    }
}
