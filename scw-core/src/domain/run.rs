//! Run lifecycle domain types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Terminal marker reported by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalStatus {
    Completed,
    Failed,
}

impl TerminalStatus {
    /// Parse a raw status string; non-terminal values yield `None`
    pub fn from_status(status: &str) -> Option<Self> {
        match status {
            "completed" => Some(TerminalStatus::Completed),
            "failed" => Some(TerminalStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalStatus::Completed => "completed",
            TerminalStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of one run lifecycle instance
///
/// Phases only move forward. `Terminal` and `Aborted` are final.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "outcome")]
pub enum Phase {
    #[default]
    Idle,
    Probing,
    CreatingProject,
    Submitting,
    Polling,
    Terminal(TerminalStatus),
    Aborted,
}

impl Phase {
    /// Position in the forward-only ordering
    fn rank(&self) -> u8 {
        match self {
            Phase::Idle => 0,
            Phase::Probing => 1,
            Phase::CreatingProject => 2,
            Phase::Submitting => 3,
            Phase::Polling => 4,
            Phase::Terminal(_) | Phase::Aborted => 5,
        }
    }

    /// True for `Terminal(_)` and `Aborted`
    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Terminal(_) | Phase::Aborted)
    }

    /// True while a lifecycle task is driving this phase
    pub fn is_in_flight(&self) -> bool {
        !self.is_finished() && *self != Phase::Idle
    }

    /// Whether moving from `self` to `next` respects the forward-only rule
    ///
    /// `Polling -> Polling` is allowed so each poll tick can refresh the
    /// payload without changing phase.
    pub fn can_advance_to(&self, next: Phase) -> bool {
        if self.is_finished() {
            return false;
        }
        match next {
            Phase::Aborted => true,
            Phase::Polling if *self == Phase::Polling => true,
            _ => next.rank() > self.rank(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => f.write_str("Idle"),
            Phase::Probing => f.write_str("Probing"),
            Phase::CreatingProject => f.write_str("CreatingProject"),
            Phase::Submitting => f.write_str("Submitting"),
            Phase::Polling => f.write_str("Polling"),
            Phase::Terminal(status) => write!(f, "Terminal({})", status),
            Phase::Aborted => f.write_str("Aborted"),
        }
    }
}

/// Status payload returned by `GET /v1/runs/{run_id}`
///
/// Fields this client does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl RunStatus {
    /// Terminal marker carried by this payload, if any
    pub fn terminal(&self) -> Option<TerminalStatus> {
        TerminalStatus::from_status(&self.status)
    }

    /// Result rendered as text; strings are returned without quotes
    pub fn result_text(&self) -> Option<String> {
        match &self.result {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// The unit of work a lifecycle submits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Name given to the project created for this run
    pub project_name: String,
    /// Task-kind tag sent as `language`
    pub language: String,
    /// User-provided payload sent as `code`
    pub code: String,
}

impl RunRequest {
    pub fn new(
        project_name: impl Into<String>,
        language: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            language: language.into(),
            code: code.into(),
        }
    }
}

impl Default for RunRequest {
    fn default() -> Self {
        Self::new("Auto Smoke", "python", "print('auto smoke run')")
    }
}
