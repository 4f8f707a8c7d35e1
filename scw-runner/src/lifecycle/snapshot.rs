//! Observable state of one lifecycle instance

use chrono::{DateTime, Utc};
use scw_core::Endpoint;
use scw_core::domain::run::{Phase, RunRequest, RunStatus};
use serde::Serialize;
use tracing::{info, warn};

/// State of a lifecycle instance as seen by observers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSnapshot {
    /// Monotonic instance number; 0 before any run was initiated
    pub instance: u64,
    /// Endpoint the instance is bound to
    pub endpoint: Endpoint,
    pub phase: Phase,
    /// Empty until project creation succeeds
    pub project_id: String,
    /// Empty until run submission succeeds
    pub run_id: String,
    /// Most recent status payload
    pub last_payload: Option<RunStatus>,
    /// Human-readable progress text
    pub status_message: String,
    pub request: Option<RunRequest>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSnapshot {
    /// An instance that never left `Idle`
    pub fn idle(instance: u64, message: impl Into<String>) -> Self {
        Self {
            instance,
            status_message: message.into(),
            ..Self::default()
        }
    }

    /// A fresh instance about to start probing
    pub fn started(instance: u64, endpoint: Endpoint, request: RunRequest) -> Self {
        Self {
            instance,
            endpoint,
            request: Some(request),
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    /// Moves to `phase`, refusing backward moves and moves out of a final phase
    ///
    /// Returns whether the snapshot changed.
    pub fn advance(&mut self, phase: Phase, message: impl Into<String>) -> bool {
        if !self.phase.can_advance_to(phase) {
            warn!(
                "Run #{}: refusing transition {} -> {}",
                self.instance, self.phase, phase
            );
            return false;
        }

        let message = message.into();
        if self.phase != phase {
            info!(
                "Run #{}: {} -> {} ({})",
                self.instance, self.phase, phase, message
            );
        }

        self.phase = phase;
        self.status_message = message;
        if phase.is_finished() {
            self.finished_at = Some(Utc::now());
        }
        true
    }

    /// Wall time between start and finish
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.finished_at?.signed_duration_since(self.started_at?))
    }
}
