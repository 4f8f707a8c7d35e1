//! Run DTOs

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/runs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRun {
    pub project_id: String,
    pub language: String,
    pub code: String,
}

/// Response of `POST /v1/runs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunCreated {
    #[serde(default)]
    pub run_id: Option<String>,
}

impl RunCreated {
    /// The run identifier, only when present and non-blank
    pub fn id(&self) -> Option<&str> {
        self.run_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
