//! Project DTOs

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/projects`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
}

/// Response of `POST /v1/projects`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectCreated {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ProjectCreated {
    /// The project identifier, only when present and non-blank
    pub fn id(&self) -> Option<&str> {
        self.project_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_created_requires_id() {
        let empty: ProjectCreated = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.id(), None);

        let blank: ProjectCreated = serde_json::from_str(r#"{"project_id":"  "}"#).unwrap();
        assert_eq!(blank.id(), None);

        let ok: ProjectCreated =
            serde_json::from_str(r#"{"project_id":"p1","name":"Auto Smoke"}"#).unwrap();
        assert_eq!(ok.id(), Some("p1"));
    }
}
