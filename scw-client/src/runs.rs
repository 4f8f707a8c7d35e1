//! Run endpoints

use crate::ScwClient;
use crate::error::{ClientError, Result};
use reqwest::Url;
use scw_core::domain::run::RunStatus;
use scw_core::dto::run::{CreateRun, RunCreated};
use tracing::debug;

impl ScwClient {
    /// Submit a unit of work and return the run identifier
    ///
    /// Same dual success condition as project creation: a success status
    /// and a non-empty `run_id`.
    pub async fn submit_run(&self, req: &CreateRun) -> Result<String> {
        let url = self.base_url.join("/v1/runs");
        debug!("POST {} (project {})", url, req.project_id);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_identified(response, RunCreated::id).await
    }

    /// Fetch the current status of a run
    ///
    /// The id is sent as a single escaped path segment.
    pub async fn run_status(&self, run_id: &str) -> Result<RunStatus> {
        if matches!(run_id, "" | "." | "..") {
            return Err(ClientError::InvalidUrl(format!("bad run id '{}'", run_id)));
        }

        let mut url = Url::parse(&self.base_url.join("/v1/runs"))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl("endpoint cannot be a base".to_string()))?
            .push(run_id);
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }
}
