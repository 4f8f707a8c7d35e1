//! Service seam
//!
//! Components that talk to the remote service depend on [`ScwService`]
//! rather than on [`ScwClient`] directly, and get instances bound to a
//! particular endpoint from a [`Connector`].

use async_trait::async_trait;
use reqwest::Client;
use scw_core::Endpoint;
use scw_core::domain::run::RunStatus;
use scw_core::dto::run::CreateRun;
use scw_core::dto::system::WhoAmI;
use std::sync::Arc;
use std::time::Duration;

use crate::ScwClient;
use crate::error::Result;

/// Calls of the remote service contract, bound to one endpoint
#[async_trait]
pub trait ScwService: Send + Sync {
    /// The endpoint this instance talks to
    fn endpoint(&self) -> &Endpoint;

    /// `GET /healthz`; any 2xx is healthy
    async fn health(&self) -> Result<()>;

    /// `GET /whoami`
    async fn whoami(&self) -> Result<WhoAmI>;

    /// `POST /v1/projects`, returning the non-empty project identifier
    async fn create_project(&self, name: &str) -> Result<String>;

    /// `POST /v1/runs`, returning the non-empty run identifier
    async fn submit_run(&self, req: &CreateRun) -> Result<String>;

    /// `GET /v1/runs/{run_id}`
    async fn run_status(&self, run_id: &str) -> Result<RunStatus>;
}

#[async_trait]
impl ScwService for ScwClient {
    fn endpoint(&self) -> &Endpoint {
        self.base_url()
    }

    async fn health(&self) -> Result<()> {
        ScwClient::health(self).await
    }

    async fn whoami(&self) -> Result<WhoAmI> {
        ScwClient::whoami(self).await
    }

    async fn create_project(&self, name: &str) -> Result<String> {
        ScwClient::create_project(self, name).await
    }

    async fn submit_run(&self, req: &CreateRun) -> Result<String> {
        ScwClient::submit_run(self, req).await
    }

    async fn run_status(&self, run_id: &str) -> Result<RunStatus> {
        ScwClient::run_status(self, run_id).await
    }
}

/// Produces services bound to an endpoint
pub trait Connector: Send + Sync {
    fn connect(&self, endpoint: &Endpoint) -> Arc<dyn ScwService>;
}

/// Connector backed by a shared reqwest client
///
/// Every call made through its services is bounded by the client timeout.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    client: Client,
}

impl HttpConnector {
    /// Creates a connector whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Connector for HttpConnector {
    fn connect(&self, endpoint: &Endpoint) -> Arc<dyn ScwService> {
        Arc::new(ScwClient::with_client(endpoint.clone(), self.client.clone()))
    }
}
