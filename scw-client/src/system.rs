//! Discovery and health endpoints

use crate::ScwClient;
use crate::error::Result;
use scw_core::dto::system::WhoAmI;
use tracing::debug;

impl ScwClient {
    // =============================================================================
    // Health & Discovery
    // =============================================================================

    /// Check that the service is reachable and healthy
    ///
    /// Succeeds on any 2xx answer from `GET /healthz`.
    pub async fn health(&self) -> Result<()> {
        let url = self.base_url.join("/healthz");
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        self.handle_empty_response(response).await
    }

    /// Ask the server at this base URL where the API lives
    ///
    /// Used against the UI origin for the same-origin discovery probe.
    pub async fn whoami(&self) -> Result<WhoAmI> {
        let url = self.base_url.join("/whoami");
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_server::{closed_endpoint, serve_once};
    use crate::{ClientError, ScwClient};

    #[tokio::test]
    async fn test_health_ok() {
        let (endpoint, request) = serve_once("200 OK", r#"{"status":"ok"}"#).await;
        let client = ScwClient::new(endpoint);

        client.health().await.unwrap();
        assert!(request.await.unwrap().starts_with("GET /healthz "));
    }

    #[tokio::test]
    async fn test_health_reports_status() {
        let (endpoint, _request) =
            serve_once("503 Service Unavailable", r#"{"detail":"unhealthy"}"#).await;
        let client = ScwClient::new(endpoint);

        let err = client.health().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_health_transport_failure() {
        let client = ScwClient::new(closed_endpoint().await);

        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_whoami_parses_url() {
        let (endpoint, _request) = serve_once(
            "200 OK",
            r#"{"url":"https://scw-api.onrender.com","service":"scw-api"}"#,
        )
        .await;
        let client = ScwClient::new(endpoint);

        let who = client.whoami().await.unwrap();
        assert_eq!(who.url.as_deref(), Some("https://scw-api.onrender.com"));
    }
}
