//! Project endpoints

use crate::ScwClient;
use crate::error::Result;
use scw_core::dto::project::{CreateProject, ProjectCreated};
use tracing::debug;

impl ScwClient {
    /// Create a project and return its identifier
    ///
    /// A success status without a non-empty `project_id` in the body is a
    /// [`ClientError::ContractViolation`](crate::ClientError::ContractViolation).
    pub async fn create_project(&self, name: &str) -> Result<String> {
        let url = self.base_url.join("/v1/projects");
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(&CreateProject {
                name: name.to_string(),
            })
            .send()
            .await?;

        self.handle_identified(response, ProjectCreated::id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::BODY_EXCERPT_CHARS;
    use crate::test_server::serve_once;
    use crate::{ClientError, ScwClient};

    #[tokio::test]
    async fn test_create_project() {
        let (endpoint, request) = serve_once("200 OK", r#"{"project_id":"p1"}"#).await;
        let client = ScwClient::new(endpoint);

        assert_eq!(client.create_project("Auto Smoke").await.unwrap(), "p1");

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /v1/projects "));
        assert!(request.ends_with(r#"{"name":"Auto Smoke"}"#));
    }

    #[tokio::test]
    async fn test_create_project_missing_id_is_contract_violation() {
        let (endpoint, _request) = serve_once("200 OK", "{}").await;
        let client = ScwClient::new(endpoint);

        let err = client.create_project("Auto Smoke").await.unwrap_err();
        match err {
            ClientError::ContractViolation { status, body } => {
                assert_eq!(status, 200);
                assert_eq!(body, "{}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_project_non_json_success() {
        let (endpoint, _request) = serve_once("200 OK", "<html>proxy</html>").await;
        let client = ScwClient::new(endpoint);

        let err = client.create_project("Auto Smoke").await.unwrap_err();
        assert!(matches!(err, ClientError::ContractViolation { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_create_project_http_error_body_is_bounded() {
        let body = "e".repeat(1000);
        let (endpoint, _request) = serve_once("500 Internal Server Error", &body).await;
        let client = ScwClient::new(endpoint);

        let err = client.create_project("Auto Smoke").await.unwrap_err();
        match err {
            ClientError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message.len(), BODY_EXCERPT_CHARS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
