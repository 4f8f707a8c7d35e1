//! SCW HTTP Client
//!
//! A small, type-safe HTTP client for the remote SCW service.
//!
//! The service is consumed as a black box through five calls:
//! - `GET /healthz` and the same-origin `GET /whoami` (discovery & health)
//! - `POST /v1/projects` (project creation)
//! - `POST /v1/runs` and `GET /v1/runs/{run_id}` (run submission & status)
//!
//! Components that drive these calls depend on the [`ScwService`] trait and
//! obtain instances through a [`Connector`], so tests can swap in fakes.
//!
//! # Example
//!
//! ```no_run
//! use scw_client::ScwClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ScwClient::new("https://scw-api.onrender.com");
//!
//!     client.health().await?;
//!     let project_id = client.create_project("Auto Smoke").await?;
//!
//!     println!("Created project: {}", project_id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod projects;
mod runs;
mod service;
mod system;

#[cfg(test)]
mod test_server;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use service::{Connector, HttpConnector, ScwService};

use reqwest::Client;
use scw_core::Endpoint;
use serde::de::DeserializeOwned;

/// HTTP client bound to one SCW endpoint
#[derive(Debug, Clone)]
pub struct ScwClient {
    /// Base URL of the service (e.g., "https://scw-api.onrender.com")
    base_url: Endpoint,
    /// HTTP client instance
    client: Client,
}

impl ScwClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the service; trailing `/` are stripped
    ///
    /// # Example
    /// ```
    /// use scw_client::ScwClient;
    ///
    /// let client = ScwClient::new("http://localhost:8000/");
    /// assert_eq!(client.base_url().as_str(), "http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<Endpoint>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use scw_client::ScwClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(5))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ScwClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<Endpoint>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &Endpoint {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success statuses become [`ClientError::ApiError`] carrying a body
    /// excerpt.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content of interest
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), &error_text));
        }

        Ok(())
    }

    /// Handle a response whose body must carry an identifier field
    ///
    /// The raw body is read first so that both failure shapes (HTTP error and
    /// success without the field) can report the status and a body excerpt.
    async fn handle_identified<T, F>(&self, response: reqwest::Response, extract: F) -> Result<String>
    where
        T: DeserializeOwned,
        F: FnOnce(&T) -> Option<&str>,
    {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), &text));
        }

        serde_json::from_str::<T>(&text)
            .ok()
            .as_ref()
            .and_then(extract)
            .map(str::to_string)
            .ok_or_else(|| ClientError::contract_violation(status.as_u16(), &text))
    }
}
