//! Error types for the SCW client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Maximum number of characters of a response body kept for diagnosis
pub const BODY_EXCERPT_CHARS: usize = 200;

/// Errors that can occur when using the SCW client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, connection refused, timeout)
    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Remote answered with a non-success status code
    #[error("HTTP {status}: {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Excerpt of the response body
        message: String,
    },

    /// Remote answered with success but the body lacks the expected field
    #[error("unexpected response shape (HTTP {status}): {body}")]
    ContractViolation {
        /// HTTP status code
        status: u16,
        /// Excerpt of the response body
        body: String,
    },

    /// Failed to parse response
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// Request URL could not be built from the endpoint and arguments
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create an API error from status code and raw body
    pub fn api_error(status: u16, body: &str) -> Self {
        Self::ApiError {
            status,
            message: excerpt(body),
        }
    }

    /// Create a contract violation from status code and raw body
    pub fn contract_violation(status: u16, body: &str) -> Self {
        Self::ContractViolation {
            status,
            body: excerpt(body),
        }
    }

    /// HTTP status carried by the error, if the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } | Self::ContractViolation { status, .. } => Some(*status),
            Self::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            Self::ParseError(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Check if the request never got an HTTP answer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(e) if e.status().is_none())
    }

    /// Check if the request hit the per-call timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestFailed(e) if e.is_timeout())
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

/// First [`BODY_EXCERPT_CHARS`] characters of a response body
pub fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
