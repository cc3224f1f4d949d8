/*!
 * Error types for the lintra library.
 *
 * This module contains custom error types for different parts of the library,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when calling a translation provider API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the provider rejected the credential itself (HTTP 401/403)
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationError(_))
    }

    /// Classify an HTTP error status into a provider error
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors that can terminate a whole translation job
///
/// Per-chunk failures never surface here: after retry exhaustion a chunk
/// degrades to its original text. A job only fails as a whole for the
/// conditions below.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// No credentials were supplied for the job
    #[error("no credentials available for translation")]
    NoCredentials,

    /// Every supplied credential was rejected by the provider
    #[error("all {0} credentials were rejected by the provider")]
    AllCredentialsRejected(usize),

    /// The job was abandoned through its cancellation token
    #[error("translation job cancelled")]
    Cancelled,

    /// Error from a provider that escaped chunk-level handling
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl From<std::io::Error> for OrchestratorError {
    fn from(error: std::io::Error) -> Self {
        Self::Provider(ProviderError::ConnectionError(error.to_string()))
    }
}
