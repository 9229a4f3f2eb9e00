//! Error types for GitLab client operations.

use reqwest::StatusCode;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitLab client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The GitLab API answered with a non-success status code.
    #[error("GitLab API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Authentication was rejected by GitLab.
    #[error("Failed to authenticate with GitLab: {0}")]
    AuthError(String),

    /// The client could not be constructed, usually because the API base URL
    /// override is not a valid absolute URL.
    #[error("Failed to construct GitLab client: {0}")]
    ClientConstruction(String),

    /// Error deserializing the response from GitLab.
    #[error("Failed to deserialize GitLab response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The access token cannot be sent as an HTTP header value.
    #[error("The GitLab access token contains characters that are not allowed in a header")]
    InvalidToken,

    /// The GitLab API returned a response that cannot be followed, such as a
    /// pagination header pointing backwards.
    #[error("Invalid GitLab response: {0}")]
    InvalidResponse(String),

    /// The requested resource was not found.
    #[error("Resource not found")]
    NotFound,

    /// GitLab API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The request could not be delivered to GitLab (connection, TLS, timeout).
    #[error("Failed to reach the GitLab API: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    /// Returns `true` for errors that may succeed when the same request is
    /// issued again later.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::ApiError { status, .. } => *status >= 500,
            Error::RateLimitExceeded | Error::Transport(_) => true,
            _ => false,
        }
    }

    /// Builds an error from a GitLab status code and message.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::NOT_FOUND => Error::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimitExceeded,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::AuthError(message),
            _ => Error::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}
