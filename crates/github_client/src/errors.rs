//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when managing repository
//! webhooks through the GitHub REST API. Each variant carries enough context for
//! the caller to decide whether the failure is worth retrying.

use http::StatusCode;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.find_repository_hook("acme", "widgets", "https://ci.example.com/hook").await {
///     Ok(hook) => println!("Hook present: {}", hook.is_some()),
///     Err(Error::RateLimitExceeded) => eprintln!("Rate limit exceeded, retry later"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The GitHub API answered with a non-success status code.
    ///
    /// The status code and the message returned by GitHub are kept so that the
    /// caller can tell server-side failures (5xx) from rejected requests (4xx).
    #[error("GitHub API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Authentication was rejected by GitHub.
    ///
    /// This error occurs when the token is invalid, expired or lacks the
    /// permission to manage repository webhooks.
    #[error("Failed to authenticate with GitHub: {0}")]
    AuthError(String),

    /// The client could not be constructed.
    ///
    /// Returned by the client factory when the API base URL override is not a
    /// valid absolute URL or the underlying HTTP stack cannot be built.
    #[error("Failed to construct GitHub client: {0}")]
    ClientConstruction(String),

    /// Error deserializing the response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The GitHub API returned a response in an unexpected format.
    #[error("Invalid response format")]
    InvalidResponse,

    /// The requested resource was not found.
    ///
    /// GitHub answers 404 both for missing resources and for resources the
    /// token is not allowed to see.
    #[error("Resource not found")]
    NotFound,

    /// GitHub API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The request could not be delivered to GitHub (connection, TLS, timeout).
    #[error("Failed to reach the GitHub API: {0}")]
    Transport(String),
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

    /// Builds an error from a GitHub status code and message.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::NOT_FOUND => Error::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimitExceeded,
            StatusCode::FORBIDDEN if message.to_lowercase().contains("rate limit") => {
                Error::RateLimitExceeded
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::AuthError(message),
            _ => Error::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}
