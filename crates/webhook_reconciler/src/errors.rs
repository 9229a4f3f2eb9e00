//! Error types for webhook reconciliation.
//!
//! Every failure of a reconciliation call is reported as a [`ReconcileError`].
//! The [`ErrorCategory`] of an error tells the caller whether repeating the
//! call can help; the engine itself never retries.

use thiserror::Error;

use crate::event_secrets::SecretResolutionError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Result alias used throughout the crate.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Broad classification of a [`ReconcileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The declared spec is invalid; repeating the call cannot succeed.
    Validation,
    /// The target repository or project does not exist.
    Resolution,
    /// A token or secret could not be obtained or is malformed.
    Credential,
    /// The provider failed in a way that may clear up by itself.
    Transient,
    /// The provider rejected the request.
    Permanent,
}

/// Problems with a declared webhook spec, detected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("exactly one of gitHub or gitLab must be configured, found {found}")]
    ProviderCount { found: usize },

    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    #[error("field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("field '{field}' is not an absolute http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("field '{field}' cannot be changed once set")]
    ImmutableField { field: &'static str },
}

/// Problems obtaining the token or webhook secret.
///
/// Never carries the secret value itself.
#[derive(Error, Debug, Clone)]
pub enum CredentialError {
    #[error("failed to resolve {purpose}: {source}")]
    Resolution {
        purpose: &'static str,
        #[source]
        source: SecretResolutionError,
    },

    #[error("the provider token contains characters that cannot be sent in a header")]
    MalformedToken,
}

/// Errors that abort a reconcile or delete call.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("invalid webhook spec: {0}")]
    Validation(#[from] ValidationError),

    #[error("repository '{owner}/{name}' was not found for the organization or the user")]
    TargetNotFound { owner: String, name: String },

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("failed to construct provider client: {0}")]
    ClientConstruction(String),

    #[error("GitHub request failed: {0}")]
    GitHub(#[source] github_client::Error),

    #[error("GitLab request failed: {0}")]
    GitLab(#[source] gitlab_client::Error),
}

impl ReconcileError {
    /// Classifies the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReconcileError::Validation(_) => ErrorCategory::Validation,
            ReconcileError::TargetNotFound { .. } => ErrorCategory::Resolution,
            ReconcileError::Credential(_) => ErrorCategory::Credential,
            ReconcileError::ClientConstruction(_) => ErrorCategory::Validation,
            ReconcileError::GitHub(github_client::Error::AuthError(_)) => {
                ErrorCategory::Credential
            }
            ReconcileError::GitLab(
                gitlab_client::Error::AuthError(_) | gitlab_client::Error::InvalidToken,
            ) => ErrorCategory::Credential,
            ReconcileError::GitHub(e) if e.is_transient() => ErrorCategory::Transient,
            ReconcileError::GitLab(e) if e.is_transient() => ErrorCategory::Transient,
            ReconcileError::GitHub(_) | ReconcileError::GitLab(_) => ErrorCategory::Permanent,
        }
    }

    /// Returns `true` when a later attempt of the same call may succeed.
    ///
    /// Missing targets and credentials are retryable because they may be
    /// created after the webhook was declared.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transient | ErrorCategory::Resolution | ErrorCategory::Credential
        )
    }
}

impl From<github_client::Error> for ReconcileError {
    fn from(error: github_client::Error) -> Self {
        match error {
            github_client::Error::ClientConstruction(message) => {
                ReconcileError::ClientConstruction(message)
            }
            other => ReconcileError::GitHub(other),
        }
    }
}

impl From<gitlab_client::Error> for ReconcileError {
    fn from(error: gitlab_client::Error) -> Self {
        match error {
            gitlab_client::Error::ClientConstruction(message) => {
                ReconcileError::ClientConstruction(message)
            }
            gitlab_client::Error::InvalidToken => {
                ReconcileError::Credential(CredentialError::MalformedToken)
            }
            other => ReconcileError::GitLab(other),
        }
    }
}
