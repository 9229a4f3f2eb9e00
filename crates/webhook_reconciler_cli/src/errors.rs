use thiserror::Error;
use webhook_reconciler::ReconcileError;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the git-webhook CLI application.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading or parsing configuration.
    ///
    /// This error is returned when there are issues with the configuration file,
    /// such as missing required fields, invalid values, or file access problems.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Reconciling or deleting a webhook failed.
    #[error("Webhook {webhook} failed: {source}")]
    Reconcile {
        webhook: String,
        #[source]
        source: ReconcileError,
    },

    /// The call for a webhook did not finish before the configured deadline.
    #[error("Webhook {webhook} did not finish within {seconds} seconds")]
    Timeout { webhook: String, seconds: u64 },
}

impl Error {
    /// Returns `true` when running the command again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Reconcile { source, .. } => source.is_retryable(),
            Error::Timeout { .. } => true,
            Error::Config(_) | Error::InvalidArguments(_) => false,
        }
    }
}
