//! Webhook reconciliation for GitHub and GitLab.
//!
//! A [`WebhookSpec`] declares one webhook on one repository. The
//! [`GitWebhookEngine`] converges the hosting provider onto that declaration:
//! it resolves the repository (organization scope first, then user scope),
//! locates the hook registered for the callback URL and then creates it,
//! edits it in place, or leaves it alone when it already matches. Teardown
//! deletes the hook if it exists.
//!
//! Provider specifics sit behind the [`HookProvider`] trait. Retrying and
//! scheduling belong to the caller; [`ReconcileError::is_retryable`] tells it
//! which failures are worth repeating.

pub mod engine;
pub mod equivalence;
pub mod errors;
pub mod event_secrets;
pub mod github_provider;
pub mod gitlab_provider;
pub mod provider;
pub mod reconciler;
pub mod spec;

pub use engine::GitWebhookEngine;
pub use equivalence::ComparableHook;
pub use errors::{
    CredentialError, ErrorCategory, ReconcileError, ReconcileResult, ValidationError,
};
pub use event_secrets::{
    EnvironmentSecretResolver, FilesystemSecretResolver, SecretReference, SecretResolutionError,
    SecretResolver,
};
pub use github_provider::GitHubProvider;
pub use gitlab_provider::GitLabProvider;
pub use provider::{HookProvider, TargetRef};
pub use reconciler::{HookAction, ReconcileCall};
pub use spec::{GitServerConfig, LocalSecretRef, ProviderConfig, WebhookSpec};
