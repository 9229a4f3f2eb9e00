//! Entry point binding one declared webhook to its provider.

use std::sync::Arc;

use github_client::GitHubClient;
use gitlab_client::GitLabClient;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;
use tracing::{debug, error, instrument};

use crate::errors::{CredentialError, ReconcileResult};
use crate::event_secrets::{resolve_optional, SecretResolver};
use crate::github_provider::GitHubProvider;
use crate::gitlab_provider::GitLabProvider;
use crate::reconciler::{HookAction, ReconcileCall};
use crate::spec::{ProviderConfig, WebhookSpec};

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

#[derive(Debug)]
enum ProviderClient {
    GitHub(GitHubProvider),
    GitLab(GitLabProvider),
}

/// Reconciles one [`WebhookSpec`] against its provider.
///
/// The provider client is built on first use and reused by later calls on the
/// same engine. Every call resolves the target and the hook afresh.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use webhook_reconciler::{EnvironmentSecretResolver, GitWebhookEngine, WebhookSpec};
///
/// # async fn example(spec: WebhookSpec) -> Result<(), webhook_reconciler::ReconcileError> {
/// let engine = GitWebhookEngine::new(spec, Arc::new(EnvironmentSecretResolver::new()));
/// let action = engine.reconcile().await?;
/// println!("webhook {action}");
/// # Ok(())
/// # }
/// ```
pub struct GitWebhookEngine {
    spec: WebhookSpec,
    secrets: Arc<dyn SecretResolver>,
    client: OnceCell<ProviderClient>,
}

impl GitWebhookEngine {
    pub fn new(spec: WebhookSpec, secrets: Arc<dyn SecretResolver>) -> Self {
        Self {
            spec,
            secrets,
            client: OnceCell::new(),
        }
    }

    pub fn spec(&self) -> &WebhookSpec {
        &self.spec
    }

    /// Creates or updates the webhook so that it matches the spec.
    ///
    /// # Errors
    /// Any failed step aborts the call; nothing is retried.
    #[instrument(skip(self), fields(webhook = %self.spec.display_name()))]
    pub async fn reconcile(&self) -> ReconcileResult<HookAction> {
        self.spec.validate()?;
        self.spec.validate_events()?;
        let secret = self.webhook_secret().await?;

        match self.client().await? {
            ProviderClient::GitHub(provider) => {
                ReconcileCall::new(provider, &self.spec)
                    .reconcile(&secret)
                    .await
            }
            ProviderClient::GitLab(provider) => {
                ReconcileCall::new(provider, &self.spec)
                    .reconcile(&secret)
                    .await
            }
        }
    }

    /// Deletes the webhook if it exists.
    #[instrument(skip(self), fields(webhook = %self.spec.display_name()))]
    pub async fn delete(&self) -> ReconcileResult<HookAction> {
        self.spec.validate()?;

        match self.client().await? {
            ProviderClient::GitHub(provider) => {
                ReconcileCall::new(provider, &self.spec)
                    .delete_if_exists()
                    .await
            }
            ProviderClient::GitLab(provider) => {
                ReconcileCall::new(provider, &self.spec)
                    .delete_if_exists()
                    .await
            }
        }
    }

    async fn client(&self) -> ReconcileResult<&ProviderClient> {
        self.client.get_or_try_init(|| self.build_client()).await
    }

    async fn build_client(&self) -> ReconcileResult<ProviderClient> {
        let provider = self.spec.provider()?;
        let token = self.token().await?;
        let base_url = provider.server().api_url();
        debug!(provider = provider.name(), base_url, "Building provider client");

        let client = match provider {
            ProviderConfig::GitHub(_) => ProviderClient::GitHub(GitHubProvider::new(
                GitHubClient::with_token(token.expose_secret(), base_url)?,
            )),
            ProviderConfig::GitLab(_) => ProviderClient::GitLab(GitLabProvider::new(
                GitLabClient::new(token.expose_secret(), base_url)?,
            )),
        };
        Ok(client)
    }

    async fn token(&self) -> ReconcileResult<SecretString> {
        let reference = self.spec.token_reference()?;
        let token = resolve_optional(self.secrets.as_ref(), &reference)
            .await
            .map_err(|source| {
                error!(reference = %reference, error = %source, "Failed to resolve provider token");
                CredentialError::Resolution {
                    purpose: "provider token",
                    source,
                }
            })?;
        if token.expose_secret().chars().any(char::is_control) {
            return Err(CredentialError::MalformedToken.into());
        }
        Ok(token)
    }

    async fn webhook_secret(&self) -> ReconcileResult<SecretString> {
        let reference = self.spec.webhook_secret_reference();
        resolve_optional(self.secrets.as_ref(), &reference)
            .await
            .map_err(|source| {
                error!(reference = %reference, error = %source, "Failed to resolve webhook secret");
                CredentialError::Resolution {
                    purpose: "webhook secret",
                    source,
                }
                .into()
            })
    }
}
