//! GitHub implementation of [`HookProvider`].
//!
//! GitHub models a hook as an event-name list plus a configuration map.

use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use github_client::{GitHubClient, Repository, Webhook, WebhookConfig, WebhookEvent, WebhookPayload};
use secrecy::{ExposeSecret, SecretString};

use crate::equivalence::ComparableHook;
use crate::errors::{ReconcileResult, ValidationError};
use crate::provider::{HookProvider, TargetRef};
use crate::spec::WebhookSpec;

#[cfg(test)]
#[path = "github_provider_tests.rs"]
mod tests;

/// Manages repository webhooks on GitHub or GitHub Enterprise.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

/// Event GitHub subscribes a hook to when the event list is empty.
pub const DEFAULT_GITHUB_EVENT: WebhookEvent = WebhookEvent::Push;

/// Validates and de-duplicates GitHub event names.
///
/// An empty list becomes `["push"]`, the list GitHub stores for a hook
/// created without events.
pub fn github_events(names: &[String]) -> Result<Vec<String>, ValidationError> {
    if names.is_empty() {
        return Ok(vec![DEFAULT_GITHUB_EVENT.as_str().to_string()]);
    }
    let mut events = BTreeSet::new();
    for name in names {
        let event = WebhookEvent::from_str(name)
            .map_err(|e| ValidationError::UnknownEventType(e.0))?;
        events.insert(event.as_str().to_string());
    }
    Ok(events.into_iter().collect())
}

fn to_target(repository: Repository, requested_owner: &str) -> TargetRef {
    TargetRef {
        id: repository.id(),
        owner: repository
            .owner_login()
            .unwrap_or(requested_owner)
            .to_string(),
        name: repository.name().to_string(),
    }
}

#[async_trait]
impl HookProvider for GitHubProvider {
    type Hook = Webhook;
    type View = WebhookPayload;

    fn name(&self) -> &'static str {
        "github"
    }

    async fn find_organization_target(
        &self,
        owner: &str,
        name: &str,
    ) -> ReconcileResult<Option<TargetRef>> {
        let repository = self.client.find_org_repository(owner, name).await?;
        Ok(repository.map(|r| to_target(r, owner)))
    }

    async fn find_user_target(
        &self,
        owner: &str,
        name: &str,
    ) -> ReconcileResult<Option<TargetRef>> {
        let repository = self.client.find_user_repository(owner, name).await?;
        Ok(repository.map(|r| to_target(r, owner)))
    }

    async fn locate_hook(
        &self,
        target: &TargetRef,
        callback_url: &str,
    ) -> ReconcileResult<Option<Webhook>> {
        Ok(self
            .client
            .find_repository_hook(&target.owner, &target.name, callback_url)
            .await?)
    }

    fn hook_id(&self, hook: &Webhook) -> u64 {
        hook.id
    }

    fn build_desired_view(
        &self,
        spec: &WebhookSpec,
        secret: &SecretString,
    ) -> ReconcileResult<WebhookPayload> {
        let events = github_events(&spec.events)?;
        let config = WebhookConfig {
            url: spec.callback_url().to_string(),
            content_type: Some(spec.content_type.clone()),
            insecure_ssl: spec.insecure_ssl,
            secret: Some(secret.expose_secret().to_string()),
        };
        Ok(WebhookPayload::new(spec.active, events, config))
    }

    fn normalize_desired_view(&self, view: &WebhookPayload) -> ComparableHook {
        ComparableHook {
            url: view.config.url.clone(),
            events: view.events.iter().cloned().collect(),
            active: Some(view.active),
            content_type: view.config.content_type.clone(),
            insecure_ssl: view.config.insecure_ssl,
            branch_filter: None,
        }
    }

    fn normalize_actual_view(&self, hook: &Webhook) -> ComparableHook {
        ComparableHook {
            url: hook.config.url.clone(),
            events: hook.events.iter().cloned().collect(),
            active: Some(hook.active),
            content_type: hook.config.content_type.clone(),
            insecure_ssl: hook.config.insecure_ssl,
            branch_filter: None,
        }
    }

    async fn create_hook(
        &self,
        target: &TargetRef,
        view: &WebhookPayload,
    ) -> ReconcileResult<Webhook> {
        Ok(self
            .client
            .create_repository_hook(&target.owner, &target.name, view)
            .await?)
    }

    async fn update_hook(
        &self,
        target: &TargetRef,
        hook_id: u64,
        view: &WebhookPayload,
    ) -> ReconcileResult<Webhook> {
        Ok(self
            .client
            .update_repository_hook(&target.owner, &target.name, hook_id, view)
            .await?)
    }

    async fn delete_hook(&self, target: &TargetRef, hook_id: u64) -> ReconcileResult<()> {
        Ok(self
            .client
            .delete_repository_hook(&target.owner, &target.name, hook_id)
            .await?)
    }
}
