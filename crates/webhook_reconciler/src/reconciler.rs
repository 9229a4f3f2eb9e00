//! One reconciliation or teardown pass over a single webhook.

use std::fmt;

use secrecy::SecretString;
use tracing::{debug, info, instrument};

use crate::errors::ReconcileResult;
use crate::provider::{HookProvider, TargetRef};
use crate::spec::WebhookSpec;

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;

/// What a pass did to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookAction {
    Created,
    Updated,
    Unchanged,
    Deleted,
    /// Teardown found no hook to delete.
    Absent,
}

impl HookAction {
    /// Returns `true` when a mutating request was sent.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            HookAction::Created | HookAction::Updated | HookAction::Deleted
        )
    }
}

impl fmt::Display for HookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            HookAction::Created => "created",
            HookAction::Updated => "updated",
            HookAction::Unchanged => "unchanged",
            HookAction::Deleted => "deleted",
            HookAction::Absent => "absent",
        };
        f.write_str(text)
    }
}

/// State of one pass.
///
/// The resolved target and the located hook are remembered for the lifetime
/// of the value only. Build a new `ReconcileCall` for every pass.
pub struct ReconcileCall<'a, P: HookProvider> {
    provider: &'a P,
    spec: &'a WebhookSpec,
    target: Option<TargetRef>,
    hook: Option<Option<P::Hook>>,
}

impl<'a, P: HookProvider> ReconcileCall<'a, P> {
    pub fn new(provider: &'a P, spec: &'a WebhookSpec) -> Self {
        Self {
            provider,
            spec,
            target: None,
            hook: None,
        }
    }

    /// Resolves the target repository or project once per pass.
    pub async fn target(&mut self) -> ReconcileResult<TargetRef> {
        if let Some(target) = &self.target {
            return Ok(target.clone());
        }
        let target = self
            .provider
            .resolve_target(&self.spec.repository_owner, &self.spec.repository_name)
            .await?;
        debug!(provider = self.provider.name(), repository = %target, id = target.id, "Resolved target");
        self.target = Some(target.clone());
        Ok(target)
    }

    /// Locates the hook registered for the callback URL once per pass.
    pub async fn existing_hook(&mut self) -> ReconcileResult<Option<P::Hook>> {
        if let Some(hook) = &self.hook {
            return Ok(hook.clone());
        }
        let target = self.target().await?;
        let hook = self
            .provider
            .locate_hook(&target, self.spec.callback_url())
            .await?;
        self.hook = Some(hook.clone());
        Ok(hook)
    }

    /// Converges the provider onto the spec.
    ///
    /// The desired view is built, and its event names checked, before any
    /// request is sent. An existing hook is edited in place; it is never
    /// deleted and re-created.
    #[instrument(skip(self, secret), fields(provider = self.provider.name(), owner = %self.spec.repository_owner, repo = %self.spec.repository_name))]
    pub async fn reconcile(&mut self, secret: &SecretString) -> ReconcileResult<HookAction> {
        let desired = self.provider.build_desired_view(self.spec, secret)?;
        let target = self.target().await?;

        let Some(actual) = self.existing_hook().await? else {
            let created = self.provider.create_hook(&target, &desired).await?;
            info!(repository = %target, hook_id = self.provider.hook_id(&created), "Webhook created");
            self.hook = Some(Some(created));
            return Ok(HookAction::Created);
        };

        let hook_id = self.provider.hook_id(&actual);
        let wanted = self.provider.normalize_desired_view(&desired);
        let found = self.provider.normalize_actual_view(&actual);
        let differences = wanted.differences(&found);
        if differences.is_empty() {
            info!(repository = %target, hook_id, "Webhook already up to date");
            return Ok(HookAction::Unchanged);
        }

        info!(repository = %target, hook_id, fields = ?differences, "Webhook differs, updating");
        let updated = self.provider.update_hook(&target, hook_id, &desired).await?;
        self.hook = Some(Some(updated));
        Ok(HookAction::Updated)
    }

    /// Deletes the hook if it exists.
    ///
    /// A missing hook is not an error; a missing target is.
    #[instrument(skip(self), fields(provider = self.provider.name(), owner = %self.spec.repository_owner, repo = %self.spec.repository_name))]
    pub async fn delete_if_exists(&mut self) -> ReconcileResult<HookAction> {
        let target = self.target().await?;
        let Some(hook) = self.existing_hook().await? else {
            info!(repository = %target, "No webhook to delete");
            return Ok(HookAction::Absent);
        };

        let hook_id = self.provider.hook_id(&hook);
        self.provider.delete_hook(&target, hook_id).await?;
        info!(repository = %target, hook_id, "Webhook deleted");
        self.hook = Some(None);
        Ok(HookAction::Deleted)
    }
}
