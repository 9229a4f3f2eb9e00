//! The seam between the reconciliation algorithm and a hosting provider.

use std::fmt;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;

use crate::equivalence::ComparableHook;
use crate::errors::{ReconcileError, ReconcileResult};
use crate::spec::WebhookSpec;

/// Identity of a resolved repository or project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    /// Provider-assigned numeric ID
    pub id: u64,
    pub owner: String,
    pub name: String,
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Operations the reconciliation algorithm needs from a provider.
///
/// `Hook` is the hook as the provider returns it and `View` the request body
/// the provider accepts to create or edit one. Both are reduced to a
/// [`ComparableHook`] for comparison.
#[async_trait]
pub trait HookProvider: Send + Sync {
    type Hook: Clone + fmt::Debug + Send + Sync;
    type View: fmt::Debug + Send + Sync;

    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Looks `name` up among the repositories of the organization or group
    /// called `owner`.
    async fn find_organization_target(
        &self,
        owner: &str,
        name: &str,
    ) -> ReconcileResult<Option<TargetRef>>;

    /// Looks `name` up among the repositories of the user called `owner`.
    async fn find_user_target(&self, owner: &str, name: &str)
        -> ReconcileResult<Option<TargetRef>>;

    /// Resolves the target, trying the organization scope before the user
    /// scope.
    ///
    /// # Errors
    /// `ReconcileError::TargetNotFound` when neither scope holds the target.
    async fn resolve_target(&self, owner: &str, name: &str) -> ReconcileResult<TargetRef> {
        if let Some(target) = self.find_organization_target(owner, name).await? {
            return Ok(target);
        }
        debug!(
            provider = self.name(),
            owner, name, "Not found in organization scope, trying user scope"
        );
        if let Some(target) = self.find_user_target(owner, name).await? {
            return Ok(target);
        }
        Err(ReconcileError::TargetNotFound {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Finds the hook of `target` registered for `callback_url`.
    async fn locate_hook(
        &self,
        target: &TargetRef,
        callback_url: &str,
    ) -> ReconcileResult<Option<Self::Hook>>;

    fn hook_id(&self, hook: &Self::Hook) -> u64;

    /// Builds the request body for `spec`.
    ///
    /// # Errors
    /// `ValidationError::UnknownEventType` for the first event name the
    /// provider does not know. No partial view is produced.
    fn build_desired_view(
        &self,
        spec: &WebhookSpec,
        secret: &SecretString,
    ) -> ReconcileResult<Self::View>;

    fn normalize_desired_view(&self, view: &Self::View) -> ComparableHook;

    fn normalize_actual_view(&self, hook: &Self::Hook) -> ComparableHook;

    async fn create_hook(&self, target: &TargetRef, view: &Self::View)
        -> ReconcileResult<Self::Hook>;

    /// Replaces the settings of hook `hook_id` in one call.
    async fn update_hook(
        &self,
        target: &TargetRef,
        hook_id: u64,
        view: &Self::View,
    ) -> ReconcileResult<Self::Hook>;

    async fn delete_hook(&self, target: &TargetRef, hook_id: u64) -> ReconcileResult<()>;
}
