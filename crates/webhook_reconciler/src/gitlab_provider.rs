//! GitLab implementation of [`HookProvider`].
//!
//! GitLab models a hook as one boolean per event category. GitLab has no
//! `active` flag and no content type, so those stay out of the comparison.

use async_trait::async_trait;
use gitlab_client::{GitLabClient, HookEvents, Project, ProjectHook, ProjectHookOptions};
use secrecy::{ExposeSecret, SecretString};

use crate::equivalence::{normalize_branch_filter, ComparableHook};
use crate::errors::{ReconcileResult, ValidationError};
use crate::provider::{HookProvider, TargetRef};
use crate::spec::WebhookSpec;

#[cfg(test)]
#[path = "gitlab_provider_tests.rs"]
mod tests;

/// Manages project hooks on GitLab.
#[derive(Debug, Clone)]
pub struct GitLabProvider {
    client: GitLabClient,
}

impl GitLabProvider {
    pub fn new(client: GitLabClient) -> Self {
        Self { client }
    }
}

/// Translates event names into GitLab hook flags, failing on the first
/// unknown name.
pub fn gitlab_events(names: &[String]) -> Result<HookEvents, ValidationError> {
    HookEvents::from_names(names).map_err(|e| ValidationError::UnknownEventType(e.0))
}

fn to_target(project: Project, requested_owner: &str) -> TargetRef {
    TargetRef {
        id: project.id,
        owner: project.owner().unwrap_or(requested_owner).to_string(),
        name: project.name,
    }
}

fn comparable(
    url: &str,
    events: &HookEvents,
    enable_ssl_verification: bool,
    branch_filter: Option<&str>,
) -> ComparableHook {
    ComparableHook {
        url: url.to_string(),
        events: events.enabled().into_iter().map(str::to_string).collect(),
        active: None,
        content_type: None,
        insecure_ssl: !enable_ssl_verification,
        branch_filter: normalize_branch_filter(branch_filter),
    }
}

#[async_trait]
impl HookProvider for GitLabProvider {
    type Hook = ProjectHook;
    type View = ProjectHookOptions;

    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn find_organization_target(
        &self,
        owner: &str,
        name: &str,
    ) -> ReconcileResult<Option<TargetRef>> {
        let project = self.client.find_group_project(owner, name).await?;
        Ok(project.map(|p| to_target(p, owner)))
    }

    async fn find_user_target(
        &self,
        owner: &str,
        name: &str,
    ) -> ReconcileResult<Option<TargetRef>> {
        let project = self.client.find_user_project(owner, name).await?;
        Ok(project.map(|p| to_target(p, owner)))
    }

    async fn locate_hook(
        &self,
        target: &TargetRef,
        callback_url: &str,
    ) -> ReconcileResult<Option<ProjectHook>> {
        Ok(self.client.find_project_hook(target.id, callback_url).await?)
    }

    fn hook_id(&self, hook: &ProjectHook) -> u64 {
        hook.id
    }

    fn build_desired_view(
        &self,
        spec: &WebhookSpec,
        secret: &SecretString,
    ) -> ReconcileResult<ProjectHookOptions> {
        let events = gitlab_events(&spec.events)?;
        Ok(ProjectHookOptions {
            url: spec.callback_url().to_string(),
            token: Some(secret.expose_secret().to_string()),
            push_events_branch_filter: spec.push_events_branch_filter.clone(),
            enable_ssl_verification: !spec.insecure_ssl,
            events,
        })
    }

    fn normalize_desired_view(&self, view: &ProjectHookOptions) -> ComparableHook {
        comparable(
            &view.url,
            &view.events,
            view.enable_ssl_verification,
            Some(&view.push_events_branch_filter),
        )
    }

    fn normalize_actual_view(&self, hook: &ProjectHook) -> ComparableHook {
        comparable(
            &hook.url,
            &hook.events,
            hook.enable_ssl_verification,
            hook.push_events_branch_filter.as_deref(),
        )
    }

    async fn create_hook(
        &self,
        target: &TargetRef,
        view: &ProjectHookOptions,
    ) -> ReconcileResult<ProjectHook> {
        Ok(self.client.add_project_hook(target.id, view).await?)
    }

    async fn update_hook(
        &self,
        target: &TargetRef,
        hook_id: u64,
        view: &ProjectHookOptions,
    ) -> ReconcileResult<ProjectHook> {
        Ok(self.client.edit_project_hook(target.id, hook_id, view).await?)
    }

    async fn delete_hook(&self, target: &TargetRef, hook_id: u64) -> ReconcileResult<()> {
        Ok(self.client.delete_project_hook(target.id, hook_id).await?)
    }
}
