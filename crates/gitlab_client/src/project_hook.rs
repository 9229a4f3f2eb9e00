//! GitLab project hook types.
//!
//! GitLab models a project hook as a flat record with one boolean per event
//! category. [`HookEvents`] holds those booleans and owns the table that maps
//! event names onto them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "project_hook_tests.rs"]
mod tests;

/// Error returned when an event name has no matching project hook flag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown GitLab hook event type: {0}")]
pub struct UnknownHookEvent(pub String);

/// The per-event flags of a GitLab project hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookEvents {
    #[serde(default)]
    pub confidential_issues_events: bool,
    #[serde(default)]
    pub confidential_note_events: bool,
    #[serde(default)]
    pub deployment_events: bool,
    #[serde(default)]
    pub issues_events: bool,
    #[serde(default)]
    pub job_events: bool,
    #[serde(default)]
    pub merge_requests_events: bool,
    #[serde(default)]
    pub note_events: bool,
    #[serde(default)]
    pub pipeline_events: bool,
    #[serde(default)]
    pub push_events: bool,
    #[serde(default)]
    pub releases_events: bool,
    #[serde(default)]
    pub tag_push_events: bool,
    #[serde(default)]
    pub wiki_page_events: bool,
}

impl HookEvents {
    /// Canonical event names, identical to the GitLab API field names.
    pub const NAMES: [&'static str; 12] = [
        "confidential_issues_events",
        "confidential_note_events",
        "deployment_events",
        "issues_events",
        "job_events",
        "merge_requests_events",
        "note_events",
        "pipeline_events",
        "push_events",
        "releases_events",
        "tag_push_events",
        "wiki_page_events",
    ];

    /// Legacy spelling of `releases_events` accepted on input.
    pub const RELEASES_EVENTS_ALIAS: &'static str = "ReleasesEvents";

    /// Translates a set of event names into hook flags.
    ///
    /// The translation is all or nothing: the first unknown name aborts it and
    /// no partially populated value is returned.
    pub fn from_names<I, S>(names: I) -> Result<Self, UnknownHookEvent>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut events = Self::default();
        for name in names {
            let name = name.as_ref();
            let flag = events
                .flag_mut(name)
                .ok_or_else(|| UnknownHookEvent(name.to_string()))?;
            *flag = true;
        }
        Ok(events)
    }

    /// Returns the canonical names of all enabled flags.
    pub fn enabled(&self) -> BTreeSet<&'static str> {
        Self::NAMES
            .iter()
            .copied()
            .filter(|name| self.flag(name).unwrap_or(false))
            .collect()
    }

    /// Returns the flag for `name`, or `None` when the name is unknown.
    pub fn flag(&self, name: &str) -> Option<bool> {
        let mut copy = *self;
        copy.flag_mut(name).map(|flag| *flag)
    }

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        let flag = match name {
            "confidential_issues_events" => &mut self.confidential_issues_events,
            "confidential_note_events" => &mut self.confidential_note_events,
            "deployment_events" => &mut self.deployment_events,
            "issues_events" => &mut self.issues_events,
            "job_events" => &mut self.job_events,
            "merge_requests_events" => &mut self.merge_requests_events,
            "note_events" => &mut self.note_events,
            "pipeline_events" => &mut self.pipeline_events,
            "push_events" => &mut self.push_events,
            "releases_events" | Self::RELEASES_EVENTS_ALIAS => &mut self.releases_events,
            "tag_push_events" => &mut self.tag_push_events,
            "wiki_page_events" => &mut self.wiki_page_events,
            _ => return None,
        };
        Some(flag)
    }
}

fn default_ssl_verification() -> bool {
    true
}

/// GitLab project hook as returned by the API.
///
/// # Examples
///
/// ```rust
/// use gitlab_client::ProjectHook;
///
/// let hook: ProjectHook = serde_json::from_str(r#"{
///     "id": 1,
///     "url": "https://ci.example.com/hook",
///     "project_id": 3,
///     "push_events": true,
///     "enable_ssl_verification": true,
///     "created_at": "2012-10-12T17:04:47Z"
/// }"#).unwrap();
///
/// assert!(hook.events.push_events);
/// assert!(!hook.events.tag_push_events);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectHook {
    /// GitLab-assigned hook ID
    pub id: u64,

    /// Callback URL
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Branch filter applied to push events; GitLab returns `null` or `""`
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_events_branch_filter: Option<String>,

    #[serde(default = "default_ssl_verification")]
    pub enable_ssl_verification: bool,

    /// Delivery health state (`executable`, `temporarily_disabled`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_status: Option<String>,

    #[serde(flatten)]
    pub events: HookEvents,
}

/// Request body used to add or edit a project hook.
///
/// Every event flag is sent explicitly so that an edit also clears flags the
/// desired state no longer contains.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct ProjectHookOptions {
    /// Callback URL
    pub url: String,

    /// Shared secret sent back in the `X-Gitlab-Token` header of deliveries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Branch filter for push events; empty means all branches
    pub push_events_branch_filter: String,

    pub enable_ssl_verification: bool,

    #[serde(flatten)]
    pub events: HookEvents,
}

impl fmt::Debug for ProjectHookOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectHookOptions")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("push_events_branch_filter", &self.push_events_branch_filter)
            .field("enable_ssl_verification", &self.enable_ssl_verification)
            .field("events", &self.events)
            .finish()
    }
}
