//! GitHub webhook types.
//!
//! GitHub describes a repository hook with an event-name list, an `active` flag
//! and a free-form `config` map (`url`, `content_type`, `insecure_ssl`, `secret`).
//! The types in this module model that shape and pin down the one place where
//! GitHub's wire encoding differs from the rest of the crate: `insecure_ssl`
//! travels as the string `"0"` or `"1"` but is exposed as a `bool`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

/// The hook name GitHub requires for repository webhooks.
pub const REPOSITORY_HOOK_NAME: &str = "web";

/// GitHub webhook event types.
///
/// Represents the events a repository webhook can subscribe to.
/// See [GitHub webhook events documentation](https://docs.github.com/en/webhooks/webhook-events-and-payloads).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEvent {
    BranchProtectionConfiguration,
    BranchProtectionRule,
    CheckRun,
    CheckSuite,
    CodeScanningAlert,
    CommitComment,
    /// Branch or tag created
    Create,
    CustomPropertyValues,
    /// Branch or tag deleted
    Delete,
    DependabotAlert,
    DeployKey,
    Deployment,
    DeploymentProtectionRule,
    DeploymentReview,
    DeploymentStatus,
    Discussion,
    DiscussionComment,
    Fork,
    /// Wiki page updated
    Gollum,
    IssueComment,
    Issues,
    Label,
    Member,
    MergeGroup,
    Meta,
    Milestone,
    Package,
    PageBuild,
    Project,
    ProjectCard,
    ProjectColumn,
    Public,
    PullRequest,
    PullRequestReview,
    PullRequestReviewComment,
    PullRequestReviewThread,
    /// Any Git push to a repository
    Push,
    RegistryPackage,
    Release,
    Repository,
    RepositoryAdvisory,
    /// Custom event triggered through the dispatches API
    RepositoryDispatch,
    RepositoryImport,
    RepositoryRuleset,
    RepositoryVulnerabilityAlert,
    SecretScanningAlert,
    SecretScanningAlertLocation,
    SecretScanningScan,
    SecurityAndAnalysis,
    Star,
    Status,
    SubIssues,
    TeamAdd,
    Watch,
    WorkflowJob,
    WorkflowRun,
    /// All events (wildcard)
    #[serde(rename = "*")]
    All,
}

/// Error returned when a string does not name a known GitHub webhook event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown GitHub webhook event type: {0}")]
pub struct UnknownWebhookEvent(pub String);

impl WebhookEvent {
    /// Every event the crate knows about.
    pub const ALL: [WebhookEvent; 57] = [
        Self::BranchProtectionConfiguration,
        Self::BranchProtectionRule,
        Self::CheckRun,
        Self::CheckSuite,
        Self::CodeScanningAlert,
        Self::CommitComment,
        Self::Create,
        Self::CustomPropertyValues,
        Self::Delete,
        Self::DependabotAlert,
        Self::DeployKey,
        Self::Deployment,
        Self::DeploymentProtectionRule,
        Self::DeploymentReview,
        Self::DeploymentStatus,
        Self::Discussion,
        Self::DiscussionComment,
        Self::Fork,
        Self::Gollum,
        Self::IssueComment,
        Self::Issues,
        Self::Label,
        Self::Member,
        Self::MergeGroup,
        Self::Meta,
        Self::Milestone,
        Self::Package,
        Self::PageBuild,
        Self::Project,
        Self::ProjectCard,
        Self::ProjectColumn,
        Self::Public,
        Self::PullRequest,
        Self::PullRequestReview,
        Self::PullRequestReviewComment,
        Self::PullRequestReviewThread,
        Self::Push,
        Self::RegistryPackage,
        Self::Release,
        Self::Repository,
        Self::RepositoryAdvisory,
        Self::RepositoryDispatch,
        Self::RepositoryImport,
        Self::RepositoryRuleset,
        Self::RepositoryVulnerabilityAlert,
        Self::SecretScanningAlert,
        Self::SecretScanningAlertLocation,
        Self::SecretScanningScan,
        Self::SecurityAndAnalysis,
        Self::Star,
        Self::Status,
        Self::SubIssues,
        Self::TeamAdd,
        Self::Watch,
        Self::WorkflowJob,
        Self::WorkflowRun,
        Self::All,
    ];

    /// Converts the WebhookEvent to the name GitHub uses on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BranchProtectionConfiguration => "branch_protection_configuration",
            Self::BranchProtectionRule => "branch_protection_rule",
            Self::CheckRun => "check_run",
            Self::CheckSuite => "check_suite",
            Self::CodeScanningAlert => "code_scanning_alert",
            Self::CommitComment => "commit_comment",
            Self::Create => "create",
            Self::CustomPropertyValues => "custom_property_values",
            Self::Delete => "delete",
            Self::DependabotAlert => "dependabot_alert",
            Self::DeployKey => "deploy_key",
            Self::Deployment => "deployment",
            Self::DeploymentProtectionRule => "deployment_protection_rule",
            Self::DeploymentReview => "deployment_review",
            Self::DeploymentStatus => "deployment_status",
            Self::Discussion => "discussion",
            Self::DiscussionComment => "discussion_comment",
            Self::Fork => "fork",
            Self::Gollum => "gollum",
            Self::IssueComment => "issue_comment",
            Self::Issues => "issues",
            Self::Label => "label",
            Self::Member => "member",
            Self::MergeGroup => "merge_group",
            Self::Meta => "meta",
            Self::Milestone => "milestone",
            Self::Package => "package",
            Self::PageBuild => "page_build",
            Self::Project => "project",
            Self::ProjectCard => "project_card",
            Self::ProjectColumn => "project_column",
            Self::Public => "public",
            Self::PullRequest => "pull_request",
            Self::PullRequestReview => "pull_request_review",
            Self::PullRequestReviewComment => "pull_request_review_comment",
            Self::PullRequestReviewThread => "pull_request_review_thread",
            Self::Push => "push",
            Self::RegistryPackage => "registry_package",
            Self::Release => "release",
            Self::Repository => "repository",
            Self::RepositoryAdvisory => "repository_advisory",
            Self::RepositoryDispatch => "repository_dispatch",
            Self::RepositoryImport => "repository_import",
            Self::RepositoryRuleset => "repository_ruleset",
            Self::RepositoryVulnerabilityAlert => "repository_vulnerability_alert",
            Self::SecretScanningAlert => "secret_scanning_alert",
            Self::SecretScanningAlertLocation => "secret_scanning_alert_location",
            Self::SecretScanningScan => "secret_scanning_scan",
            Self::SecurityAndAnalysis => "security_and_analysis",
            Self::Star => "star",
            Self::Status => "status",
            Self::SubIssues => "sub_issues",
            Self::TeamAdd => "team_add",
            Self::Watch => "watch",
            Self::WorkflowJob => "workflow_job",
            Self::WorkflowRun => "workflow_run",
            Self::All => "*",
        }
    }
}

impl FromStr for WebhookEvent {
    type Err = UnknownWebhookEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|event| event.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownWebhookEvent(s.to_string()))
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GitHub repository webhook as returned by the API.
///
/// Besides the fields that describe the subscription this carries the values
/// GitHub assigns itself (ID, timestamps, API URLs, type tag, last response).
///
/// # Examples
///
/// ```rust
/// use github_client::Webhook;
///
/// let webhook_json = r#"{
///     "id": 12345,
///     "type": "Repository",
///     "name": "web",
///     "url": "https://api.github.com/repos/acme/widgets/hooks/12345",
///     "active": true,
///     "events": ["push", "pull_request"],
///     "config": {
///         "url": "https://ci.example.com/hook",
///         "content_type": "json",
///         "insecure_ssl": "0"
///     },
///     "created_at": "2024-01-01T00:00:00Z",
///     "updated_at": "2024-01-01T00:00:00Z"
/// }"#;
///
/// let webhook: Webhook = serde_json::from_str(webhook_json).unwrap();
/// assert_eq!(webhook.id, 12345);
/// assert_eq!(webhook.config.url, "https://ci.example.com/hook");
/// assert_eq!(webhook.events.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Webhook {
    /// GitHub-assigned webhook ID
    pub id: u64,

    /// Resource type tag (`Repository`, `Organization`, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub hook_type: Option<String>,

    /// Hook name, always `web` for repository webhooks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the webhook is active
    pub active: bool,

    /// Events that trigger the webhook
    #[serde(default)]
    pub events: Vec<String>,

    /// Webhook configuration map
    pub config: WebhookConfig,

    /// API URL of the hook resource itself (not the callback URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliveries_url: Option<String>,

    /// Status of the last delivery attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response: Option<serde_json::Value>,

    /// When the webhook was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// When the webhook was last updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Webhook configuration map.
///
/// # Examples
///
/// ```rust
/// use github_client::WebhookConfig;
///
/// let config = WebhookConfig {
///     url: "https://ci.example.com/hook".to_string(),
///     content_type: Some("json".to_string()),
///     insecure_ssl: false,
///     secret: None,
/// };
///
/// let json = serde_json::to_value(&config).unwrap();
/// assert_eq!(json["insecure_ssl"], "0");
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Callback URL the payloads are delivered to
    #[serde(default)]
    pub url: String,

    /// Content type (json or form)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Whether to skip SSL certificate verification (insecure)
    ///
    /// GitHub API uses string "0" (verify) or "1" (skip), but we expose as boolean.
    #[serde(
        default,
        serialize_with = "serialize_insecure_ssl",
        deserialize_with = "deserialize_insecure_ssl"
    )]
    pub insecure_ssl: bool,

    /// Shared secret used to sign deliveries.
    ///
    /// GitHub echoes a set secret back as `********`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .field("insecure_ssl", &self.insecure_ssl)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Request body used to create or edit a repository webhook.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebhookPayload {
    /// Must be `web` for repository webhooks
    pub name: String,

    /// Whether deliveries are sent
    pub active: bool,

    /// Events that trigger the webhook
    pub events: Vec<String>,

    /// Configuration map
    pub config: WebhookConfig,
}

impl WebhookPayload {
    /// Creates a payload for a repository webhook with the given settings.
    pub fn new(active: bool, events: Vec<String>, config: WebhookConfig) -> Self {
        Self {
            name: REPOSITORY_HOOK_NAME.to_string(),
            active,
            events,
            config,
        }
    }
}

/// Interprets a textual `insecure_ssl` value.
///
/// `"1"` and `"true"` mean verification is skipped; everything else means
/// certificates are verified.
pub fn parse_insecure_ssl(value: &str) -> bool {
    matches!(value.trim(), "1" | "true")
}

/// Serialize boolean to GitHub API format ("0" or "1").
fn serialize_insecure_ssl<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "1" } else { "0" })
}

/// Deserialize `insecure_ssl` to boolean.
///
/// GitHub documents the field as a string but older Enterprise servers answer
/// with a number, and hand-written fixtures often use a JSON boolean.
fn deserialize_insecure_ssl<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Flag(bool),
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::Flag(flag)) => flag,
        Some(Repr::Number(n)) => n != 0,
        Some(Repr::Text(text)) => parse_insecure_ssl(&text),
        None => false,
    })
}
