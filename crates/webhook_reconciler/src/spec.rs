//! The declared webhook and its validation rules.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ValidationError;
use crate::event_secrets::{SecretReference, TOKEN_KEY, WEBHOOK_SECRET_KEY};
use crate::github_provider::github_events;
use crate::gitlab_provider::gitlab_events;

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;

fn default_content_type() -> String {
    "json".to_string()
}

fn default_active() -> bool {
    true
}

/// Reference to a secret living next to the webhook declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSecretRef {
    /// Secret name; empty means "not configured"
    #[serde(default)]
    pub name: String,
}

impl LocalSecretRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Connection settings for one git server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitServerConfig {
    /// API base URL; empty selects the public service
    #[serde(rename = "gitAPIServerURL", default)]
    pub git_api_server_url: String,

    /// Secret holding the access token under the `token` key
    #[serde(rename = "gitServerCredentials", default)]
    pub git_server_credentials: LocalSecretRef,
}

impl GitServerConfig {
    /// Returns the API base URL override, if one is set.
    pub fn api_url(&self) -> Option<&str> {
        let url = self.git_api_server_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

/// The provider a spec targets, with its server settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderConfig<'a> {
    GitHub(&'a GitServerConfig),
    GitLab(&'a GitServerConfig),
}

impl<'a> ProviderConfig<'a> {
    pub fn server(&self) -> &'a GitServerConfig {
        match *self {
            ProviderConfig::GitHub(server) | ProviderConfig::GitLab(server) => server,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            ProviderConfig::GitHub(_) => "github",
            ProviderConfig::GitLab(_) => "gitlab",
        }
    }
}

/// Desired state of one repository webhook.
///
/// # Examples
///
/// ```rust
/// use webhook_reconciler::WebhookSpec;
///
/// let spec: WebhookSpec = serde_json::from_str(r#"{
///     "gitLab": { "gitServerCredentials": { "name": "gitlab-token" } },
///     "repositoryOwner": "acme",
///     "repositoryName": "widgets",
///     "webhookURL": "https://ci.example.com/hook",
///     "events": ["push_events"]
/// }"#).unwrap();
///
/// assert!(spec.validate().is_ok());
/// assert!(spec.active);
/// assert_eq!(spec.content_type, "json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSpec {
    /// Namespace the declaration and its secrets live in
    #[serde(default)]
    pub namespace: String,

    /// Name of the declaration
    #[serde(default)]
    pub name: String,

    #[serde(rename = "gitHub", default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GitServerConfig>,

    #[serde(rename = "gitLab", default, skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<GitServerConfig>,

    /// Organization, group or user owning the repository
    #[serde(alias = "RepositoryOwner", default)]
    pub repository_owner: String,

    #[serde(default)]
    pub repository_name: String,

    /// Callback URL deliveries are sent to
    #[serde(rename = "webhookURL", default)]
    pub webhook_url: String,

    /// Skip certificate verification when delivering
    #[serde(rename = "insecureSSL", default)]
    pub insecure_ssl: bool,

    /// Secret holding the signing secret under the `secret` key
    #[serde(default)]
    pub webhook_secret: LocalSecretRef,

    #[serde(default)]
    pub events: Vec<String>,

    /// GitHub only
    #[serde(alias = "content", default = "default_content_type")]
    pub content_type: String,

    /// GitHub only
    #[serde(default = "default_active")]
    pub active: bool,

    /// GitLab only
    #[serde(alias = "pushEventBranchFilter", default)]
    pub push_events_branch_filter: String,
}

impl WebhookSpec {
    /// Returns the configured provider.
    ///
    /// # Errors
    /// `ValidationError::ProviderCount` unless exactly one provider is set.
    pub fn provider(&self) -> Result<ProviderConfig<'_>, ValidationError> {
        match (&self.github, &self.gitlab) {
            (Some(github), None) => Ok(ProviderConfig::GitHub(github)),
            (None, Some(gitlab)) => Ok(ProviderConfig::GitLab(gitlab)),
            (github, gitlab) => Err(ValidationError::ProviderCount {
                found: usize::from(github.is_some()) + usize::from(gitlab.is_some()),
            }),
        }
    }

    /// Callback URL without surrounding whitespace, as sent to and matched
    /// against the provider.
    pub fn callback_url(&self) -> &str {
        self.webhook_url.trim()
    }

    /// Checks the rules that hold for every declaration.
    ///
    /// Event names are checked by [`WebhookSpec::validate_events`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        let provider = self.provider()?;

        if self.repository_owner.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "repositoryOwner",
            });
        }
        if self.repository_name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "repositoryName",
            });
        }
        if self.callback_url().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "webhookURL",
            });
        }
        check_http_url("webhookURL", self.callback_url())?;
        if let Some(api_url) = provider.server().api_url() {
            check_http_url("gitAPIServerURL", api_url)?;
        }
        Ok(())
    }

    /// Checks every event name against the catalogue of the selected provider.
    ///
    /// # Errors
    /// `ValidationError::UnknownEventType` for the first unknown name.
    pub fn validate_events(&self) -> Result<(), ValidationError> {
        match self.provider()? {
            ProviderConfig::GitHub(_) => github_events(&self.events).map(|_| ()),
            ProviderConfig::GitLab(_) => gitlab_events(&self.events).map(|_| ()),
        }
    }

    /// Checks that an update of `old` into `self` leaves the identity of the
    /// webhook alone: server, owner, repository and callback URL.
    pub fn validate_update(&self, old: &WebhookSpec) -> Result<(), ValidationError> {
        self.validate()?;

        if let (Some(new), Some(old)) = (&self.github, &old.github) {
            if new.git_api_server_url != old.git_api_server_url {
                return Err(ValidationError::ImmutableField {
                    field: "gitHub.gitAPIServerURL",
                });
            }
        }
        if let (Some(new), Some(old)) = (&self.gitlab, &old.gitlab) {
            if new.git_api_server_url != old.git_api_server_url {
                return Err(ValidationError::ImmutableField {
                    field: "gitLab.gitAPIServerURL",
                });
            }
        }
        if self.repository_owner != old.repository_owner {
            return Err(ValidationError::ImmutableField {
                field: "repositoryOwner",
            });
        }
        if self.repository_name != old.repository_name {
            return Err(ValidationError::ImmutableField {
                field: "repositoryName",
            });
        }
        if self.callback_url() != old.callback_url() {
            return Err(ValidationError::ImmutableField {
                field: "webhookURL",
            });
        }
        Ok(())
    }

    /// Reference to the webhook signing secret.
    pub fn webhook_secret_reference(&self) -> SecretReference {
        SecretReference::new(
            self.namespace.clone(),
            self.webhook_secret.name.clone(),
            WEBHOOK_SECRET_KEY,
        )
    }

    /// Reference to the provider access token.
    pub fn token_reference(&self) -> Result<SecretReference, ValidationError> {
        let server = self.provider()?.server();
        Ok(SecretReference::new(
            self.namespace.clone(),
            server.git_server_credentials.name.clone(),
            TOKEN_KEY,
        ))
    }

    /// `namespace/name` of the declaration, for logging.
    pub fn display_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }
}

fn check_http_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidUrl {
        field,
        value: value.to_string(),
    };
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(())
}
