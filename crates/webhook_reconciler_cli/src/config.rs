//! Configuration management for the git-webhook CLI.
//!
//! The configuration is a TOML file holding the secret store settings, the
//! per-webhook deadline and the declared webhooks.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use webhook_reconciler::{
    EnvironmentSecretResolver, FilesystemSecretResolver, SecretResolver, WebhookSpec,
};

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "git-webhook.toml";

/// Default deadline for one webhook, in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

/// Where tokens and webhook secrets are read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// `<NAMESPACE>_<NAME>_<KEY>` environment variables
    #[default]
    Env,
    /// `<base_path>/<namespace>/<name>/<key>` files
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretsConfig {
    #[serde(default)]
    pub backend: SecretBackend,

    /// Root of the mounted secrets; required by the `file` backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<PathBuf>,
}

impl SecretsConfig {
    /// Builds the resolver for the configured backend.
    pub fn resolver(&self) -> Result<Arc<dyn SecretResolver>, Error> {
        match self.backend {
            SecretBackend::Env => Ok(Arc::new(EnvironmentSecretResolver::new())),
            SecretBackend::File => {
                let base_path = self.base_path.as_ref().ok_or_else(|| {
                    Error::Config("secrets.base_path is required for the file backend".to_string())
                })?;
                Ok(Arc::new(FilesystemSecretResolver::new(base_path)))
            }
        }
    }
}

/// Main configuration structure for the git-webhook CLI.
///
/// # Example TOML Configuration
///
/// ```toml
/// timeout_seconds = 30
///
/// [secrets]
/// backend = "file"
/// base_path = "/var/run/secrets"
///
/// [[webhooks]]
/// namespace = "ci"
/// name = "widgets-hook"
/// repositoryOwner = "acme"
/// repositoryName = "widgets"
/// webhookURL = "https://ci.example.com/hook"
/// events = ["push_events"]
/// webhookSecret = { name = "hook-secret" }
///
/// [webhooks.gitLab]
/// gitAPIServerURL = "https://gitlab.example.com"
/// gitServerCredentials = { name = "gitlab-token" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Deadline for reconciling or deleting one webhook
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub webhooks: Vec<WebhookSpec>,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist, cannot be read, or
    /// does not match the expected schema.
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        info!(
            webhooks = config.webhooks.len(),
            "Configuration loaded from {:?}", path
        );
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Returns the webhooks named in `names`, or all of them when `names` is
    /// empty. A name matches either `name` or `namespace/name`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArguments` for a name that matches no webhook.
    pub fn select(&self, names: &[String]) -> Result<Vec<&WebhookSpec>, Error> {
        if names.is_empty() {
            return Ok(self.webhooks.iter().collect());
        }

        names
            .iter()
            .map(|wanted| {
                self.webhooks
                    .iter()
                    .find(|spec| &spec.name == wanted || &spec.display_name() == wanted)
                    .ok_or_else(|| {
                        Error::InvalidArguments(format!("no webhook named '{}'", wanted))
                    })
            })
            .collect()
    }
}
