//! Resolution of provider tokens and webhook signing secrets.
//!
//! A webhook spec names its secrets by reference only. A [`SecretResolver`]
//! turns a [`SecretReference`] into the value held by the secret store.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
#[path = "event_secrets_tests.rs"]
mod tests;

/// Key holding the webhook signing secret.
pub const WEBHOOK_SECRET_KEY: &str = "secret";

/// Key holding the provider access token.
pub const TOKEN_KEY: &str = "token";

/// Error type for secret resolution failures.
///
/// Does NOT include secret values in error messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretResolutionError {
    #[error("Secret not found: {reference}")]
    NotFound { reference: String },

    #[error("Key '{key}' not found in secret {reference}")]
    KeyNotFound { reference: String, key: String },

    #[error("Access denied to secret: {reference}")]
    AccessDenied { reference: String },

    #[error("Invalid secret reference format: {reference}")]
    InvalidFormat { reference: String, reason: String },

    #[error("Secret resolution error: {message}")]
    Other { message: String },
}

/// Identifies one value in the secret store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretReference {
    /// Namespace of the declaring webhook
    pub namespace: String,

    /// Name of the secret; empty when no secret is configured
    pub name: String,

    /// Key inside the secret
    pub key: String,
}

impl SecretReference {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            key: key.into(),
        }
    }

    /// Returns `true` when no secret name is configured.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}[{}]", self.name, self.key)
        } else {
            write!(f, "{}/{}[{}]", self.namespace, self.name, self.key)
        }
    }
}

/// Abstraction for resolving tokens and webhook signing secrets.
///
/// # Security
/// - Secret values MUST NOT be logged
/// - Secret values MUST NOT be included in error messages
/// - Implementations MUST be thread-safe
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolves a secret reference to its actual value.
    async fn resolve_secret(
        &self,
        reference: &SecretReference,
    ) -> Result<SecretString, SecretResolutionError>;
}

/// Resolves `reference`, short-circuiting to an empty value when no secret
/// name is configured. The store is not consulted in that case.
pub async fn resolve_optional(
    resolver: &dyn SecretResolver,
    reference: &SecretReference,
) -> Result<SecretString, SecretResolutionError> {
    if reference.is_empty() {
        debug!(key = reference.key.as_str(), "No secret configured, using empty value");
        return Ok(SecretString::from(String::new()));
    }
    resolver.resolve_secret(reference).await
}

/// Resolves secrets from environment variables.
///
/// The variable name is `<NAMESPACE>_<NAME>_<KEY>` in upper case with every
/// character outside `[A-Z0-9]` replaced by `_`, so namespace `ci`, secret
/// `github-token` and key `token` read `CI_GITHUB_TOKEN_TOKEN`. An empty
/// namespace is left out.
///
/// # Example
/// ```no_run
/// use webhook_reconciler::event_secrets::{
///     EnvironmentSecretResolver, SecretReference, SecretResolver,
/// };
///
/// # async fn example() {
/// let resolver = EnvironmentSecretResolver::new();
/// let reference = SecretReference::new("ci", "hook-secret", "secret");
/// let secret = resolver.resolve_secret(&reference).await.unwrap();
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSecretResolver;

impl EnvironmentSecretResolver {
    pub fn new() -> Self {
        Self
    }

    /// Returns the environment variable consulted for `reference`.
    pub fn variable_name(reference: &SecretReference) -> String {
        [&reference.namespace, &reference.name, &reference.key]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() {
                            c.to_ascii_uppercase()
                        } else {
                            '_'
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("_")
    }
}

#[async_trait]
impl SecretResolver for EnvironmentSecretResolver {
    async fn resolve_secret(
        &self,
        reference: &SecretReference,
    ) -> Result<SecretString, SecretResolutionError> {
        let variable = Self::variable_name(reference);
        std::env::var(&variable)
            .map(SecretString::from)
            .map_err(|_| SecretResolutionError::NotFound {
                reference: variable,
            })
    }
}

/// Resolves secrets from filesystem paths (volume mounts).
///
/// Reads `<base>/<namespace>/<name>/<key>`, the layout of mounted secret
/// volumes. One trailing line break is removed.
#[derive(Debug, Clone)]
pub struct FilesystemSecretResolver {
    base_path: PathBuf,
}

impl FilesystemSecretResolver {
    /// Creates a new filesystem secret resolver.
    ///
    /// # Arguments
    /// * `base_path` - Directory containing one sub-directory per namespace
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn path_for(&self, reference: &SecretReference) -> Result<PathBuf, SecretResolutionError> {
        for part in [&reference.namespace, &reference.name, &reference.key] {
            if part.contains(['/', '\\']) || part == ".." {
                return Err(SecretResolutionError::InvalidFormat {
                    reference: reference.to_string(),
                    reason: "path separators are not allowed".to_string(),
                });
            }
        }
        let mut path = self.base_path.clone();
        if !reference.namespace.is_empty() {
            path.push(&reference.namespace);
        }
        path.push(&reference.name);
        path.push(&reference.key);
        Ok(path)
    }
}

#[async_trait]
impl SecretResolver for FilesystemSecretResolver {
    async fn resolve_secret(
        &self,
        reference: &SecretReference,
    ) -> Result<SecretString, SecretResolutionError> {
        let path = self.path_for(reference)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(mut content) => {
                if content.ends_with('\n') {
                    content.pop();
                    if content.ends_with('\r') {
                        content.pop();
                    }
                }
                Ok(SecretString::from(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let secret_dir = path.parent().map(|dir| dir.is_dir()).unwrap_or(false);
                if secret_dir {
                    Err(SecretResolutionError::KeyNotFound {
                        reference: reference.to_string(),
                        key: reference.key.clone(),
                    })
                } else {
                    Err(SecretResolutionError::NotFound {
                        reference: reference.to_string(),
                    })
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(SecretResolutionError::AccessDenied {
                    reference: reference.to_string(),
                })
            }
            Err(e) => Err(SecretResolutionError::Other {
                message: format!("Failed to read secret file: {}", e),
            }),
        }
    }
}
