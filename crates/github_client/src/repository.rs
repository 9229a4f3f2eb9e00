//! Repository domain types.
//!
//! This module contains the slice of a GitHub repository listing entry that
//! webhook management needs: the numeric ID, the name and the owner login.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;

/// The account that owns a repository.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepositoryOwner {
    /// The login name of the user or organization
    pub login: String,
}

/// Represents a GitHub repository as returned by the listing endpoints.
///
/// # Examples
///
/// ```rust
/// use github_client::Repository;
///
/// let repo: Repository = serde_json::from_str(r#"{
///     "id": 42,
///     "name": "widgets",
///     "full_name": "acme/widgets",
///     "owner": { "login": "acme" }
/// }"#).unwrap();
///
/// assert_eq!(repo.name(), "widgets");
/// assert_eq!(repo.owner_login(), Some("acme"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    /// The unique numeric ID of the repository
    id: u64,
    /// The name of the repository
    name: String,
    /// The full name of the repository (owner/name)
    #[serde(default)]
    full_name: Option<String>,
    /// The account owning the repository
    #[serde(default)]
    owner: Option<RepositoryOwner>,
}

impl Repository {
    /// Creates a new Repository instance.
    pub fn new(id: u64, name: impl Into<String>, owner: impl Into<String>) -> Self {
        let name = name.into();
        let owner = owner.into();
        Self {
            id,
            full_name: Some(format!("{owner}/{name}")),
            name,
            owner: Some(RepositoryOwner { login: owner }),
        }
    }

    /// Returns the numeric ID of the repository.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the name of the repository (without owner).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the full name (`owner/name`) when GitHub supplied it.
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    /// Returns the login of the owning account.
    ///
    /// Falls back to the part of `full_name` before the slash when the owner
    /// object is missing from the response.
    pub fn owner_login(&self) -> Option<&str> {
        self.owner
            .as_ref()
            .map(|owner| owner.login.as_str())
            .or_else(|| {
                self.full_name
                    .as_deref()
                    .and_then(|full| full.split_once('/'))
                    .map(|(owner, _)| owner)
            })
    }
}
