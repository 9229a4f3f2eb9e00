//! Project domain types.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;

/// The namespace (user or group) a project lives in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Namespace {
    /// Full path of the namespace, e.g. `acme/platform`
    #[serde(default)]
    pub full_path: String,
}

/// Represents a GitLab project as returned by the listing endpoints.
///
/// # Examples
///
/// ```rust
/// use gitlab_client::Project;
///
/// let project: Project = serde_json::from_str(r#"{
///     "id": 3,
///     "name": "widgets",
///     "path_with_namespace": "acme/widgets",
///     "namespace": { "full_path": "acme" }
/// }"#).unwrap();
///
/// assert_eq!(project.id, 3);
/// assert_eq!(project.owner(), Some("acme"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Project {
    /// The unique numeric ID of the project
    pub id: u64,

    /// Display name of the project
    pub name: String,

    /// `namespace/path` of the project
    #[serde(default)]
    pub path_with_namespace: Option<String>,

    /// Namespace owning the project
    #[serde(default)]
    pub namespace: Option<Namespace>,
}

impl Project {
    /// Returns the full path of the owning namespace when known.
    pub fn owner(&self) -> Option<&str> {
        self.namespace
            .as_ref()
            .map(|ns| ns.full_path.as_str())
            .filter(|path| !path.is_empty())
    }
}
