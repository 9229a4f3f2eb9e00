//! Crate for managing repository webhooks through the GitHub REST API.
//!
//! This crate wraps an [`Octocrab`] client and exposes the calls needed to
//! converge a repository webhook: locating the repository through the
//! organization or user listings, locating an existing hook by callback URL,
//! and creating, editing or deleting that hook. Every listing is paginated by
//! page number with a fixed page size and is followed until GitHub stops
//! advertising a next page.

use octocrab::{Octocrab, Page};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod repository;
pub use repository::{Repository, RepositoryOwner};

pub mod webhook;
pub use webhook::{
    parse_insecure_ssl, UnknownWebhookEvent, Webhook, WebhookConfig, WebhookEvent,
    WebhookPayload, REPOSITORY_HOOK_NAME,
};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Number of items requested per page on every listing call.
pub const PAGE_SIZE: u8 = 100;

#[derive(Debug, Serialize)]
struct PageParameters {
    per_page: u8,
    page: u32,
}

/// A client for managing repository webhooks on GitHub.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` from an already configured `Octocrab` instance.
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Creates a client authenticated with `token` against `base_url`.
    ///
    /// See [`create_token_client`] for the accepted values.
    ///
    /// # Errors
    /// Returns `Error::ClientConstruction` if the base URL is not a valid
    /// absolute http(s) URL or the client cannot be built.
    pub fn with_token(token: &str, base_url: Option<&str>) -> Result<Self, Error> {
        create_token_client(token, base_url).map(Self::new)
    }

    /// Finds a repository by exact name among the repositories of an organization.
    ///
    /// All pages of the organization listing are inspected before concluding the
    /// repository is absent. A 404 on the listing (the owner is not an
    /// organization) is reported as `Ok(None)`.
    ///
    /// # Arguments
    ///
    /// * `org` - The organization login.
    /// * `name` - The repository name, compared case-sensitively.
    ///
    /// # Errors
    /// Returns an error for any failed page request other than a 404.
    #[instrument(skip(self), fields(org = %org, repo = %name))]
    pub async fn find_org_repository(
        &self,
        org: &str,
        name: &str,
    ) -> Result<Option<Repository>, Error> {
        let route = format!("/orgs/{org}/repos");
        self.find_repository_in_listing(&route, name).await
    }

    /// Finds a repository by exact name among the public repositories of a user.
    ///
    /// Behaves like [`GitHubClient::find_org_repository`] but uses the user
    /// listing.
    #[instrument(skip(self), fields(user = %user, repo = %name))]
    pub async fn find_user_repository(
        &self,
        user: &str,
        name: &str,
    ) -> Result<Option<Repository>, Error> {
        let route = format!("/users/{user}/repos");
        self.find_repository_in_listing(&route, name).await
    }

    async fn find_repository_in_listing(
        &self,
        route: &str,
        name: &str,
    ) -> Result<Option<Repository>, Error> {
        match self
            .find_in_pages(route, |repo: &Repository| repo.name() == name)
            .await
        {
            Ok(found) => Ok(found),
            Err(Error::NotFound) => {
                debug!(route, "Repository listing returned 404, treating as empty");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Finds the webhook of a repository whose callback URL equals `callback_url`.
    ///
    /// The hook listing is walked page by page until a match is found or GitHub
    /// stops advertising a next page. A 404 on the listing is reported as
    /// `Ok(None)`.
    ///
    /// # Errors
    /// Returns an error for any failed page request other than a 404.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn find_repository_hook(
        &self,
        owner: &str,
        repo: &str,
        callback_url: &str,
    ) -> Result<Option<Webhook>, Error> {
        let route = format!("/repos/{owner}/{repo}/hooks");
        match self
            .find_in_pages(&route, |hook: &Webhook| hook.config.url == callback_url)
            .await
        {
            Ok(found) => Ok(found),
            Err(Error::NotFound) => {
                debug!(owner, repo, "Hook listing returned 404, treating as empty");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Creates a webhook on a repository.
    ///
    /// # Errors
    /// Returns an error if GitHub rejects the request.
    #[instrument(skip(self, payload), fields(owner = %owner, repo = %repo))]
    pub async fn create_repository_hook(
        &self,
        owner: &str,
        repo: &str,
        payload: &WebhookPayload,
    ) -> Result<Webhook, Error> {
        let route = format!("/repos/{owner}/{repo}/hooks");
        let hook: Webhook = self
            .client
            .post(route, Some(payload))
            .await
            .map_err(|e| map_octocrab_error("Failed to create repository webhook", e))?;

        info!(owner, repo, hook_id = hook.id, "Created repository webhook");
        Ok(hook)
    }

    /// Edits an existing repository webhook in a single call.
    ///
    /// # Errors
    /// Returns an error if GitHub rejects the request.
    #[instrument(skip(self, payload), fields(owner = %owner, repo = %repo, hook_id = hook_id))]
    pub async fn update_repository_hook(
        &self,
        owner: &str,
        repo: &str,
        hook_id: u64,
        payload: &WebhookPayload,
    ) -> Result<Webhook, Error> {
        let route = format!("/repos/{owner}/{repo}/hooks/{hook_id}");
        let hook: Webhook = self
            .client
            .patch(route, Some(payload))
            .await
            .map_err(|e| map_octocrab_error("Failed to update repository webhook", e))?;

        info!(owner, repo, hook_id, "Updated repository webhook");
        Ok(hook)
    }

    /// Deletes a repository webhook.
    ///
    /// # Errors
    /// Returns an error if GitHub rejects the request, including `Error::NotFound`
    /// when the hook no longer exists.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo, hook_id = hook_id))]
    pub async fn delete_repository_hook(
        &self,
        owner: &str,
        repo: &str,
        hook_id: u64,
    ) -> Result<(), Error> {
        let route = format!("/repos/{owner}/{repo}/hooks/{hook_id}");
        let response = self
            .client
            ._delete(route, None::<&()>)
            .await
            .map_err(|e| map_octocrab_error("Failed to delete repository webhook", e))?;
        octocrab::map_github_error(response)
            .await
            .map_err(|e| map_octocrab_error("Failed to delete repository webhook", e))?;

        info!(owner, repo, hook_id, "Deleted repository webhook");
        Ok(())
    }

    /// Walks a paginated listing until `matches` accepts an item.
    async fn find_in_pages<T, F>(&self, route: &str, mut matches: F) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
        F: FnMut(&T) -> bool,
    {
        let mut page_number: u32 = 1;
        loop {
            debug!(route, page = page_number, "Fetching listing page");
            let parameters = PageParameters {
                per_page: PAGE_SIZE,
                page: page_number,
            };
            let page: Page<T> = self
                .client
                .get(route, Some(&parameters))
                .await
                .map_err(|e| map_octocrab_error("Failed to fetch listing page", e))?;

            let has_next = page.next.is_some();
            if let Some(item) = page.items.into_iter().find(|item| matches(item)) {
                return Ok(Some(item));
            }
            if !has_next {
                return Ok(None);
            }
            page_number += 1;
        }
    }
}

/// Creates an `Octocrab` client authenticated with a personal or installation token.
///
/// # Arguments
///
/// * `token` - The token to send. An empty token produces an unauthenticated client.
/// * `base_url` - Optional API base URL, e.g. `https://ghe.example.com/api/v3/`.
///   `None` or an empty string selects `https://api.github.com`.
///
/// # Errors
///
/// Returns `Error::ClientConstruction` if the base URL is not an absolute
/// http(s) URL or the client cannot be built.
///
/// # Example
///
/// ```rust,no_run
/// use github_client::{create_token_client, Error};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Error> {
///     let client = create_token_client("ghp_example", Some("https://ghe.example.com/api/v3/"))?;
///     Ok(())
/// }
/// ```
#[instrument(skip(token))]
pub fn create_token_client(token: &str, base_url: Option<&str>) -> Result<Octocrab, Error> {
    let mut builder = Octocrab::builder();

    if let Some(raw) = base_url.map(str::trim).filter(|raw| !raw.is_empty()) {
        let parsed = Url::parse(raw).map_err(|e| {
            error!(base_url = raw, error = %e, "API base URL is not a valid absolute URL");
            Error::ClientConstruction(format!("invalid API base URL '{raw}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::ClientConstruction(format!(
                "API base URL '{raw}' must use http or https"
            )));
        }
        builder = builder.base_uri(parsed.as_str()).map_err(|e| {
            Error::ClientConstruction(format!("invalid API base URL '{raw}': {e}"))
        })?;
    }

    if !token.is_empty() {
        builder = builder.personal_token(token.to_string());
    }

    builder.build().map_err(|e| {
        error!(error = %e, "Failed to build Octocrab client");
        Error::ClientConstruction(e.to_string())
    })
}

fn map_octocrab_error(message: &str, e: octocrab::Error) -> Error {
    let mapped = match &e {
        octocrab::Error::GitHub { source, .. } => {
            Error::from_status(source.status_code, source.message.clone())
        }
        octocrab::Error::Serde { .. } | octocrab::Error::Json { .. } => Error::InvalidResponse,
        other => Error::Transport(other.to_string()),
    };
    log_octocrab_error(message, e);
    mapped
}

fn log_octocrab_error(message: &str, e: octocrab::Error) {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let err = source;
            error!(
                status = err.status_code.as_u16(),
                error_message = err.message,
                "{}. Received an error from GitHub",
                message
            )
        }
        octocrab::Error::UriParse { source, .. } => error!(
            error_message = source.to_string(),
            "{}. Failed to parse URI.",
            message
        ),
        octocrab::Error::Uri { source, .. } => error!(
            error_message = source.to_string(),
            "{}, Failed to parse URI.",
            message
        ),
        octocrab::Error::InvalidHeaderValue { source, .. } => error!(
            error_message = source.to_string(),
            "{}. One of the header values was invalid.",
            message
        ),
        _ => error!(error_message = e.to_string(), message),
    };
}
