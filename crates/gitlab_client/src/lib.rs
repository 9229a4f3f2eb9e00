//! Crate for managing project hooks through the GitLab REST API (v4).
//!
//! The client locates projects through the group and user project listings,
//! locates an existing hook by callback URL, and adds, edits or deletes project
//! hooks. Listings are requested with a fixed page size and followed through
//! the `X-Next-Page` header until GitLab reports no further page.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod project;
pub use project::{Namespace, Project};

pub mod project_hook;
pub use project_hook::{HookEvents, ProjectHook, ProjectHookOptions, UnknownHookEvent};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// API root used when no base URL override is configured.
pub const DEFAULT_API_URL: &str = "https://gitlab.com/api/v4";

/// Path suffix appended to base URLs that do not already end with it.
const API_VERSION_PATH: [&str; 2] = ["api", "v4"];

/// Number of items requested per page on every listing call.
pub const PAGE_SIZE: u8 = 100;

const NEXT_PAGE_HEADER: &str = "x-next-page";
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

#[derive(Debug, Serialize)]
struct PageParameters {
    per_page: u8,
    page: u32,
}

/// A client for managing project hooks on GitLab.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_url: Url,
}

impl GitLabClient {
    /// Creates a client authenticated with `token` against `base_url`.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal, project or group access token. An empty token
    ///   produces an unauthenticated client.
    /// * `base_url` - Optional server URL. `/api/v4` is appended when the URL
    ///   does not already end with it. `None` or an empty string selects
    ///   [`DEFAULT_API_URL`].
    ///
    /// # Errors
    ///
    /// Returns `Error::ClientConstruction` if the URL is not an absolute
    /// http(s) URL and `Error::InvalidToken` if the token cannot be used as a
    /// header value.
    pub fn new(token: &str, base_url: Option<&str>) -> Result<Self, Error> {
        let base_url = parse_base_url(base_url)?;

        let mut headers = HeaderMap::new();
        if !token.is_empty() {
            let mut value = HeaderValue::from_str(token).map_err(|_| Error::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(TOKEN_HEADER, value);
        }

        let http = Client::builder()
            .user_agent(concat!("gitlab_client/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build GitLab HTTP client");
                Error::ClientConstruction(e.to_string())
            })?;

        debug!(base_url = %base_url, "Created GitLab client");
        Ok(Self { http, base_url })
    }

    /// Returns the API root all requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Finds a project by exact name among the projects of a group.
    ///
    /// All pages of the listing are inspected before concluding the project is
    /// absent. A 404 (the owner is not a group) is reported as `Ok(None)`.
    #[instrument(skip(self), fields(group = %group, project = %name))]
    pub async fn find_group_project(
        &self,
        group: &str,
        name: &str,
    ) -> Result<Option<Project>, Error> {
        self.find_project_in_listing(&["groups", group, "projects"], name)
            .await
    }

    /// Finds a project by exact name among the projects of a user.
    #[instrument(skip(self), fields(user = %user, project = %name))]
    pub async fn find_user_project(&self, user: &str, name: &str) -> Result<Option<Project>, Error> {
        self.find_project_in_listing(&["users", user, "projects"], name)
            .await
    }

    async fn find_project_in_listing(
        &self,
        segments: &[&str],
        name: &str,
    ) -> Result<Option<Project>, Error> {
        match self
            .find_in_pages(segments, |project: &Project| project.name == name)
            .await
        {
            Ok(found) => Ok(found),
            Err(Error::NotFound) => {
                debug!(listing = ?segments, "Project listing returned 404, treating as empty");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Finds the hook of a project whose URL equals `callback_url`.
    ///
    /// A 404 on the listing is reported as `Ok(None)`.
    #[instrument(skip(self), fields(project_id = project_id))]
    pub async fn find_project_hook(
        &self,
        project_id: u64,
        callback_url: &str,
    ) -> Result<Option<ProjectHook>, Error> {
        let id = project_id.to_string();
        match self
            .find_in_pages(&["projects", &id, "hooks"], |hook: &ProjectHook| {
                hook.url == callback_url
            })
            .await
        {
            Ok(found) => Ok(found),
            Err(Error::NotFound) => {
                debug!(project_id, "Hook listing returned 404, treating as empty");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Adds a hook to a project.
    #[instrument(skip(self, options), fields(project_id = project_id))]
    pub async fn add_project_hook(
        &self,
        project_id: u64,
        options: &ProjectHookOptions,
    ) -> Result<ProjectHook, Error> {
        let id = project_id.to_string();
        let request = self
            .request(Method::POST, &["projects", &id, "hooks"])?
            .json(options);
        let hook: ProjectHook = self.send_json(request).await?;

        info!(project_id, hook_id = hook.id, "Created project hook");
        Ok(hook)
    }

    /// Edits an existing project hook in a single call.
    #[instrument(skip(self, options), fields(project_id = project_id, hook_id = hook_id))]
    pub async fn edit_project_hook(
        &self,
        project_id: u64,
        hook_id: u64,
        options: &ProjectHookOptions,
    ) -> Result<ProjectHook, Error> {
        let id = project_id.to_string();
        let hook = hook_id.to_string();
        let request = self
            .request(Method::PUT, &["projects", &id, "hooks", &hook])?
            .json(options);
        let updated: ProjectHook = self.send_json(request).await?;

        info!(project_id, hook_id, "Updated project hook");
        Ok(updated)
    }

    /// Deletes a project hook.
    #[instrument(skip(self), fields(project_id = project_id, hook_id = hook_id))]
    pub async fn delete_project_hook(&self, project_id: u64, hook_id: u64) -> Result<(), Error> {
        let id = project_id.to_string();
        let hook = hook_id.to_string();
        let request = self.request(Method::DELETE, &["projects", &id, "hooks", &hook])?;
        self.send(request).await?;

        info!(project_id, hook_id, "Deleted project hook");
        Ok(())
    }

    /// Walks a paginated listing until `matches` accepts an item.
    async fn find_in_pages<T, F>(&self, segments: &[&str], mut matches: F) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
        F: FnMut(&T) -> bool,
    {
        let mut page_number: u32 = 1;
        loop {
            debug!(listing = ?segments, page = page_number, "Fetching listing page");
            let request = self.request(Method::GET, segments)?.query(&PageParameters {
                per_page: PAGE_SIZE,
                page: page_number,
            });
            let response = self.send(request).await?;
            let next_page = next_page(&response);
            let body = response.text().await?;
            let items: Vec<T> = serde_json::from_str(&body)?;

            if let Some(item) = items.into_iter().find(|item| matches(item)) {
                return Ok(Some(item));
            }
            match next_page {
                Some(next) if next > page_number => page_number = next,
                Some(next) => {
                    error!(listing = ?segments, page = page_number, next, "Listing does not advance");
                    return Err(Error::InvalidResponse(format!(
                        "next page {next} does not follow page {page_number}"
                    )));
                }
                None => return Ok(None),
            }
        }
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, Error> {
        let url = self.endpoint(segments)?;
        Ok(self.http.request(method, url))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::ClientConstruction(format!("'{}' cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Failed to send request to GitLab");
            Error::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        error!(
            status = status.as_u16(),
            error_message = message.as_str(),
            "Received an error from GitLab"
        );
        Err(Error::from_status(status, message))
    }
}

/// Reads the next page number; absent, empty or zero means the listing ended.
fn next_page(response: &Response) -> Option<u32> {
    response
        .headers()
        .get(NEXT_PAGE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|page| *page > 0)
}

/// Extracts the human readable part of a GitLab error body.
///
/// GitLab uses `{"message": ...}` (a string or a map of field errors) or
/// `{"error": ...}`.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("message").or_else(|| value.get("error")) {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}

fn parse_base_url(base_url: Option<&str>) -> Result<Url, Error> {
    let raw = base_url
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .unwrap_or(DEFAULT_API_URL);

    let mut url = Url::parse(raw).map_err(|e| {
        error!(base_url = raw, error = %e, "API base URL is not a valid absolute URL");
        Error::ClientConstruction(format!("invalid API base URL '{raw}': {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::ClientConstruction(format!(
            "API base URL '{raw}' must use http or https"
        )));
    }

    let has_api_suffix = url
        .path_segments()
        .map(|segments| {
            let segments: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
            segments.ends_with(&API_VERSION_PATH)
        })
        .unwrap_or(false);
    if !has_api_suffix {
        url.path_segments_mut()
            .map_err(|_| Error::ClientConstruction(format!("'{raw}' cannot be a base URL")))?
            .pop_if_empty()
            .extend(API_VERSION_PATH);
    }
    Ok(url)
}
