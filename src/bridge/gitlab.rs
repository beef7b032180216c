//! GitLab API client implementation
//!
//! Implements the `GitLabApi` trait using the GitLab REST API v4.
//! See: https://docs.gitlab.com/ee/api/rest/

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::forge_client::{
    CreateProjectRequest, ForgeError, ForgeResult, GitLabApi, Namespace, Project, User,
};

/// Default GitLab host
pub const DEFAULT_GITLAB_HOST: &str = "gitlab.com";

const USER_AGENT: &str = "scaffolder-publish";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the REST API base URL for a GitLab host.
///
/// A bare host (`gitlab.com`) is served over https; a host that already
/// carries a scheme (`http://127.0.0.1:8080`) is used as-is.
pub fn api_url_for_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        format!("{host}/api/v4")
    } else {
        format!("https://{host}/api/v4")
    }
}

/// GitLab API client authenticated with a personal/project access token
pub struct GitLabClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for GitLabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabClient")
            .field("api_url", &self.api_url)
            .field("has_token", &!self.token.is_empty())
            .finish_non_exhaustive()
    }
}

impl GitLabClient {
    /// Create a client for the given host (e.g. `gitlab.com`)
    pub fn new(host: &str, token: impl Into<String>) -> ForgeResult<Self> {
        Self::with_api_url(api_url_for_host(host), token)
    }

    /// Create a client against an explicit API base URL
    /// (self-hosted instances behind a path prefix, or tests)
    pub fn with_api_url(api_url: impl Into<String>, token: impl Into<String>) -> ForgeResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Build headers for GitLab API requests
    fn headers(&self) -> ForgeResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "PRIVATE-TOKEN",
            HeaderValue::from_str(&self.token).map_err(|e| ForgeError::AuthenticationFailed {
                message: format!("Token is not a valid header value: {e}"),
            })?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Decode a successful response or convert the failure into a `ForgeError`
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ForgeResult<T> {
        if response.status().is_success() {
            return response.json().await.map_err(ForgeError::from);
        }
        Err(error_from_response(response).await)
    }
}

/// Map a non-success HTTP response to a `ForgeError`
async fn error_from_response(response: reqwest::Response) -> ForgeError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match status {
        StatusCode::UNAUTHORIZED => ForgeError::AuthenticationFailed {
            message: if body.is_empty() {
                "Invalid or expired token".to_string()
            } else {
                body
            },
        },
        StatusCode::FORBIDDEN => ForgeError::Forbidden { message: body },
        StatusCode::NOT_FOUND => ForgeError::NotFound { message: body },
        s if s.is_server_error() => ForgeError::ServerError {
            status: s.as_u16(),
            message: body,
        },
        s => ForgeError::ApiError {
            status: s.as_u16(),
            message: body,
        },
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    async fn show_namespace(&self, path: &str) -> ForgeResult<Namespace> {
        let url = format!("{}/namespaces/{}", self.api_url, urlencoding::encode(path));

        let response = self.client.get(&url).headers(self.headers()?).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(namespace = %path, "Namespace not found");
            return Ok(Namespace::default());
        }

        self.handle_response(response).await
    }

    async fn current_user(&self) -> ForgeResult<User> {
        let url = format!("{}/user", self.api_url);

        let response = self.client.get(&url).headers(self.headers()?).send().await?;

        self.handle_response(response).await
    }

    async fn create_project(&self, request: &CreateProjectRequest) -> ForgeResult<Project> {
        let url = format!("{}/projects", self.api_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            if body.contains("has already been taken") || body.contains("already exists") {
                return Err(ForgeError::RepoAlreadyExists {
                    name: request.name.clone(),
                });
            }
            return Err(ForgeError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        self.handle_response(response).await
    }
}
