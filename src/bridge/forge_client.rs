//! GitLabApi trait and supporting types for the GitLab REST API
//!
//! The publisher only needs three endpoints: namespace lookup, current user
//! lookup and project creation. They sit behind the `GitLabApi` trait so the
//! publisher can be driven by the HTTP client or by the in-memory mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Visibility;

/// Errors that can occur when talking to the GitLab API
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Authentication failed (401)
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Forbidden - token lacks the required scope (403)
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Resource not found (404)
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Project already exists in the target namespace
    #[error("Repository already exists: {name}")]
    RepoAlreadyExists { name: String },

    /// Network/connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// API error with status code and message
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Server error (5xx)
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
}

/// Result type for GitLab API operations
pub type ForgeResult<T> = std::result::Result<T, ForgeError>;

/// Namespace returned by `GET /namespaces/:id`
///
/// `id` is optional: an unknown namespace is reported as an empty result
/// rather than an error so callers can fall back to the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub full_path: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

/// User returned by `GET /user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
}

/// Project returned by `POST /projects`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub http_url_to_repo: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// Request body for `POST /projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub namespace_id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl CreateProjectRequest {
    pub fn new(namespace_id: u64, name: impl Into<String>) -> Self {
        Self {
            namespace_id,
            name: name.into(),
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Option<Visibility>) -> Self {
        self.visibility = visibility;
        self
    }
}

/// The slice of the GitLab API used for publishing
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// Look up a namespace (group or user) by its full path
    ///
    /// # Returns
    /// * `Ok(Namespace)` with `id: None` when GitLab does not know the path
    /// * `Err(ForgeError)` - any other API or network failure
    async fn show_namespace(&self, path: &str) -> ForgeResult<Namespace>;

    /// Get the user the token belongs to
    async fn current_user(&self) -> ForgeResult<User>;

    /// Create a new project
    ///
    /// # Returns
    /// * `Ok(Project)` - The created project
    /// * `Err(ForgeError::RepoAlreadyExists)` - Name is taken in the namespace
    async fn create_project(&self, request: &CreateProjectRequest) -> ForgeResult<Project>;
}
