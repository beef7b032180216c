//! Mock GitLabApi implementation for testing
//!
//! Configurable in-memory stand-in for the GitLab API that records every
//! call so tests can assert on exactly what the publisher sent.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::forge_client::{
    CreateProjectRequest, ForgeError, ForgeResult, GitLabApi, Namespace, Project, User,
};

/// Configuration for mock responses
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Namespace returned from show_namespace
    pub namespace: Namespace,
    /// User returned from current_user
    pub user: Option<User>,
    /// Clone URL put on created projects
    pub clone_url: Option<String>,
    /// Error to return instead of normal response (if set)
    pub error: Option<MockError>,
}

/// Errors that can be configured for the mock
#[derive(Debug, Clone)]
pub enum MockError {
    AuthenticationFailed(String),
    Forbidden(String),
    RepoAlreadyExists(String),
    ApiError { status: u16, message: String },
    ServerError { status: u16, message: String },
}

impl From<MockError> for ForgeError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::AuthenticationFailed(msg) => {
                ForgeError::AuthenticationFailed { message: msg }
            }
            MockError::Forbidden(msg) => ForgeError::Forbidden { message: msg },
            MockError::RepoAlreadyExists(name) => ForgeError::RepoAlreadyExists { name },
            MockError::ApiError { status, message } => ForgeError::ApiError { status, message },
            MockError::ServerError { status, message } => {
                ForgeError::ServerError { status, message }
            }
        }
    }
}

/// Record of a call made to the mock client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ShowNamespace { path: String },
    CurrentUser,
    CreateProject(CreateProjectRequest),
}

/// A mock implementation of GitLabApi for testing purposes
///
/// # Example
///
/// ```rust,ignore
/// let mock = MockGitLabClient::new()
///     .with_namespace_id(42)
///     .with_clone_url("mockclone");
///
/// let project = mock.create_project(&CreateProjectRequest::new(42, "test")).await?;
/// assert_eq!(project.http_url_to_repo.as_deref(), Some("mockclone"));
/// ```
#[derive(Clone, Default)]
pub struct MockGitLabClient {
    config: Arc<Mutex<MockConfig>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGitLabClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace lookups return this id
    pub fn with_namespace_id(self, id: u64) -> Self {
        self.config.lock().unwrap().namespace.id = Some(id);
        self
    }

    /// The authenticated user has this id
    pub fn with_user_id(self, id: u64) -> Self {
        self.config.lock().unwrap().user = Some(User { id, username: None });
        self
    }

    /// Created projects carry this clone URL
    pub fn with_clone_url(self, url: impl Into<String>) -> Self {
        self.config.lock().unwrap().clone_url = Some(url.into());
        self
    }

    /// Configure an error to return from all operations
    pub fn with_error(self, error: MockError) -> Self {
        self.config.lock().unwrap().error = Some(error);
        self
    }

    /// Get the call log for verification
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Requests passed to create_project, in order
    pub fn created_projects(&self) -> Vec<CreateProjectRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::CreateProject(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Check if a specific method was called
    pub fn was_called(&self, method: &str) -> bool {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .any(|call| match (call, method) {
                (MockCall::ShowNamespace { .. }, "show_namespace")
                | (MockCall::CurrentUser, "current_user")
                | (MockCall::CreateProject(_), "create_project") => true,
                _ => false,
            })
    }

    fn log_call(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }

    fn check_error(&self) -> ForgeResult<()> {
        let config = self.config.lock().unwrap();
        if let Some(err) = &config.error {
            return Err(err.clone().into());
        }
        Ok(())
    }
}

#[async_trait]
impl GitLabApi for MockGitLabClient {
    async fn show_namespace(&self, path: &str) -> ForgeResult<Namespace> {
        self.log_call(MockCall::ShowNamespace {
            path: path.to_string(),
        });
        self.check_error()?;

        Ok(self.config.lock().unwrap().namespace.clone())
    }

    async fn current_user(&self) -> ForgeResult<User> {
        self.log_call(MockCall::CurrentUser);
        self.check_error()?;

        self.config
            .lock()
            .unwrap()
            .user
            .clone()
            .ok_or_else(|| ForgeError::AuthenticationFailed {
                message: "mock has no current user".to_string(),
            })
    }

    async fn create_project(&self, request: &CreateProjectRequest) -> ForgeResult<Project> {
        self.log_call(MockCall::CreateProject(request.clone()));
        self.check_error()?;

        let config = self.config.lock().unwrap();
        Ok(Project {
            id: Some(1),
            http_url_to_repo: config.clone_url.clone(),
            web_url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls_in_order() {
        let mock = MockGitLabClient::new()
            .with_user_id(21)
            .with_clone_url("mockclone");

        mock.show_namespace("bob").await.unwrap();
        mock.current_user().await.unwrap();
        mock.create_project(&CreateProjectRequest::new(21, "test"))
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                MockCall::ShowNamespace {
                    path: "bob".to_string()
                },
                MockCall::CurrentUser,
                MockCall::CreateProject(CreateProjectRequest::new(21, "test")),
            ]
        );
        assert!(mock.was_called("current_user"));
    }

    #[tokio::test]
    async fn test_mock_with_error() {
        let mock = MockGitLabClient::new()
            .with_error(MockError::Forbidden("insufficient_scope".to_string()));

        let result = mock.show_namespace("bob").await;
        match result.unwrap_err() {
            ForgeError::Forbidden { message } => assert_eq!(message, "insufficient_scope"),
            other => panic!("Expected Forbidden error, got {other:?}"),
        }
        assert!(mock.was_called("show_namespace"));
        assert!(!mock.was_called("create_project"));
    }

    #[tokio::test]
    async fn test_mock_without_user_fails() {
        let mock = MockGitLabClient::new();
        assert!(mock.current_user().await.is_err());
    }
}
