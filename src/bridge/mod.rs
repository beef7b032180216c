pub mod forge_client;
pub mod gitlab;

#[cfg(any(test, feature = "test-support"))]
pub mod mock_gitlab_client;

#[cfg(any(test, feature = "test-support"))]
pub use mock_gitlab_client::{MockCall, MockConfig, MockError, MockGitLabClient};

pub use forge_client::{
    CreateProjectRequest, ForgeError, ForgeResult, GitLabApi, Namespace, Project, User,
};
pub use gitlab::{api_url_for_host, GitLabClient, DEFAULT_GITLAB_HOST};
