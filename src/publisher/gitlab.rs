//! GitLab publisher
//!
//! Resolves the namespace for the owner, creates the project through the
//! REST API and hands the scaffolded directory to a `RepoPusher`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, Instrument};

use super::Publisher;
use crate::bridge::{CreateProjectRequest, GitLabApi, GitLabClient};
use crate::config::{CommitAuthor, ConfigError, GitLabConfig};
use crate::error::{PublishError, Result};
use crate::git::{LocalGitPusher, PushAuth, PushRequest, RepoPusher};
use crate::types::{NamespaceId, PublishRequest, PublishResult, Visibility};

/// Username GitLab expects when a token is used as an HTTP password
const OAUTH_USERNAME: &str = "oauth2";

pub struct GitLabPublisher {
    token: String,
    client: Arc<dyn GitLabApi>,
    pusher: Arc<dyn RepoPusher>,
    repo_visibility: Option<Visibility>,
    default_branch: String,
    commit_author: CommitAuthor,
}

impl std::fmt::Debug for GitLabPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabPublisher")
            .field("repo_visibility", &self.repo_visibility)
            .field("default_branch", &self.default_branch)
            .field("commit_author", &self.commit_author)
            .finish_non_exhaustive()
    }
}

impl GitLabPublisher {
    /// Build a publisher talking to the configured host over HTTP and
    /// pushing with libgit2.
    ///
    /// Fails when no token is configured or the host is empty.
    pub fn from_config(config: &GitLabConfig) -> Result<Self> {
        if config.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost.into());
        }
        let token = config.token().ok_or_else(|| ConfigError::MissingToken {
            host: config.host.clone(),
        })?;

        let client = match &config.api_base_url {
            Some(api_url) => GitLabClient::with_api_url(api_url.as_str(), token)?,
            None => GitLabClient::new(&config.host, token)?,
        };
        debug!(api_url = %client.api_url(), "Created GitLab client");

        Ok(Self::with_clients(
            config,
            token,
            Arc::new(client),
            Arc::new(LocalGitPusher::new()),
        ))
    }

    /// Build a publisher around explicit API and push implementations
    pub fn with_clients(
        config: &GitLabConfig,
        token: impl Into<String>,
        client: Arc<dyn GitLabApi>,
        pusher: Arc<dyn RepoPusher>,
    ) -> Self {
        Self {
            token: token.into(),
            client,
            pusher,
            repo_visibility: config.repo_visibility,
            default_branch: config.default_branch.clone(),
            commit_author: config.commit_author.clone(),
        }
    }

    /// Namespace for the owner, or the token owner's personal namespace when
    /// GitLab has no namespace at that path
    ///
    /// An id of 0 is not a real namespace and also falls back to the user.
    pub async fn resolve_namespace(&self, owner: &str) -> Result<NamespaceId> {
        let namespace = self.client.show_namespace(owner).await?;
        if let Some(id) = namespace.id.filter(|id| *id != 0) {
            return Ok(NamespaceId::Group(id));
        }

        let user = self.client.current_user().await?;
        debug!(owner = %owner, user_id = user.id, "No namespace for owner, using current user");
        Ok(NamespaceId::User(user.id))
    }

    async fn publish_inner(&self, request: PublishRequest) -> Result<PublishResult> {
        let values = &request.values;
        let name = values
            .repo_name()
            .ok_or_else(|| PublishError::InvalidStorePath(values.store_path.clone()))?
            .to_string();

        if !request.directory.is_dir() {
            return Err(PublishError::DirectoryNotFound(request.directory));
        }

        info!(
            owner = %values.owner,
            is_org = values.is_org.unwrap_or(false),
            repo = %name,
            "Publishing to GitLab"
        );

        let namespace = self.resolve_namespace(&values.owner).await?;

        let project = self
            .client
            .create_project(
                &CreateProjectRequest::new(namespace.id(), name.as_str())
                    .with_visibility(self.repo_visibility),
            )
            .await?;
        let remote_url = project
            .http_url_to_repo
            .ok_or_else(|| PublishError::MissingCloneUrl { name: name.clone() })?;
        info!(repo = %name, namespace_id = namespace.id(), remote = %remote_url, "Created project");

        let push = PushRequest::new(
            request.directory,
            remote_url.as_str(),
            PushAuth::new(OAUTH_USERNAME, self.token.as_str()),
        )
        .with_branch(self.default_branch.as_str())
        .with_author(self.commit_author.clone())
        .with_span(request.span);
        self.pusher.init_and_push(push).await?;

        Ok(PublishResult {
            catalog_info_url: remote_url.clone(),
            remote_url,
        })
    }
}

#[async_trait]
impl Publisher for GitLabPublisher {
    async fn publish(&self, request: PublishRequest) -> Result<PublishResult> {
        let span = request.span.clone();
        self.publish_inner(request).instrument(span).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{ForgeError, MockCall, MockError, MockGitLabClient};
    use crate::git::{GitError, RecordingPusher};
    use crate::types::PublishValues;
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        client: MockGitLabClient,
        pusher: RecordingPusher,
        publisher: GitLabPublisher,
    }

    impl Harness {
        fn new(client: MockGitLabClient) -> Self {
            Self::with_config(client, RecordingPusher::new(), &GitLabConfig::default())
        }

        fn with_config(
            client: MockGitLabClient,
            pusher: RecordingPusher,
            config: &GitLabConfig,
        ) -> Self {
            let publisher = GitLabPublisher::with_clients(
                config,
                "fake-token",
                Arc::new(client.clone()),
                Arc::new(pusher.clone()),
            );
            Self {
                dir: TempDir::new().unwrap(),
                client,
                pusher,
                publisher,
            }
        }

        fn request(&self, values: PublishValues) -> PublishRequest {
            PublishRequest::new(values, self.dir.path())
        }
    }

    #[tokio::test]
    async fn test_publish_to_org_namespace() {
        let h = Harness::new(
            MockGitLabClient::new()
                .with_namespace_id(42)
                .with_clone_url("mockclone"),
        );
        let values = PublishValues::new("https://gitlab.com/blam/test", "bob").org();

        let result = h.publisher.publish(h.request(values)).await.unwrap();

        assert_eq!(
            h.client.calls(),
            vec![
                MockCall::ShowNamespace {
                    path: "bob".to_string()
                },
                MockCall::CreateProject(CreateProjectRequest::new(42, "test")),
            ]
        );

        let pushes = h.pusher.requests();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].dir, h.dir.path());
        assert_eq!(pushes[0].remote_url, "mockclone");
        assert_eq!(pushes[0].auth, PushAuth::new("oauth2", "fake-token"));
        assert_eq!(pushes[0].default_branch, "master");

        assert_eq!(
            result,
            PublishResult {
                remote_url: "mockclone".to_string(),
                catalog_info_url: "mockclone".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_publish_falls_back_to_current_user() {
        let h = Harness::new(
            MockGitLabClient::new()
                .with_user_id(21)
                .with_clone_url("mockclone"),
        );
        let values = PublishValues::new("https://gitlab.com/blam/test", "bob");

        let result = h.publisher.publish(h.request(values)).await.unwrap();

        assert!(h.client.was_called("current_user"));
        assert_eq!(
            h.client.created_projects(),
            vec![CreateProjectRequest::new(21, "test")]
        );
        assert_eq!(h.pusher.requests()[0].remote_url, "mockclone");
        assert_eq!(result.remote_url, "mockclone");
        assert_eq!(result.catalog_info_url, "mockclone");
    }

    #[tokio::test]
    async fn test_org_namespace_skips_user_lookup() {
        let h = Harness::new(
            MockGitLabClient::new()
                .with_namespace_id(42)
                .with_user_id(21)
                .with_clone_url("mockclone"),
        );

        h.publisher
            .publish(h.request(PublishValues::new("https://gitlab.com/blam/test", "bob")))
            .await
            .unwrap();

        assert!(!h.client.was_called("current_user"));
        assert_eq!(h.client.created_projects()[0].namespace_id, 42);
    }

    #[tokio::test]
    async fn test_zero_namespace_id_falls_back_to_current_user() {
        let h = Harness::new(
            MockGitLabClient::new()
                .with_namespace_id(0)
                .with_user_id(21)
                .with_clone_url("mockclone"),
        );

        h.publisher
            .publish(h.request(PublishValues::new("https://gitlab.com/blam/test", "bob")))
            .await
            .unwrap();

        assert!(h.client.was_called("current_user"));
        assert_eq!(
            h.client.created_projects(),
            vec![CreateProjectRequest::new(21, "test")]
        );
    }

    #[tokio::test]
    async fn test_push_runs_in_caller_span() {
        let subscriber = tracing_subscriber::registry();
        let _guard = tracing::subscriber::set_default(subscriber);

        let h = Harness::new(
            MockGitLabClient::new()
                .with_namespace_id(42)
                .with_clone_url("mockclone"),
        );
        let span = tracing::info_span!("caller");
        let request = h
            .request(PublishValues::new("https://gitlab.com/blam/test", "bob"))
            .with_span(span.clone());

        h.publisher.publish(request).await.unwrap();

        let pushes = h.pusher.requests();
        assert!(span.id().is_some());
        assert_eq!(pushes[0].span.id(), span.id());
    }

    #[tokio::test]
    async fn test_configured_visibility_and_branch() {
        let config = GitLabConfig::default()
            .with_repo_visibility(Visibility::Private)
            .with_default_branch("main");
        let h = Harness::with_config(
            MockGitLabClient::new()
                .with_namespace_id(42)
                .with_clone_url("mockclone"),
            RecordingPusher::new(),
            &config,
        );

        h.publisher
            .publish(h.request(PublishValues::new("https://gitlab.com/blam/test", "bob")))
            .await
            .unwrap();

        assert_eq!(
            h.client.created_projects(),
            vec![CreateProjectRequest::new(42, "test").with_visibility(Some(Visibility::Private))]
        );
        assert_eq!(h.pusher.requests()[0].default_branch, "main");
    }

    #[tokio::test]
    async fn test_api_error_propagates_without_push() {
        let h = Harness::new(MockGitLabClient::new().with_error(MockError::Forbidden(
            "insufficient_scope".to_string(),
        )));

        let err = h
            .publisher
            .publish(h.request(PublishValues::new("https://gitlab.com/blam/test", "bob")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishError::Forge(ForgeError::Forbidden { .. })
        ));
        assert_eq!(h.pusher.push_count(), 0);
    }

    #[tokio::test]
    async fn test_user_lookup_failure_propagates() {
        // no namespace and no user configured
        let h = Harness::new(MockGitLabClient::new().with_clone_url("mockclone"));

        let err = h
            .publisher
            .publish(h.request(PublishValues::new("https://gitlab.com/blam/test", "bob")))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Forge(_)));
        assert!(h.client.created_projects().is_empty());
        assert_eq!(h.pusher.push_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_store_path_makes_no_calls() {
        let h = Harness::new(MockGitLabClient::new().with_namespace_id(42));

        let err = h
            .publisher
            .publish(h.request(PublishValues::new("https://gitlab.com/", "bob")))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::InvalidStorePath(_)));
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_makes_no_calls() {
        let h = Harness::new(MockGitLabClient::new().with_namespace_id(42));
        let missing = h.dir.path().join("missing");

        let err = h
            .publisher
            .publish(PublishRequest::new(
                PublishValues::new("https://gitlab.com/blam/test", "bob"),
                &missing,
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::DirectoryNotFound(p) if p == missing));
        assert!(h.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_clone_url() {
        let h = Harness::new(MockGitLabClient::new().with_namespace_id(42));

        let err = h
            .publisher
            .publish(h.request(PublishValues::new("https://gitlab.com/blam/test", "bob")))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::MissingCloneUrl { name } if name == "test"));
        assert_eq!(h.pusher.push_count(), 0);
    }

    #[tokio::test]
    async fn test_push_failure_propagates() {
        let h = Harness::with_config(
            MockGitLabClient::new()
                .with_namespace_id(42)
                .with_clone_url("mockclone"),
            RecordingPusher::new().failing("remote hung up"),
            &GitLabConfig::default(),
        );

        let err = h
            .publisher
            .publish(h.request(PublishValues::new("https://gitlab.com/blam/test", "bob")))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Git(GitError::PushFailed { .. })));
    }

    #[test]
    fn test_from_config_requires_token() {
        let err = GitLabPublisher::from_config(&GitLabConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PublishError::Config(ConfigError::MissingToken { ref host }) if host == "gitlab.com"
        ));

        let err = GitLabPublisher::from_config(&GitLabConfig::new("gitlab.com", "")).unwrap_err();
        assert!(matches!(
            err,
            PublishError::Config(ConfigError::MissingToken { .. })
        ));
    }

    #[test]
    fn test_from_config_rejects_empty_host() {
        let err = GitLabPublisher::from_config(&GitLabConfig::new("  ", "token")).unwrap_err();
        assert!(matches!(err, PublishError::Config(ConfigError::EmptyHost)));
    }

    #[test]
    fn test_from_config() {
        let publisher =
            GitLabPublisher::from_config(&GitLabConfig::new("gitlab.example.com", "token"))
                .unwrap();
        assert_eq!(publisher.default_branch, "master");
        assert!(!format!("{publisher:?}").contains("token"));
    }
}
