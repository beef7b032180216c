//! Configuration for the GitLab publisher
//!
//! Read from `~/.config/scaffolder-publish/config.yaml`:
//!
//! ```yaml
//! gitlab:
//!   host: gitlab.example.com
//!   token: glpat-xxxx
//!   repo_visibility: private
//!   default_branch: main
//!   commit_author:
//!     name: Scaffolder
//!     email: scaffolder@example.com
//! ```
//!
//! `GITLAB_HOST` and `GITLAB_TOKEN` override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::bridge::DEFAULT_GITLAB_HOST;
use crate::types::Visibility;

pub const TOKEN_ENV: &str = "GITLAB_TOKEN";
pub const HOST_ENV: &str = "GITLAB_HOST";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No GitLab token configured for {host}. Set GITLAB_TOKEN or gitlab.token.")]
    MissingToken { host: String },

    #[error("GitLab host must not be empty")]
    EmptyHost,

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Author of the initial commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl Default for CommitAuthor {
    fn default() -> Self {
        Self {
            name: "Scaffolder".to_string(),
            email: "scaffolder@example.com".to_string(),
        }
    }
}

/// Settings for publishing to one GitLab host
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Overrides the `https://<host>/api/v4` default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Sent on project creation when set; GitLab's own default applies otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_visibility: Option<Visibility>,

    #[serde(default = "default_branch")]
    pub default_branch: String,

    #[serde(default)]
    pub commit_author: CommitAuthor,
}

fn default_host() -> String {
    DEFAULT_GITLAB_HOST.to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("host", &self.host)
            .field("has_token", &self.token.is_some())
            .field("api_base_url", &self.api_base_url)
            .field("repo_visibility", &self.repo_visibility)
            .field("default_branch", &self.default_branch)
            .field("commit_author", &self.commit_author)
            .finish()
    }
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            token: None,
            api_base_url: None,
            repo_visibility: None,
            default_branch: default_branch(),
            commit_author: CommitAuthor::default(),
        }
    }
}

impl GitLabConfig {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: Some(token.into()),
            ..Default::default()
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_repo_visibility(mut self, visibility: Visibility) -> Self {
        self.repo_visibility = Some(visibility);
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    /// The configured token, if it is set and non-empty
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// Replace host/token with values from the environment when present
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        self
    }
}

/// Values given on the command line; each one that is set wins over the
/// file and the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub token: Option<String>,
    pub repo_visibility: Option<Visibility>,
    pub default_branch: Option<String>,
}

impl GitLabConfig {
    pub fn apply_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(host) = cli.host {
            self.host = host;
        }
        if let Some(token) = cli.token {
            self.token = Some(token);
        }
        if let Some(visibility) = cli.repo_visibility {
            self.repo_visibility = Some(visibility);
        }
        if let Some(branch) = cli.default_branch {
            self.default_branch = branch;
        }
        self
    }
}

/// Root config.yaml structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gitlab: GitLabConfig,
}

impl ConfigFile {
    /// Default location: `~/.config/scaffolder-publish/config.yaml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home
            .join(".config")
            .join("scaffolder-publish")
            .join("config.yaml"))
    }

    /// Load the config file; a missing file yields the defaults
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}
