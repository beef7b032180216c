//! scaffolder-publish - publish scaffolded projects to GitLab
//!
//! Creates a project under the owner's namespace (or the token owner's
//! personal namespace) through the GitLab REST API, then initializes the
//! scaffolded directory as a git repository and pushes it there.

pub mod bridge;
pub mod config;
pub mod error;
pub mod git;
pub mod publisher;
pub mod types;

// Re-exports for convenience
pub use bridge::{GitLabApi, GitLabClient};
pub use config::{CliOverrides, CommitAuthor, ConfigFile, GitLabConfig};
pub use error::{PublishError, Result};
pub use git::{LocalGitPusher, PushAuth, PushRequest, RepoPusher};
pub use publisher::{GitLabPublisher, Publisher};
pub use types::*;
