use std::path::PathBuf;
use thiserror::Error;

use crate::bridge::ForgeError;
use crate::config::ConfigError;
use crate::git::GitError;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("GitLab API error: {0}")]
    Forge(#[from] ForgeError),

    #[error("Push error: {0}")]
    Git(#[from] GitError),

    #[error("Cannot determine repository name from store path: {0:?}")]
    InvalidStorePath(String),

    #[error("GitLab returned no clone URL for project {name}")]
    MissingCloneUrl { name: String },

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, PublishError>;
