//! Git error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    #[error("Push to {remote} failed: {message}")]
    PushFailed { remote: String, message: String },

    #[error("Remote rejected {reference}: {message}")]
    PushRejected { reference: String, message: String },

    #[error("Push task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, GitError>;
