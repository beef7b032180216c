//! Publishers: create a remote repository and push a scaffolded directory to it

pub mod gitlab;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{PublishRequest, PublishResult};

pub use gitlab::GitLabPublisher;

/// Publishes a local directory as a new remote repository
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Create the repository described by `request.values` and push
    /// `request.directory` to it
    async fn publish(&self, request: PublishRequest) -> Result<PublishResult>;
}
