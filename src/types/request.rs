//! Publish request and result types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Span;

/// Template values that decide where the repository is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishValues {
    /// Owner is an organization/group rather than a user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_org: Option<bool>,

    /// Target location, e.g. `https://gitlab.com/blam/test`
    pub store_path: String,

    /// Namespace path looked up before creating the project
    pub owner: String,
}

impl PublishValues {
    pub fn new(store_path: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            is_org: None,
            store_path: store_path.into(),
            owner: owner.into(),
        }
    }

    pub fn org(mut self) -> Self {
        self.is_org = Some(true);
        self
    }

    /// Repository name: the last non-empty path segment of `store_path`
    ///
    /// The scheme and host of a URL are never taken as the name, and any
    /// query string or fragment is ignored.
    pub fn repo_name(&self) -> Option<&str> {
        let path = self
            .store_path
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();

        let path = match path.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map_or("", |(_, p)| p),
            None => path,
        };

        path.split('/').rev().find(|segment| !segment.is_empty())
    }
}

/// A request to publish a scaffolded directory
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub values: PublishValues,

    /// Local directory holding the scaffolded files
    pub directory: PathBuf,

    /// Logging context of the calling task; everything the publish logs,
    /// including the push, is recorded inside this span
    pub span: Span,
}

impl PublishRequest {
    pub fn new(values: PublishValues, directory: impl Into<PathBuf>) -> Self {
        Self {
            values,
            directory: directory.into(),
            span: Span::current(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Where the published repository ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub remote_url: String,
    pub catalog_info_url: String,
}
