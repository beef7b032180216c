//! Core types for scaffolder-publish

pub mod request;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use request::{PublishRequest, PublishResult, PublishValues};

/// GitLab project visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Namespace a new project is created under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceId {
    /// Group (or user) namespace found by looking up the owner
    Group(u64),
    /// Personal namespace of the authenticated user
    User(u64),
}

impl NamespaceId {
    pub fn id(self) -> u64 {
        match self {
            NamespaceId::Group(id) | NamespaceId::User(id) => id,
        }
    }
}
