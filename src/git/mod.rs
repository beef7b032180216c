//! Local git operations: initialize the scaffolded directory and push it

pub mod error;
pub mod push;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use error::{GitError, Result as GitResult};
#[cfg(any(test, feature = "test-support"))]
pub use mock::RecordingPusher;
pub use push::{init_repo_and_push, LocalGitPusher, PushAuth, PushRequest, RepoPusher};
