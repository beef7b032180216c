//! Recording `RepoPusher` for tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::error::{GitError, Result};
use super::push::{PushRequest, RepoPusher};

/// Pusher that records every request instead of touching git
#[derive(Clone, Default)]
pub struct RecordingPusher {
    requests: Arc<Mutex<Vec<PushRequest>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl RecordingPusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every push fail with `message`
    pub fn failing(self, message: impl Into<String>) -> Self {
        *self.failure.lock().unwrap() = Some(message.into());
        self
    }

    pub fn requests(&self) -> Vec<PushRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn push_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl RepoPusher for RecordingPusher {
    async fn init_and_push(&self, request: PushRequest) -> Result<()> {
        let remote = request.remote_url.clone();
        self.requests.lock().unwrap().push(request);

        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(GitError::PushFailed { remote, message }),
            None => Ok(()),
        }
    }
}
