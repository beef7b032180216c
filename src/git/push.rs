//! Initialize a scaffolded directory as a git repository and push it.

use async_trait::async_trait;
use git2::{
    Commit, Cred, IndexAddOption, Oid, PushOptions, RemoteCallbacks, Repository,
    RepositoryInitOptions, Signature,
};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use tracing::{debug, info, Span};

use super::error::{GitError, Result};
use crate::config::CommitAuthor;

const REMOTE_NAME: &str = "origin";
const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";
const UPDATE_COMMIT_MESSAGE: &str = "Add scaffolded files";

/// HTTP basic credentials used for the push
#[derive(Clone, PartialEq, Eq)]
pub struct PushAuth {
    pub username: String,
    pub password: String,
}

impl PushAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Custom Debug to avoid exposing the password
impl std::fmt::Debug for PushAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Everything needed to turn a directory into a pushed repository
#[derive(Debug, Clone)]
pub struct PushRequest {
    pub dir: PathBuf,
    pub remote_url: String,
    pub auth: PushAuth,
    pub default_branch: String,
    pub author: CommitAuthor,
    /// Span the push logs into
    pub span: Span,
}

impl PushRequest {
    pub fn new(dir: impl Into<PathBuf>, remote_url: impl Into<String>, auth: PushAuth) -> Self {
        Self {
            dir: dir.into(),
            remote_url: remote_url.into(),
            auth,
            default_branch: "master".to_string(),
            author: CommitAuthor::default(),
            span: Span::current(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn with_author(mut self, author: CommitAuthor) -> Self {
        self.author = author;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Pushes a local directory to a freshly created remote
#[async_trait]
pub trait RepoPusher: Send + Sync {
    async fn init_and_push(&self, request: PushRequest) -> Result<()>;
}

/// `RepoPusher` backed by libgit2
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGitPusher;

impl LocalGitPusher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RepoPusher for LocalGitPusher {
    async fn init_and_push(&self, request: PushRequest) -> Result<()> {
        // libgit2 blocks; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            let _entered = request.span.enter();
            init_repo_and_push(&request).map(|_| ())
        })
        .await
        .map_err(|e| GitError::TaskFailed(e.to_string()))?
    }
}

/// Initialize `dir`, commit everything in it and push the branch to `remote_url`.
///
/// Returns the id of the pushed commit.
pub fn init_repo_and_push(request: &PushRequest) -> Result<Oid> {
    if !request.dir.is_dir() {
        return Err(GitError::DirectoryNotFound(request.dir.clone()));
    }

    let mut init_opts = RepositoryInitOptions::new();
    init_opts.initial_head(&request.default_branch);
    let repo = Repository::init_opts(&request.dir, &init_opts)?;
    debug!(dir = %request.dir.display(), branch = %request.default_branch, "Initialized repository");

    let commit = commit_all(&repo, &request.author)?;
    set_origin(&repo, &request.remote_url)?;
    push_head(&repo, request)?;

    info!(
        remote = %request.remote_url,
        branch = %request.default_branch,
        commit = %commit,
        "Pushed scaffolded repository"
    );
    Ok(commit)
}

/// Stage every non-ignored file and commit it.
///
/// A fresh repository gets a root "Initial commit". A repository that already
/// has commits gets a child commit, or none at all when nothing changed, in
/// which case HEAD is returned.
fn commit_all(repo: &Repository, author: &CommitAuthor) -> Result<Oid> {
    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.write()?;

    let tree_id = index.write_tree()?;
    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(_) => None,
    };

    if let Some(parent) = &parent {
        if parent.tree_id() == tree_id {
            debug!(commit = %parent.id(), "Nothing to commit, pushing existing HEAD");
            return Ok(parent.id());
        }
    }

    let tree = repo.find_tree(tree_id)?;
    let sig = Signature::now(&author.name, &author.email)?;
    let message = if parent.is_some() {
        UPDATE_COMMIT_MESSAGE
    } else {
        INITIAL_COMMIT_MESSAGE
    };
    let parents: Vec<&Commit> = parent.iter().collect();

    Ok(repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?)
}

/// Add the origin remote, or repoint it if the directory already had one
fn set_origin(repo: &Repository, url: &str) -> Result<()> {
    if repo.find_remote(REMOTE_NAME).is_ok() {
        repo.remote_set_url(REMOTE_NAME, url)?;
    } else {
        repo.remote(REMOTE_NAME, url)?;
    }
    Ok(())
}

fn push_head(repo: &Repository, request: &PushRequest) -> Result<()> {
    let mut remote = repo.find_remote(REMOTE_NAME)?;
    let refspec = format!("HEAD:refs/heads/{}", request.default_branch);

    let tried_credentials = Cell::new(false);
    let rejection: RefCell<Option<(String, String)>> = RefCell::new(None);

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, _username_from_url, _allowed_types| {
        // libgit2 keeps asking while the server says 401
        if tried_credentials.replace(true) {
            return Err(git2::Error::from_str("credentials rejected by remote"));
        }
        Cred::userpass_plaintext(&request.auth.username, &request.auth.password)
    });
    callbacks.push_update_reference(|reference, status| {
        if let Some(message) = status {
            *rejection.borrow_mut() = Some((reference.to_string(), message.to_string()));
        }
        Ok(())
    });

    let mut push_opts = PushOptions::new();
    push_opts.remote_callbacks(callbacks);

    remote
        .push(&[refspec.as_str()], Some(&mut push_opts))
        .map_err(|e| GitError::PushFailed {
            remote: request.remote_url.clone(),
            message: e.message().to_string(),
        })?;

    if let Some((reference, message)) = rejection.take() {
        return Err(GitError::PushRejected { reference, message });
    }
    Ok(())
}
