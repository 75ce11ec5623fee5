use std::path::PathBuf;

use crate::config::Identity;
use crate::error::{AppError, Result};
use crate::workspace::{git, remote};

/// A local checkout the flows operate on.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub path: PathBuf,
    pub remote: String,
    /// `owner/repo` that takes precedence over the remote URL.
    pub repository: Option<String>,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            remote: remote.into(),
            repository: None,
        }
    }

    pub fn with_repository(mut self, repository: Option<String>) -> Self {
        self.repository = repository;
        self
    }

    /// Resolve `owner/repo`: the configured repository if any, else the remote's URL.
    pub async fn repo_full_name(&self) -> Result<String> {
        if let Some(repo) = &self.repository {
            return Ok(repo.clone());
        }
        let url = git::remote_url(&self.path, &self.remote).await?;
        remote::extract_repo_path(&url).ok_or_else(|| {
            AppError::Config(format!(
                "Could not find remote repository path in '{}' URL: {url}",
                self.remote
            ))
        })
    }

    /// Create `branch` at HEAD and check it out.
    pub async fn start_branch(&self, branch: &str) -> Result<()> {
        git::create_branch(&self.path, branch).await
    }

    /// Stage everything; returns whether anything is staged.
    pub async fn stage_changes(&self) -> Result<bool> {
        git::stage_all(&self.path).await
    }

    pub async fn commit(
        &self,
        message: &str,
        author: &Identity,
        committer: &Identity,
    ) -> Result<String> {
        git::commit(&self.path, message, author, committer).await
    }

    pub async fn push(&self, branch: &str, token: &str) -> Result<()> {
        git::push(&self.path, &self.remote, branch, token).await
    }
}
