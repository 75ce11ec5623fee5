pub mod github;
pub mod types;

#[cfg(test)]
pub mod recording;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

/// The code-hosting operations the flows need. `repo_full_name` is `owner/repo`.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Submit an `APPROVE` review on a pull request.
    async fn approve_pull_request(&self, repo_full_name: &str, pr_number: u64) -> Result<()>;

    /// Add a label to an issue or PR.
    async fn add_label(&self, repo_full_name: &str, issue_number: u64, label: &str) -> Result<()>;

    /// Merge a pull request now.
    async fn merge_pull_request(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<()>;

    /// Turn on auto-merge so the PR merges once required checks pass.
    async fn enable_auto_merge(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<()>;

    /// Create a pull request.
    async fn create_pull_request(
        &self,
        repo_full_name: &str,
        pr: &CreatePullRequest,
    ) -> Result<PullRequest>;
}
