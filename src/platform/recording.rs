//! In-memory `Platform` that records every call, for flow tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Approve {
        repo: String,
        pr_number: u64,
    },
    AddLabel {
        repo: String,
        issue_number: u64,
        label: String,
    },
    Merge {
        repo: String,
        pr_number: u64,
        method: MergeMethod,
    },
    EnableAutoMerge {
        repo: String,
        pr_number: u64,
        method: MergeMethod,
    },
    CreatePullRequest {
        repo: String,
        pr: CreatePullRequest,
    },
}

#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<Call>>,
    /// Number handed out by the next `create_pull_request`.
    next_pr_number: u64,
    fail_create: bool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            next_pr_number: 101,
            ..Self::default()
        }
    }

    /// Make `create_pull_request` return an API error.
    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn approve_pull_request(&self, repo_full_name: &str, pr_number: u64) -> Result<()> {
        self.record(Call::Approve {
            repo: repo_full_name.to_string(),
            pr_number,
        });
        Ok(())
    }

    async fn add_label(&self, repo_full_name: &str, issue_number: u64, label: &str) -> Result<()> {
        self.record(Call::AddLabel {
            repo: repo_full_name.to_string(),
            issue_number,
            label: label.to_string(),
        });
        Ok(())
    }

    async fn merge_pull_request(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<()> {
        self.record(Call::Merge {
            repo: repo_full_name.to_string(),
            pr_number,
            method,
        });
        Ok(())
    }

    async fn enable_auto_merge(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<()> {
        self.record(Call::EnableAutoMerge {
            repo: repo_full_name.to_string(),
            pr_number,
            method,
        });
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo_full_name: &str,
        pr: &CreatePullRequest,
    ) -> Result<PullRequest> {
        self.record(Call::CreatePullRequest {
            repo: repo_full_name.to_string(),
            pr: pr.clone(),
        });

        if self.fail_create {
            return Err(AppError::GitHubApi(
                "Validation Failed: a pull request already exists".to_string(),
            ));
        }

        Ok(PullRequest {
            number: self.next_pr_number,
            html_url: format!(
                "https://github.com/{repo_full_name}/pull/{}",
                self.next_pr_number
            ),
            title: pr.title.clone(),
            head_branch: pr.head_branch.clone(),
            base_branch: pr.base_branch.clone(),
        })
    }
}
