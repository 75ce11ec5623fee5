use async_trait::async_trait;
use octocrab::Octocrab;

use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Platform;

use super::graphql::{
    EnableAutoMergeData, GraphQlResponse, PullRequestNodeIdData, GQL_ENABLE_PR_AUTO_MERGE,
    GQL_GET_PR_NODE_ID,
};
use super::mapper;

/// GitHub REST/GraphQL access authenticated with the action token.
pub struct GitHubPlatform {
    client: Octocrab,
}

impl GitHubPlatform {
    pub fn new(token: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| AppError::GitHubApi(format!("Failed to build octocrab client: {e}")))?;

        Ok(Self { client })
    }

    fn parse_repo(repo_full_name: &str) -> Result<(&str, &str)> {
        let parts: Vec<&str> = repo_full_name.splitn(2, '/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(AppError::GitHubApi(format!(
                "Invalid repo name: {repo_full_name}"
            )));
        }
        Ok((parts[0], parts[1]))
    }

    /// Look up the GraphQL node id of a pull request.
    async fn pull_request_node_id(&self, owner: &str, repo: &str, pr_number: u64) -> Result<String> {
        let response: GraphQlResponse<PullRequestNodeIdData> = self
            .client
            .graphql(&serde_json::json!({
                "query": GQL_GET_PR_NODE_ID,
                "variables": {
                    "owner": owner,
                    "repo": repo,
                    "number": pr_number,
                }
            }))
            .await
            .map_err(|e| AppError::GitHubApi(format!("GraphQL query failed: {e}")))?;

        response.into_data()?.node_id().ok_or_else(|| {
            AppError::GitHubApi(format!("Pull request #{pr_number} not found in {owner}/{repo}"))
        })
    }
}

#[async_trait]
impl Platform for GitHubPlatform {
    async fn approve_pull_request(&self, repo_full_name: &str, pr_number: u64) -> Result<()> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;

        // octocrab has no review builder, use the API directly
        let url = format!("/repos/{owner}/{repo}/pulls/{pr_number}/reviews");
        let _: serde_json::Value = self
            .client
            .post(&url, Some(&serde_json::json!({ "event": "APPROVE" })))
            .await
            .map_err(|e| AppError::GitHubApi(format!("Failed to approve pull request: {e}")))?;

        Ok(())
    }

    async fn add_label(&self, repo_full_name: &str, issue_number: u64, label: &str) -> Result<()> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;

        self.client
            .issues(owner, repo)
            .add_labels(issue_number, &[label.to_string()])
            .await?;

        Ok(())
    }

    async fn merge_pull_request(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<()> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;

        let merge = self
            .client
            .pulls(owner, repo)
            .merge(pr_number)
            .method(mapper::map_merge_method(method))
            .send()
            .await?;

        if !merge.merged {
            return Err(AppError::GitHubApi(format!(
                "Pull request #{pr_number} was not merged: {}",
                merge.message.unwrap_or_default()
            )));
        }

        Ok(())
    }

    async fn enable_auto_merge(
        &self,
        repo_full_name: &str,
        pr_number: u64,
        method: MergeMethod,
    ) -> Result<()> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;
        let node_id = self.pull_request_node_id(owner, repo, pr_number).await?;

        tracing::debug!(pr = pr_number, node_id = %node_id, "Enabling auto-merge");

        let response: GraphQlResponse<EnableAutoMergeData> = self
            .client
            .graphql(&serde_json::json!({
                "query": GQL_ENABLE_PR_AUTO_MERGE,
                "variables": {
                    "pullRequestId": node_id,
                    "mergeMethod": method.graphql_name(),
                }
            }))
            .await
            .map_err(|e| AppError::GitHubApi(format!("GraphQL mutation failed: {e}")))?;

        response.into_data()?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        repo_full_name: &str,
        pr: &CreatePullRequest,
    ) -> Result<PullRequest> {
        let (owner, repo) = Self::parse_repo(repo_full_name)?;

        let pulls = self.client.pulls(owner, repo);
        let mut builder = pulls.create(&pr.title, &pr.head_branch, &pr.base_branch);
        if let Some(body) = &pr.body {
            builder = builder.body(body);
        }
        let created = builder.send().await?;

        Ok(mapper::map_pull_request(created))
    }
}
