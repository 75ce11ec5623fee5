use serde::Deserialize;

use crate::error::{AppError, Result};

pub const GQL_GET_PR_NODE_ID: &str = r#"
    query PullRequestNodeId($owner: String!, $repo: String!, $number: Int!) {
      repository(owner: $owner, name: $repo) {
        pullRequest(number: $number) {
          id
        }
      }
    }
    "#;

pub const GQL_ENABLE_PR_AUTO_MERGE: &str = r#"
    mutation EnablePullRequestAutoMerge($pullRequestId: ID!, $mergeMethod: PullRequestMergeMethod!) {
      enablePullRequestAutoMerge(input: { pullRequestId: $pullRequestId, mergeMethod: $mergeMethod }) {
        pullRequest {
          id
        }
      }
    }
    "#;

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// GraphQL reports failures in-band with a 200; surface them as errors.
    pub fn into_data(self) -> Result<T> {
        if let Some(errors) = self.errors {
            if !errors.is_empty() {
                let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
                return Err(AppError::GitHubApi(format!(
                    "GraphQL error: {}",
                    messages.join(", ")
                )));
            }
        }

        self.data
            .ok_or_else(|| AppError::GitHubApi("No data in GraphQL response".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct Node {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNodeIdData {
    pub repository: Option<RepositoryPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPullRequest {
    pub pull_request: Option<Node>,
}

impl PullRequestNodeIdData {
    pub fn node_id(self) -> Option<String> {
        self.repository?.pull_request.map(|pr| pr.id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableAutoMergeData {
    pub enable_pull_request_auto_merge: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestPayload {
    pub pull_request: Option<Node>,
}
