use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::workflow::types::{ApproveOutcome, CreateOutcome};

/// Step outputs handed back to the CI runner. Unset fields are not written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionOutputs {
    #[serde(rename = "pull-request-approved", skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(rename = "pull-request-auto-merge", skip_serializing_if = "Option::is_none")]
    pub auto_merge: Option<bool>,
    #[serde(rename = "pull-request-merged", skip_serializing_if = "Option::is_none")]
    pub merged: Option<bool>,
    #[serde(rename = "pull-request-created", skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(rename = "pull-request-number", skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(rename = "pull-request-url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ActionOutputs {
    /// Key/value pairs in their fixed output order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = self.approved {
            pairs.push(("pull-request-approved", v.to_string()));
        }
        if let Some(v) = self.auto_merge {
            pairs.push(("pull-request-auto-merge", v.to_string()));
        }
        if let Some(v) = self.merged {
            pairs.push(("pull-request-merged", v.to_string()));
        }
        if let Some(v) = self.created {
            pairs.push(("pull-request-created", v.to_string()));
        }
        if let Some(v) = self.number {
            pairs.push(("pull-request-number", v.to_string()));
        }
        if let Some(v) = &self.url {
            pairs.push(("pull-request-url", v.clone()));
        }
        pairs
    }

    /// `key=value` lines, each newline-terminated.
    pub fn render(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }
}

impl From<&ApproveOutcome> for ActionOutputs {
    fn from(outcome: &ApproveOutcome) -> Self {
        Self {
            approved: Some(true),
            auto_merge: Some(outcome.auto_merge_enabled),
            merged: Some(outcome.merged),
            ..Self::default()
        }
    }
}

impl From<&CreateOutcome> for ActionOutputs {
    fn from(outcome: &CreateOutcome) -> Self {
        match outcome {
            CreateOutcome::NoChanges { .. } => Self {
                created: Some(false),
                ..Self::default()
            },
            CreateOutcome::PullRequestCreated { pull_request, .. } => Self {
                created: Some(true),
                number: Some(pull_request.number),
                url: Some(pull_request.html_url.clone()),
                ..Self::default()
            },
        }
    }
}

/// Write outputs to `path`, replacing any previous content.
pub async fn write_outputs(path: &Path, outputs: &ActionOutputs) -> Result<()> {
    tokio::fs::write(path, outputs.render()).await?;
    Ok(())
}
