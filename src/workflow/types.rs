use crate::platform::types::PullRequest;

/// Outcome of the approve flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveOutcome {
    pub pr_number: u64,
    pub auto_merge_enabled: bool,
    pub merged: bool,
}

/// Outcome of the create flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Nothing to commit after staging; no commit, push or PR.
    NoChanges { branch: String },
    /// Branch pushed and pull request opened.
    PullRequestCreated {
        branch: String,
        commit: String,
        pull_request: PullRequest,
    },
}

/// Progress of the create flow, logged alongside failures.
///
/// `Init → Branched → Staged → {NoChanges | Committed → Pushed → PrCreated}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStage {
    Init,
    Branched,
    Staged,
    NoChanges,
    Committed,
    Pushed,
    PrCreated,
}

impl std::fmt::Display for CreateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CreateStage::Init => "init",
            CreateStage::Branched => "branched",
            CreateStage::Staged => "staged",
            CreateStage::NoChanges => "no_changes",
            CreateStage::Committed => "committed",
            CreateStage::Pushed => "pushed",
            CreateStage::PrCreated => "pr_created",
        };
        f.write_str(s)
    }
}
