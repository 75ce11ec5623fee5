use crate::config::{ApproveInputs, MergeStrategy};
use crate::error::Result;
use crate::platform::Platform;
use crate::workflow::types::ApproveOutcome;
use crate::workspace::Workspace;

/// Approve a pull request, then enable auto-merge or merge it per `inputs.strategy`.
pub async fn approve_pull_request(
    platform: &dyn Platform,
    workspace: &Workspace,
    inputs: &ApproveInputs,
) -> Result<ApproveOutcome> {
    let repo_full_name = workspace.repo_full_name().await?;
    let pr_number = inputs.pull_request_number;

    tracing::info!(repo = %repo_full_name, pr = pr_number, "Approving pull request");
    platform
        .approve_pull_request(&repo_full_name, pr_number)
        .await?;

    let mut outcome = ApproveOutcome {
        pr_number,
        auto_merge_enabled: false,
        merged: false,
    };

    match inputs.strategy {
        MergeStrategy::None => {}
        MergeStrategy::AutoMerge => {
            platform
                .add_label(&repo_full_name, pr_number, &inputs.auto_merge_label)
                .await?;
            platform
                .enable_auto_merge(&repo_full_name, pr_number, inputs.merge_method)
                .await?;
            tracing::info!(
                repo = %repo_full_name,
                pr = pr_number,
                method = %inputs.merge_method,
                "Auto-merge enabled"
            );
            outcome.auto_merge_enabled = true;
        }
        MergeStrategy::Immediate => {
            platform
                .merge_pull_request(&repo_full_name, pr_number, inputs.merge_method)
                .await?;
            tracing::info!(
                repo = %repo_full_name,
                pr = pr_number,
                method = %inputs.merge_method,
                "Pull request merged"
            );
            outcome.merged = true;
        }
    }

    Ok(outcome)
}
