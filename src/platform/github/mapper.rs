use octocrab::params;

use crate::platform::types;

pub fn map_pull_request(pr: octocrab::models::pulls::PullRequest) -> types::PullRequest {
    types::PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default(),
        title: pr.title.clone().unwrap_or_default(),
        head_branch: pr.head.ref_field.clone(),
        base_branch: pr.base.ref_field.clone(),
    }
}

pub fn map_merge_method(method: types::MergeMethod) -> params::pulls::MergeMethod {
    match method {
        types::MergeMethod::Merge => params::pulls::MergeMethod::Merge,
        types::MergeMethod::Squash => params::pulls::MergeMethod::Squash,
        types::MergeMethod::Rebase => params::pulls::MergeMethod::Rebase,
    }
}
