use rand::Rng;

use crate::config::CreateInputs;
use crate::error::Result;
use crate::platform::types::CreatePullRequest;
use crate::platform::Platform;
use crate::workflow::types::{CreateOutcome, CreateStage};
use crate::workspace::Workspace;

pub const BRANCH_PREFIX: &str = "bot";
pub const SUFFIX_LEN: usize = 6;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random `[a-z0-9]` string of length `len`.
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

pub fn branch_name(base_name: &str, suffix: &str) -> String {
    format!("{BRANCH_PREFIX}/{base_name}-{suffix}")
}

/// Branch, stage, commit, push and open a pull request.
///
/// Nothing is rolled back on failure: the branch stays in place locally,
/// and remotely once pushed.
pub async fn create_pull_request(
    platform: &dyn Platform,
    workspace: &Workspace,
    inputs: &CreateInputs,
) -> Result<CreateOutcome> {
    let mut stage = CreateStage::Init;
    let result = run(platform, workspace, inputs, &mut stage).await;

    if let Err(e) = &result {
        tracing::error!(stage = %stage, error = %e, "Create flow failed");
    }

    result
}

async fn run(
    platform: &dyn Platform,
    workspace: &Workspace,
    inputs: &CreateInputs,
    stage: &mut CreateStage,
) -> Result<CreateOutcome> {
    let suffix = random_suffix(SUFFIX_LEN);
    let repo_full_name = workspace.repo_full_name().await?;
    let branch = branch_name(&inputs.branch_name, &suffix);

    workspace.start_branch(&branch).await?;
    *stage = CreateStage::Branched;
    tracing::info!(repo = %repo_full_name, branch = %branch, "Created branch");

    let has_changes = workspace.stage_changes().await?;
    *stage = CreateStage::Staged;

    if !has_changes {
        *stage = CreateStage::NoChanges;
        tracing::info!(branch = %branch, "No changes to commit");
        return Ok(CreateOutcome::NoChanges { branch });
    }

    let commit = workspace
        .commit(&inputs.commit_message, &inputs.author, &inputs.committer)
        .await?;
    *stage = CreateStage::Committed;
    tracing::info!(branch = %branch, commit = %commit, "Committed changes");

    workspace.push(&branch, &inputs.token).await?;
    *stage = CreateStage::Pushed;
    tracing::info!(branch = %branch, remote = %workspace.remote, "Pushed branch");

    let pull_request = platform
        .create_pull_request(
            &repo_full_name,
            &CreatePullRequest {
                title: inputs.commit_message.clone(),
                body: inputs.body.clone(),
                head_branch: branch.clone(),
                base_branch: inputs.base_branch.clone(),
            },
        )
        .await?;
    *stage = CreateStage::PrCreated;
    tracing::info!(
        repo = %repo_full_name,
        pr = pull_request.number,
        url = %pull_request.html_url,
        "Pull request created"
    );

    Ok(CreateOutcome::PullRequestCreated {
        branch,
        commit,
        pull_request,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Identity;
    use crate::error::AppError;
    use crate::platform::recording::{Call, RecordingPlatform};
    use crate::workspace::git::test_support::{init_bare, init_repo};
    use git2::Repository;
    use regex::Regex;

    fn inputs() -> CreateInputs {
        CreateInputs {
            token: "t".to_string(),
            remote: "origin".to_string(),
            repository: None,
            author: Identity {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            },
            committer: Identity {
                name: "Release Bot".to_string(),
                email: "bot@example.com".to_string(),
            },
            branch_name: "patch".to_string(),
            base_branch: "main".to_string(),
            commit_message: "chore: automated by github actions".to_string(),
            body: None,
        }
    }

    struct Fixture {
        work: tempfile::TempDir,
        bare_dir: tempfile::TempDir,
        workspace: Workspace,
    }

    /// A checkout whose `origin` is a local bare repository. `repository`
    /// names the GitHub repo, since a filesystem URL carries none.
    fn fixture(repository: Option<&str>) -> Fixture {
        let work = tempfile::tempdir().unwrap();
        let bare_dir = tempfile::tempdir().unwrap();
        let (_, bare_url) = init_bare(bare_dir.path());
        init_repo(work.path(), &bare_url);
        let workspace = Workspace::new(work.path(), "origin")
            .with_repository(repository.map(str::to_string));
        Fixture {
            work,
            bare_dir,
            workspace,
        }
    }

    fn branch_pattern() -> Regex {
        Regex::new(r"^bot/patch-[a-z0-9]{6}$").unwrap()
    }

    #[test]
    fn test_random_suffix_shape() {
        let suffix = random_suffix(SUFFIX_LEN);
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert!(branch_pattern().is_match(&branch_name("patch", &suffix)));
    }

    #[tokio::test]
    async fn test_no_changes_skips_commit_push_and_api() {
        let fx = fixture(Some("octo/widgets"));
        let platform = RecordingPlatform::new();
        let before = Repository::open(fx.work.path())
            .unwrap()
            .head()
            .unwrap()
            .peel_to_commit()
            .unwrap()
            .id();

        let outcome = create_pull_request(&platform, &fx.workspace, &inputs())
            .await
            .unwrap();

        let branch = match outcome {
            CreateOutcome::NoChanges { branch } => branch,
            other => panic!("expected NoChanges, got {other:?}"),
        };
        assert!(branch_pattern().is_match(&branch));
        assert!(platform.calls().is_empty());

        let repo = Repository::open(fx.work.path()).unwrap();
        assert_eq!(repo.head().unwrap().peel_to_commit().unwrap().id(), before);

        let bare = Repository::open_bare(fx.bare_dir.path()).unwrap();
        assert!(bare.find_reference(&format!("refs/heads/{branch}")).is_err());
    }

    #[tokio::test]
    async fn test_changes_are_committed_pushed_and_proposed() {
        let fx = fixture(Some("octo/widgets"));
        std::fs::write(fx.work.path().join("CHANGELOG.md"), "## 1.0.1\n").unwrap();
        std::fs::write(fx.work.path().join("README.md"), "hello again\n").unwrap();
        let platform = RecordingPlatform::new();
        let mut inputs = inputs();
        inputs.body = Some("Generated changes".to_string());

        let outcome = create_pull_request(&platform, &fx.workspace, &inputs)
            .await
            .unwrap();

        let (branch, commit, pull_request) = match outcome {
            CreateOutcome::PullRequestCreated {
                branch,
                commit,
                pull_request,
            } => (branch, commit, pull_request),
            other => panic!("expected PullRequestCreated, got {other:?}"),
        };
        assert!(branch_pattern().is_match(&branch));
        assert_eq!(pull_request.number, 101);
        assert!(Regex::new(r"^https://github\.com/octo/widgets/pull/\d+$")
            .unwrap()
            .is_match(&pull_request.html_url));

        // Exactly one new commit with the configured identities
        let bare = Repository::open_bare(fx.bare_dir.path()).unwrap();
        let pushed = bare
            .find_reference(&format!("refs/heads/{branch}"))
            .unwrap()
            .peel_to_commit()
            .unwrap();
        assert_eq!(pushed.id().to_string(), commit);
        assert_eq!(pushed.message(), Some("chore: automated by github actions"));
        assert_eq!(pushed.author().name(), Some("Alice"));
        assert_eq!(pushed.author().email(), Some("alice@example.com"));
        assert_eq!(pushed.committer().name(), Some("Release Bot"));
        assert_eq!(pushed.parent_count(), 1);
        assert_eq!(pushed.parent(0).unwrap().message(), Some("initial"));

        assert_eq!(
            platform.calls(),
            vec![Call::CreatePullRequest {
                repo: "octo/widgets".to_string(),
                pr: CreatePullRequest {
                    title: "chore: automated by github actions".to_string(),
                    body: Some("Generated changes".to_string()),
                    head_branch: branch.clone(),
                    base_branch: "main".to_string(),
                },
            }]
        );
    }

    #[tokio::test]
    async fn test_pr_failure_leaves_branch_in_place() {
        let fx = fixture(Some("octo/widgets"));
        std::fs::write(fx.work.path().join("new.txt"), "content").unwrap();
        let platform = RecordingPlatform::failing_create();

        let err = create_pull_request(&platform, &fx.workspace, &inputs())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GitHubApi(_)));

        let repo = Repository::open(fx.work.path()).unwrap();
        let head = repo.head().unwrap();
        let branch = head.shorthand().unwrap().to_string();
        assert!(branch_pattern().is_match(&branch));

        let bare = Repository::open_bare(fx.bare_dir.path()).unwrap();
        assert!(bare.find_reference(&format!("refs/heads/{branch}")).is_ok());
    }

    #[tokio::test]
    async fn test_unresolvable_remote_fails_before_branching() {
        let fx = fixture(None);
        std::fs::write(fx.work.path().join("new.txt"), "content").unwrap();
        let platform = RecordingPlatform::new();

        let err = create_pull_request(&platform, &fx.workspace, &inputs())
            .await
            .unwrap_err();
        assert!(err.is_config());
        assert!(platform.calls().is_empty());

        let repo = Repository::open(fx.work.path()).unwrap();
        let branches = repo
            .branches(Some(git2::BranchType::Local))
            .unwrap()
            .count();
        assert_eq!(branches, 1);
    }
}
