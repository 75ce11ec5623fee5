use std::path::Path;

use git2::{
    Cred, CredentialType, IndexAddOption, PushOptions, Remote, RemoteCallbacks, Repository,
    Signature,
};

use crate::config::Identity;
use crate::error::{AppError, Result};
use crate::workspace::remote::https_push_url;

/// Validate a branch name to prevent argument injection.
/// Names starting with `-` are rejected.
fn validate_branch_name(name: &str) -> Result<()> {
    if name.starts_with('-') {
        return Err(AppError::Git(format!(
            "Invalid branch name (starts with '-'): {name}"
        )));
    }
    Ok(())
}

/// Build `PushOptions` that authenticate via credential callback.
/// The token is captured by the closure and never written to disk.
///
/// A ref the remote refuses (protected branch, ruleset, name clash) fails
/// the push; libgit2 only reports those through `push_update_reference`.
fn make_push_options(token: &str) -> PushOptions<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, _username_from_url, allowed_types| {
        if !allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return Err(git2::Error::from_str(&format!(
                "Remote {url} does not accept token authentication (allowed: {allowed_types:?})"
            )));
        }
        Cred::userpass_plaintext("x-access-token", token)
    });
    callbacks.push_update_reference(|refname, status| match status {
        Some(msg) => Err(git2::Error::from_str(&format!(
            "Remote rejected {refname}: {msg}"
        ))),
        None => Ok(()),
    });
    let mut opts = PushOptions::new();
    opts.remote_callbacks(callbacks);
    opts
}

/// Read the fetch URL configured for a remote.
pub async fn remote_url(dir: &Path, remote_name: &str) -> Result<String> {
    let dir = dir.to_path_buf();
    let remote_name = remote_name.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::open(&dir)?;
        let remote = repo.find_remote(&remote_name)?;
        remote
            .url()
            .map(str::to_string)
            .ok_or_else(|| AppError::Git(format!("Remote '{remote_name}' has no valid URL")))
    })
    .await
    .map_err(|e| AppError::Git(format!("Remote-url task panicked: {e}")))?
}

/// Create a branch at HEAD and switch to it.
///
/// The new branch points at the current commit, so the working tree and
/// index (including uncommitted changes) are left untouched.
pub async fn create_branch(dir: &Path, branch_name: &str) -> Result<()> {
    validate_branch_name(branch_name)?;

    let dir = dir.to_path_buf();
    let branch_name = branch_name.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::open(&dir)?;
        let head = repo.head()?;
        let commit = head.peel_to_commit()?;
        repo.branch(&branch_name, &commit, false)?;
        repo.set_head(&format!("refs/heads/{branch_name}"))?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Create-branch task panicked: {e}")))?
}

/// Stage all modified, untracked and deleted files.
///
/// Returns whether the index now differs from HEAD.
pub async fn stage_all(dir: &Path) -> Result<bool> {
    let dir = dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::open(&dir)?;
        let mut index = repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let head_tree = repo.head()?.peel_to_tree()?;
        let diff = repo.diff_tree_to_index(Some(&head_tree), Some(&index), None)?;
        Ok(diff.deltas().count() > 0)
    })
    .await
    .map_err(|e| AppError::Git(format!("Stage-all task panicked: {e}")))?
}

/// Commit the index on top of HEAD. Returns the new commit id.
pub async fn commit(
    dir: &Path,
    message: &str,
    author: &Identity,
    committer: &Identity,
) -> Result<String> {
    let dir = dir.to_path_buf();
    let message = message.to_string();
    let author = author.clone();
    let committer = committer.clone();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::open(&dir)?;
        let author_sig = Signature::now(&author.name, &author.email)?;
        let committer_sig = Signature::now(&committer.name, &committer.email)?;
        let mut index = repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = repo.find_tree(tree_oid)?;
        let head = repo.head()?;
        let parent = head.peel_to_commit()?;
        let oid = repo.commit(
            Some("HEAD"),
            &author_sig,
            &committer_sig,
            &message,
            &tree,
            &[&parent],
        )?;
        Ok(oid.to_string())
    })
    .await
    .map_err(|e| AppError::Git(format!("Commit task panicked: {e}")))?
}

/// The remote to push through. GitHub SSH remotes are swapped for an
/// anonymous HTTPS remote on the same repository.
fn push_remote<'r>(repo: &'r Repository, remote_name: &str) -> Result<Remote<'r>> {
    let configured = repo.find_remote(remote_name)?;
    let https_url = configured.url().and_then(https_push_url);

    match https_url {
        Some(url) => {
            tracing::debug!(remote = remote_name, url = %url, "Pushing over HTTPS instead of SSH");
            Ok(repo.remote_anonymous(&url)?)
        }
        None => Ok(configured),
    }
}

/// Push a local branch to the same name on the remote.
pub async fn push(dir: &Path, remote_name: &str, branch_name: &str, token: &str) -> Result<()> {
    validate_branch_name(branch_name)?;

    let dir = dir.to_path_buf();
    let remote_name = remote_name.to_string();
    let branch_name = branch_name.to_string();
    let token = token.to_string();

    tokio::task::spawn_blocking(move || {
        let repo = Repository::open(&dir)?;
        let mut remote = push_remote(&repo, &remote_name)?;
        let refspec = format!("refs/heads/{branch_name}:refs/heads/{branch_name}");
        let mut push_opts = make_push_options(&token);
        remote.push(&[&refspec], Some(&mut push_opts))?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Git(format!("Push task panicked: {e}")))?
}
