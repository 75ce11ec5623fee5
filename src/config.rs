use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::platform::types::MergeMethod;
use crate::workspace::remote::is_repo_path;

pub const DEFAULT_IDENTITY: &str = "GitHub Actions <github-actions[bot]@users.noreply.github.com>";
pub const DEFAULT_BRANCH_NAME: &str = "patch";
pub const DEFAULT_BASE_BRANCH: &str = "main";
pub const DEFAULT_COMMIT_MESSAGE: &str = "chore: automated by github actions";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_AUTO_MERGE_LABEL: &str = "auto-merge";
pub const SETTINGS_FILE_STEM: &str = "pr-actions";

/// Snapshot of the process environment, captured once at startup.
#[derive(Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

// Manual Debug impl to avoid leaking INPUT_TOKEN
impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("vars", &format_args!("[{} entries]", self.vars.len()))
            .finish()
    }
}

impl Env {
    /// Capture the current process environment. Non-UTF-8 entries are skipped.
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Env {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read a boolean from the environment snapshot.
///
/// Unset returns `default`. Otherwise only `true` (any case) and `1` are true.
pub fn parse_env_bool(env: &Env, name: &str, default: bool) -> bool {
    parse_bool_value(env.get(name), default)
}

fn parse_bool_value(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => v.eq_ignore_ascii_case("true") || v == "1",
    }
}

/// A git author or committer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl FromStr for Identity {
    type Err = AppError;

    /// Parse the `Name <email>` form.
    fn from_str(s: &str) -> Result<Self> {
        let re = Regex::new(r"^\s*([^<>]*?)\s*<([^<>\s]+)>\s*$")
            .map_err(|e| AppError::Config(format!("Invalid identity pattern: {e}")))?;

        let caps = re.captures(s).ok_or_else(|| {
            AppError::Config(format!("Invalid identity (expected 'Name <email>'): {s}"))
        })?;

        let name = caps[1].to_string();
        if name.is_empty() {
            return Err(AppError::Config(format!("Identity has no name: {s}")));
        }

        Ok(Self {
            name,
            email: caps[2].to_string(),
        })
    }
}

/// What to do with an approved pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Approve only.
    None,
    /// Label the PR and enable GitHub auto-merge through GraphQL.
    AutoMerge,
    /// Merge right away through the REST merge endpoint.
    Immediate,
}

/// Raw action inputs: an optional settings file overlaid by `INPUT_*` variables.
///
/// Everything stays a string here; the per-flow conversions validate and type them.
#[derive(Deserialize, Clone, Default)]
pub struct ActionInputs {
    pub token: Option<String>,
    pub remote: Option<String>,
    pub repository: Option<String>,
    pub pull_request_number: Option<String>,
    pub auto_merge: Option<String>,
    pub merge: Option<String>,
    pub merge_method: Option<String>,
    pub auto_merge_label: Option<String>,
    pub author: Option<String>,
    pub committer: Option<String>,
    pub branch_name: Option<String>,
    pub base_branch: Option<String>,
    pub commit_message: Option<String>,
    pub body: Option<String>,
}

// Manual Debug impl to avoid leaking the token
impl std::fmt::Debug for ActionInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionInputs")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("remote", &self.remote)
            .field("repository", &self.repository)
            .field("pull_request_number", &self.pull_request_number)
            .field("auto_merge", &self.auto_merge)
            .field("merge", &self.merge)
            .field("merge_method", &self.merge_method)
            .field("auto_merge_label", &self.auto_merge_label)
            .field("author", &self.author)
            .field("committer", &self.committer)
            .field("branch_name", &self.branch_name)
            .field("base_branch", &self.base_branch)
            .field("commit_message", &self.commit_message)
            .field("body", &self.body)
            .finish()
    }
}

/// Validated inputs for the approve flow.
#[derive(Clone)]
pub struct ApproveInputs {
    pub token: String,
    pub remote: String,
    /// `owner/repo` to use instead of the one in the remote URL.
    pub repository: Option<String>,
    pub pull_request_number: u64,
    pub strategy: MergeStrategy,
    pub merge_method: MergeMethod,
    pub auto_merge_label: String,
}

impl std::fmt::Debug for ApproveInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApproveInputs")
            .field("token", &"[REDACTED]")
            .field("remote", &self.remote)
            .field("repository", &self.repository)
            .field("pull_request_number", &self.pull_request_number)
            .field("strategy", &self.strategy)
            .field("merge_method", &self.merge_method)
            .field("auto_merge_label", &self.auto_merge_label)
            .finish()
    }
}

/// Validated inputs for the create flow.
#[derive(Clone)]
pub struct CreateInputs {
    pub token: String,
    pub remote: String,
    pub repository: Option<String>,
    pub author: Identity,
    pub committer: Identity,
    pub branch_name: String,
    pub base_branch: String,
    pub commit_message: String,
    pub body: Option<String>,
}

impl std::fmt::Debug for CreateInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateInputs")
            .field("token", &"[REDACTED]")
            .field("remote", &self.remote)
            .field("repository", &self.repository)
            .field("author", &self.author)
            .field("committer", &self.committer)
            .field("branch_name", &self.branch_name)
            .field("base_branch", &self.base_branch)
            .field("commit_message", &self.commit_message)
            .field("body", &self.body)
            .finish()
    }
}

/// Empty strings count as unset; CI runners pass unset inputs as `""`.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ActionInputs {
    /// Load inputs. Without an explicit `config_path`, an optional
    /// `pr-actions.{toml,yaml,json}` in `repo_dir` is read.
    pub fn load(env: &Env, config_path: Option<&str>, repo_dir: &Path) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            let default_path = repo_dir.join(SETTINGS_FILE_STEM);
            builder = builder.add_source(
                config::File::with_name(&default_path.to_string_lossy()).required(false),
            );
        }

        // INPUT_* variables from the snapshot, e.g. INPUT_BRANCH_NAME -> branch_name
        builder = builder.add_source(
            config::Environment::with_prefix("INPUT").source(Some(env.vars.clone())),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    fn token(&self) -> Result<String> {
        non_empty(&self.token)
            .map(str::to_string)
            .ok_or_else(|| AppError::Config("GitHub token not found".to_string()))
    }

    fn remote(&self) -> String {
        non_empty(&self.remote).unwrap_or(DEFAULT_REMOTE).to_string()
    }

    fn repository(&self) -> Result<Option<String>> {
        match non_empty(&self.repository).map(str::trim) {
            Some(repo) if is_repo_path(repo) => Ok(Some(repo.to_string())),
            Some(repo) => Err(AppError::Config(format!(
                "Invalid repository '{repo}', expected owner/repo"
            ))),
            None => Ok(None),
        }
    }

    fn flag(value: &Option<String>) -> bool {
        parse_bool_value(value.as_deref(), false)
    }

    pub fn approve(&self) -> Result<ApproveInputs> {
        let token = self.token()?;

        let number = non_empty(&self.pull_request_number)
            .ok_or_else(|| AppError::Config("Pull request number not found".to_string()))?;
        let pull_request_number = number.trim().parse::<u64>().map_err(|_| {
            AppError::Config(format!("Invalid pull request number: {number}"))
        })?;

        let strategy = match (Self::flag(&self.auto_merge), Self::flag(&self.merge)) {
            (true, true) => {
                return Err(AppError::Config(
                    "auto_merge and merge are mutually exclusive".to_string(),
                ))
            }
            (true, false) => MergeStrategy::AutoMerge,
            (false, true) => MergeStrategy::Immediate,
            (false, false) => MergeStrategy::None,
        };

        let merge_method = match non_empty(&self.merge_method) {
            Some(m) => m.parse::<MergeMethod>().map_err(AppError::Config)?,
            None => MergeMethod::Squash,
        };

        Ok(ApproveInputs {
            token,
            remote: self.remote(),
            repository: self.repository()?,
            pull_request_number,
            strategy,
            merge_method,
            auto_merge_label: non_empty(&self.auto_merge_label)
                .unwrap_or(DEFAULT_AUTO_MERGE_LABEL)
                .to_string(),
        })
    }

    pub fn create(&self) -> Result<CreateInputs> {
        let token = self.token()?;

        let author: Identity = non_empty(&self.author).unwrap_or(DEFAULT_IDENTITY).parse()?;
        let committer: Identity = non_empty(&self.committer)
            .unwrap_or(DEFAULT_IDENTITY)
            .parse()?;

        Ok(CreateInputs {
            token,
            remote: self.remote(),
            repository: self.repository()?,
            author,
            committer,
            branch_name: non_empty(&self.branch_name)
                .unwrap_or(DEFAULT_BRANCH_NAME)
                .to_string(),
            base_branch: non_empty(&self.base_branch)
                .unwrap_or(DEFAULT_BASE_BRANCH)
                .to_string(),
            commit_message: non_empty(&self.commit_message)
                .unwrap_or(DEFAULT_COMMIT_MESSAGE)
                .to_string(),
            body: non_empty(&self.body).map(str::to_string),
        })
    }
}
