use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pr_actions::config::{parse_env_bool, ActionInputs, Env};
use pr_actions::output::{write_outputs, ActionOutputs};
use pr_actions::platform::github::GitHubPlatform;
use pr_actions::workflow;
use pr_actions::workspace::Workspace;

const DEFAULT_OUTPUT_FILE: &str = "pr-actions.out";

#[derive(Parser)]
#[command(name = "pr-actions", about = "Approve, auto-merge and open pull requests from CI")]
struct Cli {
    /// Path to a settings file (default: pr-actions.* in --repo); INPUT_* variables override it
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Git working directory
    #[arg(long, default_value = ".", global = true)]
    repo: PathBuf,

    /// File receiving key=value outputs (defaults to $GITHUB_OUTPUT)
    #[arg(long, global = true)]
    output_file: Option<PathBuf>,

    /// Also print outputs as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Approve a pull request, optionally enabling auto-merge
    Approve,
    /// Commit working tree changes to a new branch and open a pull request
    Create,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = Env::capture();

    // Runner debug logging turns on our debug output too
    let default_level = if parse_env_bool(&env, "RUNNER_DEBUG", false) {
        "debug"
    } else {
        "info"
    };

    // Initialize tracing; stdout is reserved for --json
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let inputs = ActionInputs::load(&env, cli.config.as_deref(), &cli.repo)?;

    let outputs = match cli.command {
        Command::Approve => {
            let inputs = inputs.approve()?;
            tracing::debug!(?inputs, "Loaded approve inputs");

            let platform = GitHubPlatform::new(&inputs.token)?;
            let workspace = Workspace::new(cli.repo.clone(), inputs.remote.clone())
                .with_repository(inputs.repository.clone());
            let outcome = workflow::approve_pull_request(&platform, &workspace, &inputs).await?;
            ActionOutputs::from(&outcome)
        }
        Command::Create => {
            let inputs = inputs.create()?;
            tracing::debug!(?inputs, "Loaded create inputs");

            let platform = GitHubPlatform::new(&inputs.token)?;
            let workspace = Workspace::new(cli.repo.clone(), inputs.remote.clone())
                .with_repository(inputs.repository.clone());
            let outcome = workflow::create_pull_request(&platform, &workspace, &inputs).await?;
            ActionOutputs::from(&outcome)
        }
    };

    let output_path = cli
        .output_file
        .or_else(|| env.get("GITHUB_OUTPUT").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

    write_outputs(&output_path, &outputs).await?;
    tracing::info!(path = %output_path.display(), outputs = ?outputs.pairs(), "Wrote outputs");

    if cli.json {
        println!("{}", serde_json::to_string(&outputs)?);
    }

    Ok(())
}
