use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cascade_bot::cascade::{render, run_cascade};
use cascade_bot::config::Config;
use cascade_bot::event::load_push_event;
use cascade_bot::github::RepoClient;
use cascade_bot::types::BaseBranchEvent;

#[derive(Parser)]
#[command(name = "cascade-bot", version, about = "Keeps auto-merge PRs level with their base branch")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one cascade for a base-branch event.
    Run {
        /// Base branch that moved. Bypasses event payload decoding.
        #[arg(long, conflicts_with = "event_json")]
        base: Option<String>,

        /// Path to the push event payload JSON. Defaults to
        /// $GITHUB_EVENT_PATH when set.
        #[arg(long)]
        event_json: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cascade_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { base, event_json } => run_command(base, event_json).await,
    }
}

async fn run_command(base: Option<String>, event_json: Option<PathBuf>) -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            return ExitCode::FAILURE;
        }
    };

    let branch = match resolve_trigger(base, event_json) {
        Ok(branch) => branch,
        Err(message) => {
            tracing::error!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    if !config.is_watched(&branch) {
        tracing::info!(branch = %branch, "branch is not watched; nothing to do");
        return ExitCode::SUCCESS;
    }

    let client = match RepoClient::from_token(config.token.clone(), config.repo.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build GitHub client");
            return ExitCode::FAILURE;
        }
    };

    match run_cascade(&client, &branch).await {
        Ok(summary) => {
            println!("{}", render(&summary));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "cascade run failed");
            ExitCode::FAILURE
        }
    }
}

/// Resolves the triggering branch from the CLI arguments.
///
/// `--base` wins when given; otherwise the push payload named by
/// `--event-json` (or `$GITHUB_EVENT_PATH`) is decoded.
fn resolve_trigger(base: Option<String>, event_json: Option<PathBuf>) -> Result<String, String> {
    if let Some(branch) = base {
        return Ok(branch);
    }

    let path = event_json
        .or_else(|| std::env::var_os("GITHUB_EVENT_PATH").map(PathBuf::from))
        .ok_or_else(|| {
            "no trigger given: pass --base, --event-json, or set GITHUB_EVENT_PATH".to_string()
        })?;

    let BaseBranchEvent { branch, tip } =
        load_push_event(&path).map_err(|e| e.to_string())?;
    tracing::info!(branch = %branch, tip = %tip, "decoded push event");
    Ok(branch)
}
