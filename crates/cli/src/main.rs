//! Onboard CLI - drive an onboarding progression from the terminal.

mod action;
mod render;

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use onboard_progress::{ProgressTracker, SharedProgress, TrackerConfig};
use onboard_storage::{BuiltinTreeSource, JsonTreeSource, TreeSource};
use action::{parse_actions, Action};

#[derive(Parser)]
#[command(name = "onboard")]
#[command(about = "Onboarding progress tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tree definition file (built-in onboarding catalog when omitted)
    #[arg(long, global = true)]
    tree: Option<PathBuf>,

    /// Log filter; RUST_LOG takes precedence when set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Max journal entries kept while replaying
    #[arg(long, global = true, default_value_t = TrackerConfig::default().journal_limit)]
    journal_limit: usize,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay actions, then show progress
    Status {
        /// Actions: toggle:SECTION:TASK:STEP or advance
        actions: Vec<String>,
    },
    /// Replay actions, printing every transition
    Play {
        /// Actions: toggle:SECTION:TASK:STEP or advance
        actions: Vec<String>,
    },
    /// Replay actions, then explain what is still locked
    Blockers {
        /// Actions: toggle:SECTION:TASK:STEP or advance
        actions: Vec<String>,
    },
    /// Print the tree definition as JSON
    Export,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Stdout carries command output only.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn source(path: Option<PathBuf>) -> Box<dyn TreeSource> {
    match path {
        Some(path) => Box::new(JsonTreeSource::new(path)),
        None => Box::new(BuiltinTreeSource::new()),
    }
}

/// Apply actions in order. Rejected actions are reported and skipped.
async fn replay(tracker: &SharedProgress, actions: &[Action], verbose: bool) {
    for action in actions {
        match *action {
            Action::Toggle { section, task, step } => {
                match tracker.toggle_step(section, task, step).await {
                    Ok(outcome) => {
                        if verbose {
                            for event in &outcome.events {
                                println!("{}: {}", action, event);
                            }
                        }
                    }
                    Err(err) => {
                        warn!("Skipping {}: {}", action, err);
                        if verbose {
                            println!("{}: rejected ({})", action, err);
                        }
                    }
                }
            }
            Action::Advance => match tracker.advance_section().await {
                Some(to) => {
                    if verbose {
                        println!("{}: now viewing section {}", action, to);
                    }
                }
                None => {
                    warn!("Skipping {}: current section not finished or next one locked", action);
                    if verbose {
                        println!("{}: rejected (cannot advance yet)", action);
                    }
                }
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let source = source(cli.tree);
    let tree = source
        .load_tree()
        .await
        .with_context(|| format!("failed to load tree from {}", source.origin()))?;
    info!("Loaded onboarding tree from {}", source.origin());

    let config = TrackerConfig {
        journal_limit: cli.journal_limit,
    };

    match cli.command {
        Commands::Export => {
            println!("{}", serde_json::to_string_pretty(&tree.to_definition())?);
        }
        Commands::Status { actions } => {
            let actions = parse_actions(&actions)?;
            let tracker = SharedProgress::with_config(tree, config);
            replay(&tracker, &actions, false).await;

            let snapshot = tracker.snapshot().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", render::status(&tracker.tree().await, &snapshot));
            }
        }
        Commands::Play { actions } => {
            let actions = parse_actions(&actions)?;
            let tracker = SharedProgress::with_config(tree, config);
            replay(&tracker, &actions, !cli.json).await;

            let snapshot = tracker.snapshot().await;
            if cli.json {
                let output = serde_json::json!({
                    "journal": tracker.journal().await,
                    "snapshot": snapshot,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!();
                print!("{}", render::status(&tracker.tree().await, &snapshot));
            }
        }
        Commands::Blockers { actions } => {
            let actions = parse_actions(&actions)?;
            let tracker = SharedProgress::with_config(tree, config);
            replay(&tracker, &actions, false).await;

            let report = tracker.blockers().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::blockers(&report));
            }
        }
    }

    Ok(())
}
