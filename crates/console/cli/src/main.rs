//! mission-console - replay and inspect the mission console core
//!
//! Subcommands:
//! - `replay <file>`: run a recorded frame stream through ingestion,
//!   normalization and trust-gated triage
//! - `profiles`, `routes`, `panels`: list the built-in catalogs
//! - `classify <message>`: show how a connectivity error is classified
//! - `config show`: print the effective configuration

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console_cli::commands;
use console_cli::{AppConfig, LoggingConfig};
use console_engine::PanelRegistry;
use console_types::{ProfileCatalog, RouteTemplate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Mission console CLI
#[derive(Parser)]
#[command(name = "mission-console")]
#[command(about = "Mission console core - replay signal streams and inspect catalogs", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONSOLE_CONFIG")]
    config: Option<String>,

    /// Log level; overrides the configured level
    #[arg(long, env = "CONSOLE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "CONSOLE_LOG_JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded frame file (one frame per line)
    Replay {
        file: PathBuf,

        /// Trust threshold for this run
        #[arg(long)]
        threshold: Option<f64>,

        /// Print the final console snapshot as JSON
        #[arg(long)]
        snapshot: bool,
    },

    /// List team profiles
    Profiles,

    /// List route templates
    Routes,

    /// List ops panels in render order
    Panels,

    /// Classify a connectivity error message
    Classify { message: String },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.clone().into());

    if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Override with CLI args
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    init_tracing(&config.logging);

    match cli.command {
        Command::Replay {
            file,
            threshold,
            snapshot,
        } => {
            if let Some(threshold) = threshold {
                config.engine.trust_threshold = threshold;
            }
            let state = commands::replay(&config, &file).await?;
            if snapshot {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print!("{}", commands::render_replay_summary(&state));
            }
        }
        Command::Profiles => print!("{}", commands::render_profiles(&ProfileCatalog::builtin())),
        Command::Routes => print!("{}", commands::render_routes(&RouteTemplate::builtin())),
        Command::Panels => print!("{}", commands::render_panels(&PanelRegistry::builtin())),
        Command::Classify { message } => print!("{}", commands::render_classification(&message)),
        Command::Config {
            action: ConfigAction::Show,
        } => println!("{}", serde_json::to_string_pretty(&config)?),
    }

    Ok(())
}
