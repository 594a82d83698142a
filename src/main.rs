mod ai;
mod cli;
mod clock;
mod config;
mod error;
mod git;
mod orchestrator;
mod report;

use ai::{credential_from_env, ClaudeAgent, MessagesClient};
use clap::Parser;
use cli::{Cli, Commands};
use clock::SystemClock;
use config::{Config, Mode};
use error::{ReportError, Result};
use git::runner::CommandRunner;
use git::MetadataCollector;
use orchestrator::Orchestrator;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(&cli);

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle subcommands
    if let Some(command) = &cli.command {
        return handle_command(command, &cli);
    }

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        if let ReportError::MissingCredential { var } = &e {
            eprintln!("\nAPI mode needs an Anthropic API key. Either:");
            eprintln!("  1. Set the {} environment variable", var);
            eprintln!("  2. Use --mode agent to authenticate through the claude CLI");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("daily_report={}", cli.log_level())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let config = apply_cli_overrides(config, cli);
    config.validate()?;

    let repo_dir = match &cli.repo {
        Some(path) => path.clone(),
        None => env::current_dir()?,
    };
    let mode = config.default_mode;

    tracing::debug!(?mode, repo = %repo_dir.display(), "generating daily report");
    println!("Generating daily report...");

    let orchestrator = Orchestrator::new(config, repo_dir.clone(), Arc::new(SystemClock));
    let config = orchestrator.config();

    let outcome = match mode {
        Mode::Agent => {
            let agent = ClaudeAgent::new(config.claude_binary.clone(), config.api_key_env.clone());
            orchestrator.run_agent_mode(&agent).await?
        }
        Mode::Api => {
            let runner = CommandRunner::new(repo_dir, config.command_timeout());
            let collector =
                MetadataCollector::new(Arc::new(runner), config.window_hours, config.issue_limit);
            let credential = credential_from_env(&config.api_key_env);

            orchestrator
                .run_api_mode(credential, &collector, |api_key| {
                    Ok(MessagesClient::new(api_key, config.request_timeout())?
                        .with_model(config.model.clone())
                        .with_max_tokens(config.max_tokens))
                })
                .await?
        }
    };

    tracing::info!(path = %outcome.path.display(), source = ?outcome.source, "daily report ready");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        Config::load_from(config_path)
    } else {
        Config::load_or_default()
    }
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Config::default_config_path(),
    }
}

fn handle_command(command: &Commands, cli: &Cli) -> Result<()> {
    match command {
        Commands::Init { force } => {
            let config_path = config_path(cli)?;

            if config_path.exists() && !force {
                eprintln!(
                    "Config file already exists at: {}",
                    config_path.display()
                );
                eprintln!("Use --force to overwrite");
                std::process::exit(1);
            }

            let config = Config::create_default_at(&config_path)?;
            println!("✓ Created config file at: {}", config_path.display());
            println!("\nAPI mode reads the key from the {} environment variable.", config.api_key_env);
            println!("Agent mode uses it too when set, otherwise the claude CLI login.");
        }
        Commands::Config => {
            let config = apply_cli_overrides(load_config(cli)?, cli);
            let toml_str = toml::to_string_pretty(&config)?;
            println!("Current configuration:\n");
            println!("{}", toml_str);
        }
    }
    Ok(())
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(mode) = cli.mode {
        config.default_mode = mode;
    }

    if let Some(ref dir) = cli.output_dir {
        config.reports_dir = dir.clone();
    }

    if let Some(hours) = cli.hours {
        config.window_hours = hours;
    }

    config
}
