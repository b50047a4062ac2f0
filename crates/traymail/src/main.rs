//! traymail - command-line front end for the settings core.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use traymail_core::{
    CoreConfig, ParserType, ProfileValidationResult, SystemFileSystem, validate_profile_path,
};

#[derive(Parser, Debug)]
#[command(name = "traymail", version, about = "Tray unread-mail notifier settings")]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a Thunderbird profile directory.
    Validate {
        /// Profile path; `~`, `$VAR` and `%VAR%` are expanded.
        path: Option<String>,
        /// Parser to check the layout for (defaults to the configured one).
        #[arg(short, long)]
        parser: Option<ParserType>,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "traymail=info,traymail_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(CoreConfig::default_path);
    let config = CoreConfig::load(&config_path)
        .await
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    debug!("Loaded config from {}", config_path.display());

    match cli.command {
        Command::Validate { path, parser } => {
            if !validate(&config, path, parser)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Config => {
            info!("Effective configuration from {}", config_path.display());
            let value = json!({
                "path": config_path,
                "default_profile_path": config.default_profile_path,
                "default_parser": config.default_parser,
                "progress_step": config.progress_step(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print the validation of `path` and return whether it is usable.
fn validate(config: &CoreConfig, path: Option<String>, parser: Option<ParserType>) -> Result<bool> {
    let path = path.unwrap_or_else(|| config.default_profile_path.clone());
    let parser = parser.unwrap_or(config.default_parser);
    let result = validate_profile_path(&SystemFileSystem, &path, parser);
    print_validation(&result)?;
    Ok(result.is_valid())
}

fn print_validation(result: &ProfileValidationResult) -> Result<()> {
    let features = result.features();
    let value = json!({
        "path": result.path,
        "parser": result.parser,
        "expanded": result.expanded,
        "valid": result.is_valid(),
        "reason": result.reason.as_ref().map(ToString::to_string),
        "account_refresh": features.account_refresh,
        "repair": features.repair,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
