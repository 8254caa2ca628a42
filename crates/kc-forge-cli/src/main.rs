//! # kc-forge
//!
//! Converts Keycloak realm exports into Terraform/Terragrunt modules.

#![forbid(unsafe_code)]

use clap::Parser;
use kc_forge_cli::{
    cli::{Cli, Command},
    commands::{run_analyze, run_config, run_convert, run_validate},
    config::CliConfig,
    output::error,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config_path = match CliConfig::config_path() {
        Ok(p) => p,
        Err(e) => {
            error(&e.to_string());
            std::process::exit(1);
        }
    };
    let mut config = match CliConfig::load_from(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };
    let format = cli.output.unwrap_or(config.output_format);

    // Execute command
    let result = match cli.command {
        Command::Convert(args) => run_convert(args, &config, format).await,
        Command::Validate { files } => run_validate(&files, format),
        Command::Analyze { files } => run_analyze(&files, format),
        Command::Config(cmd) => run_config(cmd, &mut config, &config_path),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
}
