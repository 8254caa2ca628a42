//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

/// kc-forge - Converts Keycloak realm exports into Terraform/Terragrunt modules.
#[derive(Debug, Parser)]
#[command(name = "kc-forge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (overrides config).
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert realm exports into Terragrunt modules.
    Convert(ConvertArgs),

    /// Check whether files are realm exports and list the modules they would produce.
    Validate {
        /// Realm export files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Summarize the size and complexity of realm exports.
    Analyze {
        /// Realm export files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Convert arguments.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Realm export files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short = 'd', long = "out-dir", env = "KC_FORGE_OUTPUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Convert without writing any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Delegated conversion backend URL (overrides config).
    #[arg(long, env = "KC_FORGE_BACKEND_URL")]
    pub backend: Option<String>,

    /// Use the local generator even when a backend is configured.
    #[arg(long)]
    pub local: bool,
}

/// Config commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Initialize configuration interactively.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_convert() {
        let cli = Cli::try_parse_from([
            "kc-forge", "-o", "json", "convert", "a.json", "b.json", "-d", "out", "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.files.len(), 2);
        assert_eq!(args.out_dir, Some(PathBuf::from("out")));
        assert!(args.dry_run);
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["kc-forge", "validate"]).is_err());
    }
}
