//! CLI configuration.

use std::path::{Path, PathBuf};

use kc_forge::GeneratorConfig;
use serde::{Deserialize, Serialize};

use crate::{CliError, CliResult};

/// Directory generated files are written to when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "./terragrunt";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory generated files are written to.
    pub output_dir: Option<PathBuf>,

    /// Delegated conversion backend (e.g. http://localhost:8081).
    pub backend_url: Option<String>,

    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl CliConfig {
    /// Loads configuration from the default location.
    pub fn load() -> CliResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from a file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Saves configuration to the default location.
    pub fn save(&self) -> CliResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves configuration to a file.
    pub fn save_to(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Gets the configuration file path.
    pub fn config_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".keycloak").join("forge.toml"))
    }

    /// Gets the effective output directory (from args or config).
    pub fn effective_output_dir(&self, arg: Option<&Path>) -> PathBuf {
        arg.map(Path::to_path_buf)
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// Gets the effective backend URL (from args or config).
    pub fn effective_backend(&self, arg: Option<&str>) -> Option<String> {
        arg.map(str::to_string)
            .or_else(|| self.backend_url.clone())
            .filter(|url| !url.is_empty())
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
    /// Quiet (minimal output).
    Quiet,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            "quiet" => Ok(Self::Quiet),
            _ => Err(CliError::InvalidArgument(format!(
                "Unknown output format: {s}. Supported: table, json, yaml, quiet"
            ))),
        }
    }
}
