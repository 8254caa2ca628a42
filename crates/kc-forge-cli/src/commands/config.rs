//! Configuration management commands.

use std::path::{Path, PathBuf};

use crate::cli::ConfigCommand;
use crate::output::{info, success};
use crate::{CliConfig, CliError, CliResult};

/// Runs a config command against the file at `path`.
pub fn run_config(cmd: ConfigCommand, config: &mut CliConfig, path: &Path) -> CliResult<()> {
    match cmd {
        ConfigCommand::Show => {
            show_config(config, path);
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            set_value(config, &key, &value)?;
            config.save_to(path)?;
            success(&format!("Set {key} = {value}"));
            Ok(())
        }
        ConfigCommand::Init => init_config(config, path),
    }
}

/// Shows the current configuration.
fn show_config(config: &CliConfig, path: &Path) {
    info(&format!("Configuration file: {}", path.display()));
    println!();
    match &config.output_dir {
        Some(dir) => println!("output_dir: {}", dir.display()),
        None => println!("output_dir: {} (default)", crate::config::DEFAULT_OUTPUT_DIR),
    }
    if let Some(url) = &config.backend_url {
        println!("backend_url: {url}");
    }
    println!("output_format: {:?}", config.output_format);
    println!("provider_source: {}", config.generator.provider_source);
    println!("provider_version: {}", config.generator.provider_version);
    println!("keycloak_url: {}", config.generator.keycloak_url);
    println!("admin_client_id: {}", config.generator.admin_client_id);
    if let Some(base) = &config.generator.module_source_base {
        println!("module_source_base: {base}");
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Sets a configuration value.
pub fn set_value(config: &mut CliConfig, key: &str, value: &str) -> CliResult<()> {
    match key {
        "output_dir" | "dir" => config.output_dir = optional(value).map(PathBuf::from),
        "backend_url" | "backend" => config.backend_url = optional(value),
        "output_format" | "output" => config.output_format = value.parse()?,
        "provider_source" => config.generator.provider_source = value.to_string(),
        "provider_version" => config.generator.provider_version = value.to_string(),
        "keycloak_url" => config.generator.keycloak_url = value.to_string(),
        "admin_client_id" => config.generator.admin_client_id = value.to_string(),
        "module_source_base" => config.generator.module_source_base = optional(value),
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "Unknown configuration key: {key}. Known keys: output_dir, backend_url, output_format, \
                 provider_source, provider_version, keycloak_url, admin_client_id, module_source_base"
            )));
        }
    }
    Ok(())
}

fn prompt(label: &str, current: &str) -> CliResult<Option<String>> {
    print!("{label} [{current}]: ");
    std::io::Write::flush(&mut std::io::stdout())?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Initializes configuration interactively.
fn init_config(config: &mut CliConfig, path: &Path) -> CliResult<()> {
    info("Initializing kc-forge configuration...");
    println!();

    let current_dir = config
        .output_dir
        .as_ref()
        .map_or_else(|| crate::config::DEFAULT_OUTPUT_DIR.to_string(), |d| d.display().to_string());
    if let Some(dir) = prompt("Output directory", &current_dir)? {
        set_value(config, "output_dir", &dir)?;
    }

    let current_backend = config.backend_url.as_deref().unwrap_or("(none)");
    if let Some(url) = prompt("Backend URL", current_backend)? {
        if url != "(none)" {
            set_value(config, "backend_url", &url)?;
        }
    }

    if let Some(format) = prompt("Output format (table/json/yaml/quiet)", &format!("{:?}", config.output_format))? {
        config.output_format = format.parse().unwrap_or(config.output_format);
    }

    if let Some(version) = prompt("Provider version", &config.generator.provider_version)? {
        config.generator.provider_version = version;
    }

    config.save_to(path)?;

    println!();
    success(&format!("Configuration saved to: {}", path.display()));
    Ok(())
}
