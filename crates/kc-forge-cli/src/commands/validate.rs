//! Validate command implementation.

use std::path::PathBuf;

use kc_forge::batch::parse_document;
use kc_forge::plan;
use kc_forge::validate::realm_name;
use serde::Serialize;
use tabled::Tabled;

use crate::config::OutputFormat;
use crate::output::output;
use crate::{CliError, CliResult};

use super::{read_inputs, InputFile};

/// Validation result for one file.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ValidateRow {
    /// File name.
    #[tabled(rename = "File")]
    pub file: String,
    /// Whether the file is a realm export.
    #[tabled(rename = "Valid")]
    pub valid: bool,
    /// Realm name.
    #[tabled(rename = "Realm")]
    pub realm: String,
    /// Modules a conversion would emit.
    #[tabled(rename = "Modules")]
    pub modules: String,
    /// Failure reason.
    #[tabled(rename = "Error")]
    pub error: String,
}

/// Validates one input.
pub fn validate_input(input: &InputFile) -> ValidateRow {
    let parsed = input
        .text
        .as_ref()
        .map_err(Clone::clone)
        .and_then(|text| parse_document(&input.name, text));
    match parsed {
        Ok(doc) => ValidateRow {
            file: input.name.clone(),
            valid: true,
            realm: realm_name(&doc, &input.name),
            modules: plan(&doc).iter().map(|m| m.slug()).collect::<Vec<_>>().join(", "),
            error: String::new(),
        },
        Err(e) => ValidateRow {
            file: input.name.clone(),
            valid: false,
            realm: String::new(),
            modules: String::new(),
            error: e,
        },
    }
}

/// Runs the validate command.
pub fn run_validate(files: &[PathBuf], format: OutputFormat) -> CliResult<()> {
    let rows: Vec<ValidateRow> = read_inputs(files).iter().map(validate_input).collect();
    output(&rows, format)?;

    let failed = rows.iter().filter(|r| !r.valid).count();
    if failed > 0 {
        return Err(CliError::FilesFailed {
            failed,
            total: rows.len(),
        });
    }
    Ok(())
}
