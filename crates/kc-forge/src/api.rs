//! Wire types of the delegated conversion backend.
//!
//! A remote service may run the generator on behalf of a client. The
//! request carries the raw realm document and a set of options; the
//! response carries the generated files or an error string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GeneratorConfig;
use crate::error::ForgeResult;
use crate::generator::{generate_with, Conversion, GenerateOptions, GeneratedFile};
use crate::plan::ModuleKind;

fn default_true() -> bool {
    true
}

fn default_output_format() -> String {
    "terragrunt".to_string()
}

/// Conversion options understood by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Emit the users module.
    #[serde(default = "default_true")]
    pub include_users: bool,
    /// Emit the groups module.
    #[serde(default = "default_true")]
    pub include_groups: bool,
    /// Emit the clients module.
    #[serde(default = "default_true")]
    pub include_clients: bool,
    /// Emit the roles module.
    #[serde(default = "default_true")]
    pub include_roles: bool,
    /// Emit Terragrunt wiring files.
    #[serde(default = "default_true")]
    pub generate_terragrunt: bool,
    /// Requested output format; only `terragrunt` is produced.
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// Ask the backend to validate its output.
    #[serde(default = "default_true")]
    pub validate_output: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            include_users: true,
            include_groups: true,
            include_clients: true,
            include_roles: true,
            generate_terragrunt: true,
            output_format: default_output_format(),
            validate_output: true,
        }
    }
}

impl ConversionOptions {
    /// Maps the wire options onto generator options.
    ///
    /// `outputFormat` and `validateOutput` have no effect on generation.
    #[must_use]
    pub fn generate_options(&self) -> GenerateOptions {
        let mut options = GenerateOptions::new().with_wiring(self.generate_terragrunt);
        for (included, kind) in [
            (self.include_users, ModuleKind::Users),
            (self.include_groups, ModuleKind::Groups),
            (self.include_clients, ModuleKind::Clients),
            (self.include_roles, ModuleKind::Roles),
        ] {
            if !included {
                options = options.exclude(kind);
            }
        }
        options
    }
}

/// Body of a conversion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Raw realm document.
    pub realm: Value,
    /// Options; every field defaults when absent.
    #[serde(default)]
    pub options: ConversionOptions,
}

impl ConversionRequest {
    /// Wraps a document with default options.
    #[must_use]
    pub fn new(realm: Value) -> Self {
        Self {
            realm,
            options: ConversionOptions::default(),
        }
    }
}

/// Body of a conversion response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResponse {
    /// Whether conversion succeeded.
    pub success: bool,
    /// Generated files on success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<GeneratedFile>,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResponse {
    /// Successful response.
    #[must_use]
    pub fn ok(files: Vec<GeneratedFile>) -> Self {
        Self {
            success: true,
            files,
            error: None,
        }
    }

    /// Failed response.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            files: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Converts into the generated files or the error string.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or a generic message if it sent none.
    pub fn into_files(self) -> Result<Vec<GeneratedFile>, String> {
        if self.success {
            Ok(self.files)
        } else {
            Err(self.error.unwrap_or_else(|| "conversion failed".to_string()))
        }
    }
}

impl From<ForgeResult<Conversion>> for ConversionResponse {
    fn from(result: ForgeResult<Conversion>) -> Self {
        match result {
            Ok(conversion) => Self::ok(conversion.files),
            Err(e) => Self::failed(format!("Conversion failed: {e}")),
        }
    }
}

/// Runs a request through the local generator.
#[must_use]
pub fn respond(request: &ConversionRequest, config: &GeneratorConfig) -> ConversionResponse {
    generate_with(
        &request.realm,
        "request.json",
        config,
        &request.options.generate_options(),
    )
    .into()
}
