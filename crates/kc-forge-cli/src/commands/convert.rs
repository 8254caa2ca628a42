//! Convert command implementation.

use std::path::{Path, PathBuf};

use kc_forge::api::ConversionOptions;
use kc_forge::batch::{convert_batch, parse_document};
use kc_forge::validate::realm_name;
use kc_forge::{Diagnostic, GeneratedFile, GeneratorConfig};
use serde::Serialize;
use tabled::Tabled;

use crate::backend::BackendClient;
use crate::cli::ConvertArgs;
use crate::config::OutputFormat;
use crate::output::{error, info, output, output_single, success, warning};
use crate::writer::write_files;
use crate::{CliConfig, CliError, CliResult};

use super::{read_inputs, InputFile};

/// A converted document.
#[derive(Debug, Clone)]
pub struct Converted {
    /// Resolved realm name.
    pub realm: String,
    /// Generated files.
    pub files: Vec<GeneratedFile>,
    /// Generator diagnostics; empty for remote conversions.
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of one input file.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    /// File name.
    pub file: String,
    /// Conversion or error message.
    pub result: Result<Converted, String>,
}

/// Per-file summary row.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ConvertRow {
    /// File name.
    #[tabled(rename = "File")]
    pub file: String,
    /// Realm name.
    #[tabled(rename = "Realm")]
    pub realm: String,
    /// Number of generated files.
    #[tabled(rename = "Files")]
    pub files: usize,
    /// Number of diagnostics.
    #[tabled(rename = "Diagnostics")]
    pub diagnostics: usize,
    /// Status.
    #[tabled(rename = "Status")]
    pub status: String,
}

/// Per-file report for structured output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertReport {
    /// File name.
    pub file: String,
    /// Whether the file converted and was written.
    pub success: bool,
    /// Realm name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    /// Relative paths of the generated files.
    pub files: Vec<String>,
    /// Generator diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the convert command.
pub async fn run_convert(args: ConvertArgs, config: &CliConfig, format: OutputFormat) -> CliResult<()> {
    let inputs = read_inputs(&args.files);
    let total = inputs.len();

    let backend = if args.local {
        None
    } else {
        config.effective_backend(args.backend.as_deref())
    };
    let outcomes = match backend {
        Some(url) => {
            let client = BackendClient::new(&url)?;
            if format == OutputFormat::Table {
                info(&format!("Converting {total} file(s) with backend {}", client.base_url()));
            }
            convert_remote(&client, inputs).await
        }
        None => convert_local(inputs, &config.generator),
    };

    let out_dir = config.effective_output_dir(args.out_dir.as_deref());
    let reports = finish(outcomes, &out_dir, args.dry_run);
    print_reports(&reports, &out_dir, args.dry_run, format)?;

    let failed = reports.iter().filter(|r| !r.success).count();
    if failed > 0 {
        return Err(CliError::FilesFailed { failed, total });
    }
    Ok(())
}

/// Converts inputs with the local generator.
pub fn convert_local(inputs: Vec<InputFile>, config: &GeneratorConfig) -> Vec<ConvertOutcome> {
    let mut outcomes = Vec::with_capacity(inputs.len());
    let mut readable = Vec::new();
    for input in inputs {
        match input.text {
            Ok(text) => readable.push((input.name, text)),
            Err(e) => outcomes.push(ConvertOutcome {
                file: input.name,
                result: Err(e),
            }),
        }
    }

    let report = convert_batch(readable, config);
    outcomes.extend(report.outcomes.into_iter().map(|outcome| ConvertOutcome {
        file: outcome.file_name,
        result: outcome.result.map(|c| Converted {
            realm: c.realm,
            files: c.files,
            diagnostics: c.diagnostics,
        }),
    }));
    outcomes
}

/// Converts inputs one by one through a delegated backend.
pub async fn convert_remote(client: &BackendClient, inputs: Vec<InputFile>) -> Vec<ConvertOutcome> {
    let mut outcomes = Vec::with_capacity(inputs.len());
    for input in inputs {
        let result = match input.text.and_then(|text| parse_document(&input.name, &text)) {
            Ok(doc) => {
                let realm = realm_name(&doc, &input.name);
                client
                    .convert(doc, ConversionOptions::default())
                    .await
                    .map(|files| Converted {
                        realm,
                        files,
                        diagnostics: Vec::new(),
                    })
                    .map_err(|e| e.to_string())
            }
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            tracing::warn!(file = %input.name, error = %e, "remote conversion failed");
        }
        outcomes.push(ConvertOutcome {
            file: input.name,
            result,
        });
    }
    outcomes
}

/// Writes successful conversions and builds the reports.
pub fn finish(outcomes: Vec<ConvertOutcome>, out_dir: &Path, dry_run: bool) -> Vec<ConvertReport> {
    outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(converted) => {
                let written = if dry_run {
                    Ok(Vec::new())
                } else {
                    write_files(out_dir, &converted.files).map_err(|e| e.to_string())
                };
                ConvertReport {
                    file: outcome.file,
                    success: written.is_ok(),
                    realm: Some(converted.realm),
                    files: converted.files.into_iter().map(|f| f.file_path).collect(),
                    diagnostics: converted.diagnostics,
                    error: written.err(),
                }
            }
            Err(e) => ConvertReport {
                file: outcome.file,
                success: false,
                realm: None,
                files: Vec::new(),
                diagnostics: Vec::new(),
                error: Some(e),
            },
        })
        .collect()
}

fn print_reports(reports: &[ConvertReport], out_dir: &Path, dry_run: bool, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            let rows: Vec<ConvertRow> = reports
                .iter()
                .map(|r| ConvertRow {
                    file: r.file.clone(),
                    realm: r.realm.clone().unwrap_or_default(),
                    files: r.files.len(),
                    diagnostics: r.diagnostics.len(),
                    status: if r.success { "ok".to_string() } else { "failed".to_string() },
                })
                .collect();
            output(&rows, format)?;

            for report in reports {
                for diagnostic in &report.diagnostics {
                    warning(&format!("{}: {diagnostic}", report.file));
                }
                if let Some(e) = &report.error {
                    error(&format!("{}: {e}", report.file));
                }
            }

            let written: usize = reports.iter().filter(|r| r.success).map(|r| r.files.len()).sum();
            if dry_run {
                info(&format!("Dry run: {written} file(s) not written"));
            } else if written > 0 {
                success(&format!("Wrote {written} file(s) to {}", display(out_dir).display()));
            }
            Ok(())
        }
        OutputFormat::Quiet => Ok(()),
        _ => output_single(&reports, format),
    }
}

fn display(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_conversion_keeps_failures_per_file() {
        let inputs = vec![
            InputFile::from_text("demo.json", r#"{"realm": "demo"}"#),
            InputFile {
                name: "gone.json".to_string(),
                text: Err("failed to read file: not found".to_string()),
            },
            InputFile::from_text("bad.json", "[1,"),
        ];
        let outcomes = convert_local(inputs, &GeneratorConfig::default());
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].file, "gone.json");
        assert!(outcomes[1].result.is_ok());
        assert!(outcomes[2].result.as_ref().unwrap_err().starts_with("Invalid JSON"));
    }

    #[test]
    fn finish_writes_unless_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let outcomes = convert_local(
            vec![InputFile::from_text("demo.json", r#"{"realm": "demo"}"#)],
            &GeneratorConfig::default(),
        );

        let reports = finish(outcomes.clone(), dir.path(), true);
        assert!(reports[0].success);
        assert!(!dir.path().join("demo").exists());

        let reports = finish(outcomes, dir.path(), false);
        assert!(reports[0].success);
        assert_eq!(reports[0].files.len(), 7);
        assert!(dir.path().join("demo/realm/main.tf").is_file());
        assert!(dir.path().join("demo/terragrunt.hcl").is_file());
    }

    #[test]
    fn report_serializes_without_content() {
        let outcomes = convert_local(
            vec![InputFile::from_text("demo.json", r#"{"realm": "demo"}"#)],
            &GeneratorConfig::default(),
        );
        let reports = finish(outcomes, Path::new("unused"), true);
        let value = serde_json::to_value(&reports).unwrap();
        assert_eq!(value[0]["realm"], "demo");
        assert_eq!(value[0]["files"][0], "demo/terragrunt.hcl");
        assert!(value[0].get("error").is_none());
    }
}
